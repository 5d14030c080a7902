use crate::{
    error::{MalformedUrlError, MalformedUrlErrorKind, ParseError},
    log::debug,
    normalize::normalize_path,
    parse,
    pct_enc::table::SCHEME,
    Uri,
};
use alloc::{
    borrow::ToOwned,
    string::{String, ToString},
};
use core::{fmt::Write, hash, str::FromStr};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

type Result<T> = core::result::Result<T, MalformedUrlError>;

/// Returns immediately with an error.
macro_rules! err {
    ($kind:ident) => {
        return Err(MalformedUrlError::new(MalformedUrlErrorKind::$kind))
    };
}

/// A locator of the form `protocol:[//authority]path[?query][#fragment]`.
///
/// Unlike [`Uri`], a `Url` performs no escaping or character validation
/// beyond its protocol, port and bracketed host: components are stored as
/// given.
///
/// # Parsing
///
/// Leading and trailing characters up to U+0020 are trimmed and a leading
/// `"url:"` is skipped. A protocol is the text before the first `':'` if it
/// precedes any `'/'` and is syntactically valid; it is stored in lowercase.
/// The fragment follows the first `'#'`, and the query follows the first `'?'`
/// before it.
///
/// When the authority holds more than one `'@'`, both user information and
/// host are dropped. A host is always present after parsing, possibly empty.
///
/// # Comparison
///
/// Two URLs are equal if their protocols, files and fragments are equal,
/// their hosts are equal ignoring ASCII case, and their ports are equal
/// after substituting the default port of the protocol for an absent one.
///
/// # Examples
///
/// ```
/// use compat_uri::Url;
///
/// let url = Url::parse("HTTP://user@example.com:8080/docs/index.html?lang=en#intro")?;
/// assert_eq!(url.protocol(), "http");
/// assert_eq!(url.user_info(), Some("user"));
/// assert_eq!(url.host(), Some("example.com"));
/// assert_eq!(url.port(), Some(8080));
/// assert_eq!(url.file(), "/docs/index.html?lang=en");
/// assert_eq!(url.fragment(), Some("intro"));
///
/// let rel = Url::with_context(&url, "../img/logo.png")?;
/// assert_eq!(rel.to_external_form(), "http://user@example.com:8080/img/logo.png");
/// # Ok::<_, compat_uri::MalformedUrlError>(())
/// ```
#[derive(Clone)]
pub struct Url {
    protocol: String,
    authority: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: String,
    query: Option<String>,
    fragment: Option<String>,
}

fn is_valid_protocol(s: &str) -> bool {
    s.as_bytes().first().is_some_and(u8::is_ascii_alphabetic)
        && s.bytes().all(|x| SCHEME.allows_ascii(x))
}

/// Returns the default port of a lowercase protocol.
fn default_port(protocol: &str) -> Option<u16> {
    match protocol {
        "http" | "ws" => Some(80),
        "https" | "wss" => Some(443),
        "ftp" => Some(21),
        "gopher" => Some(70),
        _ => None,
    }
}

fn parse_port(s: &str) -> Result<Option<u16>> {
    if s.is_empty() {
        return Ok(None);
    }
    if !s.bytes().all(|x| x.is_ascii_digit()) {
        err!(InvalidPort);
    }
    match s.parse() {
        Ok(port) => Ok(Some(port)),
        Err(_) => err!(InvalidPort),
    }
}

/// Splits an authority into user information, host and port.
fn parse_authority(authority: &str) -> Result<(Option<&str>, &str, Option<u16>)> {
    let (user_info, host_port) = match authority.find('@') {
        Some(i) if authority.rfind('@') == Some(i) => (Some(&authority[..i]), &authority[i + 1..]),
        Some(_) => {
            debug!("dropping user information and host of {authority:?}");
            return Ok((None, "", None));
        }
        None => (None, authority),
    };

    if host_port.starts_with('[') {
        let close = match host_port.find(']') {
            Some(i) if i > 2 => i,
            _ => err!(InvalidAuthority),
        };
        if !parse::is_ipv6_literal(&host_port[1..close]) {
            err!(InvalidHost);
        }
        let port = match &host_port[close + 1..] {
            "" => None,
            rest => match rest.strip_prefix(':') {
                Some(port) => parse_port(port)?,
                None => err!(InvalidAuthority),
            },
        };
        Ok((user_info, &host_port[..=close], port))
    } else {
        match host_port.split_once(':') {
            Some((host, port)) => Ok((user_info, host, parse_port(port)?)),
            None => Ok((user_info, host_port, None)),
        }
    }
}

/// Splits at the first occurrence of `delim`, dropping it.
fn split_off(s: &str, delim: char) -> (&str, Option<&str>) {
    match s.split_once(delim) {
        Some((a, b)) => (a, Some(b)),
        None => (s, None),
    }
}

impl Url {
    /// Parses an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns `Err` if there is no protocol, or if the port or a bracketed
    /// host is malformed.
    pub fn parse(spec: &str) -> Result<Url> {
        Self::parse_with(None, spec)
    }

    /// Parses a URL in the context of another.
    ///
    /// A spec with a protocol replaces the context entirely. Otherwise the
    /// result inherits the protocol of the context and:
    ///
    /// - a spec starting with `"//"` replaces authority, path, query and fragment;
    /// - a spec starting with `'/'` replaces path, query and fragment;
    /// - an empty spec keeps everything, except that a given fragment replaces
    ///   that of the context;
    /// - a spec holding only a query keeps the path, and replaces query and fragment;
    /// - any other spec is merged with the directory of the context path, which
    ///   is then normalized, and replaces query and fragment.
    ///
    /// # Errors
    ///
    /// Returns `Err` on the same conditions as [`parse`](Self::parse).
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Url;
    ///
    /// let base = Url::parse("http://a/b/c/d;p?q#f")?;
    /// assert_eq!(Url::with_context(&base, "g")?.to_string(), "http://a/b/c/g");
    /// assert_eq!(Url::with_context(&base, "//g")?.to_string(), "http://g");
    /// assert_eq!(Url::with_context(&base, "#s")?.to_string(), "http://a/b/c/d;p?q#s");
    /// assert_eq!(Url::with_context(&base, "")?.to_string(), "http://a/b/c/d;p?q#f");
    /// # Ok::<_, compat_uri::MalformedUrlError>(())
    /// ```
    pub fn with_context(context: &Url, spec: &str) -> Result<Url> {
        Self::parse_with(Some(context), spec)
    }

    fn parse_with(context: Option<&Url>, spec: &str) -> Result<Url> {
        let spec = spec.trim_matches(|c: char| c <= ' ');
        let spec = match spec.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("url:") => &spec[4..],
            _ => spec,
        };

        let mut protocol = None;
        let mut rest = spec;
        if !spec.starts_with('#') {
            if let Some(i) = spec.find(|c: char| c == ':' || c == '/') {
                if spec.as_bytes()[i] == b':' && is_valid_protocol(&spec[..i]) {
                    protocol = Some(spec[..i].to_ascii_lowercase());
                    rest = &spec[i + 1..];
                }
            }
        }

        let (mut url, relative) = match (protocol, context) {
            (Some(protocol), _) => (Url::empty(protocol), false),
            (None, Some(context)) => {
                debug!("inheriting from {context} for {spec:?}");
                (context.clone(), true)
            }
            (None, None) => err!(NoProtocol),
        };

        let (rest, fragment) = split_off(rest, '#');
        let (rest, query) = split_off(rest, '?');

        if rest.starts_with("//") && !rest.starts_with("////") {
            let end = rest[2..].find('/').map_or(rest.len(), |i| i + 2);
            let authority = &rest[2..end];
            let (user_info, host, port) = parse_authority(authority)?;
            url.authority = Some(authority.to_owned());
            url.user_info = user_info.map(ToOwned::to_owned);
            url.host = Some(host.to_owned());
            url.port = port;
            url.path = rest[end..].to_owned();
            url.query = query.map(ToOwned::to_owned);
            url.fragment = fragment.map(ToOwned::to_owned);
        } else if relative && rest.is_empty() {
            if query.is_some() {
                url.query = query.map(ToOwned::to_owned);
                url.fragment = fragment.map(ToOwned::to_owned);
            } else if fragment.is_some() {
                url.fragment = fragment.map(ToOwned::to_owned);
            }
        } else {
            url.path = if rest.starts_with('/') || !relative {
                rest.to_owned()
            } else if url.path.is_empty() {
                let mut path = String::with_capacity(rest.len() + 1);
                if url.authority.is_some() {
                    path.push('/');
                }
                path.push_str(rest);
                path
            } else {
                let mut merged = String::with_capacity(url.path.len() + rest.len() + 1);
                match url.path.rfind('/') {
                    Some(i) => merged.push_str(&url.path[..=i]),
                    None if url.authority.is_some() => merged.push('/'),
                    None => {}
                }
                merged.push_str(rest);
                normalize_path(&merged).into_owned()
            };
            url.query = query.map(ToOwned::to_owned);
            url.fragment = fragment.map(ToOwned::to_owned);
        }

        url.host.get_or_insert_with(String::new);
        Ok(url)
    }

    fn empty(protocol: String) -> Url {
        Url {
            protocol,
            authority: None,
            user_info: None,
            host: None,
            port: None,
            path: String::new(),
            query: None,
            fragment: None,
        }
    }

    /// Creates a URL from a protocol, a host and a file, using the default port.
    ///
    /// # Errors
    ///
    /// Returns `Err` on the same conditions as [`with_port`](Self::with_port).
    pub fn new(protocol: &str, host: Option<&str>, file: &str) -> Result<Url> {
        Self::with_port(protocol, host, None, file)
    }

    /// Creates a URL from a protocol, a host, a port and a file.
    ///
    /// A port of `None` stands for the default port of the protocol. A host
    /// containing `':'` is enclosed in brackets unless it already is. Without
    /// a host there is no authority, but the port is still kept. The file is
    /// split into path, query and fragment at the first `'#'` and then the
    /// first `'?'` before it.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the protocol is empty or malformed, if the port exceeds
    /// 65535, or if a bracketed host is not a valid IPv6 address.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Url;
    ///
    /// let url = Url::with_port("HTTP", Some("::1"), Some(8080), "/a?b#c")?;
    /// assert_eq!(url.to_external_form(), "http://[::1]:8080/a?b#c");
    /// assert!(Url::with_port("http", Some("example.com"), Some(65536), "/").is_err());
    /// # Ok::<_, compat_uri::MalformedUrlError>(())
    /// ```
    pub fn with_port(
        protocol: &str,
        host: Option<&str>,
        port: Option<u32>,
        file: &str,
    ) -> Result<Url> {
        let protocol = protocol.trim_matches(|c: char| c <= ' ');
        if protocol.is_empty() {
            err!(NoProtocol);
        }
        if !is_valid_protocol(protocol) {
            err!(InvalidProtocol);
        }
        let port = match port.map(u16::try_from) {
            None => None,
            Some(Ok(port)) => Some(port),
            Some(Err(_)) => err!(InvalidPort),
        };

        let mut url = Url::empty(protocol.to_ascii_lowercase());

        if let Some(host) = host {
            let host = if host.contains(':') && !host.starts_with('[') {
                alloc::format!("[{host}]")
            } else {
                host.to_owned()
            };
            if let Some(literal) = host.strip_prefix('[') {
                match literal.strip_suffix(']') {
                    Some(addr) if parse::is_ipv6_literal(addr) => {}
                    _ => err!(InvalidHost),
                }
            }

            let mut authority = host.clone();
            if let Some(port) = port {
                let _ = write!(authority, ":{port}");
            }
            url.authority = Some(authority);
            url.host = Some(host);
        }
        url.port = port;

        let (file, fragment) = split_off(file, '#');
        let (path, query) = split_off(file, '?');
        url.path = path.to_owned();
        url.query = query.map(ToOwned::to_owned);
        url.fragment = fragment.map(ToOwned::to_owned);
        Ok(url)
    }

    /// Converts an absolute [`Uri`] to a URL by parsing its string form.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the URI is relative or its string form is not a valid URL.
    pub fn from_uri(uri: &Uri) -> Result<Url> {
        if !uri.is_absolute() {
            err!(NotAbsolute);
        }
        Self::parse(uri.as_str())
    }

    /// Converts the URL to a [`Uri`] by parsing its external form.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the external form is not a valid URI, for example
    /// when it contains a space.
    pub fn to_uri(&self) -> core::result::Result<Uri, ParseError> {
        Uri::parse(&self.to_external_form())
    }

    /// Returns the protocol in lowercase.
    #[must_use]
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Returns the authority, if any.
    #[must_use]
    pub fn authority(&self) -> Option<&str> {
        self.authority.as_deref()
    }

    /// Returns the user information, if any.
    #[must_use]
    pub fn user_info(&self) -> Option<&str> {
        self.user_info.as_deref()
    }

    /// Returns the host, with brackets if it is an IPv6 literal.
    ///
    /// This is `None` only for a URL composed without a host.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// Returns the port, or `None` if it is not set.
    #[must_use]
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the default port of the protocol, if known.
    #[must_use]
    pub fn default_port(&self) -> Option<u16> {
        default_port(&self.protocol)
    }

    fn effective_port(&self) -> Option<u16> {
        self.port.or_else(|| self.default_port())
    }

    /// Returns the path, possibly empty.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the query, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Returns the path followed by `'?'` and the query, if any.
    #[must_use]
    pub fn file(&self) -> String {
        match &self.query {
            Some(query) => alloc::format!("{}?{}", self.path, query),
            None => self.path.clone(),
        }
    }

    /// Returns the fragment, if any.
    #[must_use]
    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    /// Returns the string form of the URL.
    ///
    /// An empty authority is omitted along with its `"//"`.
    #[must_use]
    pub fn to_external_form(&self) -> String {
        self.to_string()
    }

    fn hosts_eq(&self, other: &Url) -> bool {
        match (&self.host, &other.host) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a.is_none() && b.is_none(),
        }
    }

    /// Checks whether two URLs refer to the same file, i.e., are equal
    /// when fragments are ignored.
    #[must_use]
    pub fn same_file(&self, other: &Url) -> bool {
        self.protocol == other.protocol
            && self.hosts_eq(other)
            && self.effective_port() == other.effective_port()
            && self.path == other.path
            && self.query == other.query
    }
}

impl PartialEq for Url {
    fn eq(&self, other: &Self) -> bool {
        self.same_file(other) && self.fragment == other.fragment
    }
}

impl Eq for Url {}

impl hash::Hash for Url {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.protocol.hash(state);
        match &self.host {
            Some(host) => {
                state.write_u8(1);
                for x in host.bytes() {
                    state.write_u8(x.to_ascii_lowercase());
                }
            }
            None => state.write_u8(0),
        }
        self.effective_port().hash(state);
        self.path.hash(state);
        self.query.hash(state);
        self.fragment.hash(state);
    }
}

impl FromStr for Url {
    type Err = MalformedUrlError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Url {
    type Error = MalformedUrlError;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<&Uri> for Url {
    type Error = MalformedUrlError;

    fn try_from(value: &Uri) -> Result<Self> {
        Self::from_uri(value)
    }
}

impl TryFrom<&Url> for Uri {
    type Error = ParseError;

    fn try_from(value: &Url) -> core::result::Result<Self, Self::Error> {
        value.to_uri()
    }
}

#[cfg(feature = "serde")]
impl Serialize for Url {
    fn serialize<S>(&self, serializer: S) -> core::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Url {
    fn deserialize<D>(deserializer: D) -> core::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Url::parse(&s).map_err(|e| {
            de::Error::custom(format_args!("failed to parse {s:?} as URL: {e}"))
        })
    }
}
