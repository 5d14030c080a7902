use crate::{
    error::{MalformedUrlError, ParseError},
    parse,
    pct_enc::{self, EStr},
    Url,
};
use alloc::{
    borrow::{Cow, ToOwned},
    string::String,
};
use core::{hash, num::NonZeroUsize, str::FromStr};

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Index metadata of a parsed URI.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Meta {
    /// Index of the colon after the scheme.
    pub(crate) scheme_end: Option<NonZeroUsize>,
    pub(crate) auth: Option<AuthMeta>,
    /// Bounds of the path, or of the scheme-specific part if opaque.
    pub(crate) path_bounds: (usize, usize),
    pub(crate) query_end: Option<NonZeroUsize>,
}

/// An authority ends where the path starts.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AuthMeta {
    pub(crate) start: usize,
    /// `None` if registry-based.
    pub(crate) server: Option<ServerMeta>,
}

/// Offsets are relative to the start of the authority.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct ServerMeta {
    pub(crate) host_bounds: (usize, usize),
    pub(crate) port: Option<u32>,
}

/// Components of a URI to be joined into one.
pub(crate) struct Parts<'a> {
    pub(crate) scheme: Option<&'a str>,
    pub(crate) authority: Option<(&'a str, Option<ServerMeta>)>,
    pub(crate) path: &'a str,
    pub(crate) query: Option<&'a str>,
    pub(crate) fragment: Option<&'a str>,
}

/// A URI reference, either absolute or relative, as defined by [RFC 2396]
/// with the IPv6 literals of [RFC 2732].
///
/// A `Uri` is immutable. Every operation that derives a new reference,
/// such as [`normalize`], [`resolve`] or [`relativize`], returns a fresh value.
///
/// # Components
///
/// An *opaque* URI has a scheme and a scheme-specific part that does not
/// start with `'/'`, as in `mailto:a@b.com`. It has no authority, path or query.
///
/// A *hierarchical* URI is laid out as
/// `[scheme:][//authority][path][?query][#fragment]`. Its authority is
/// *server-based* when it parses as `[userinfo@]host[:port]` and
/// *registry-based* otherwise, in which case user information, host and
/// port are all absent.
///
/// Each component has a raw accessor returning the text as it appears in the
/// URI and a decoded accessor replacing escaped octets with the characters
/// they encode in UTF-8. Invalid sequences decode to `U+FFFD`.
///
/// # Comparison
///
/// Schemes are compared case-insensitively. Every other component is
/// compared by its raw text.
///
/// # Examples
///
/// ```
/// use compat_uri::Uri;
///
/// let uri = Uri::parse("http://user@host123:456/path789?q=%41#frag")?;
/// assert_eq!(uri.scheme(), Some("http"));
/// assert_eq!(uri.host(), Some("host123"));
/// assert_eq!(uri.port(), Some(456));
/// assert_eq!(uri.path().unwrap(), "/path789");
/// assert_eq!(uri.query().unwrap(), "q=A");
/// # Ok::<_, compat_uri::ParseError>(())
/// ```
///
/// [RFC 2396]: https://datatracker.ietf.org/doc/html/rfc2396
/// [RFC 2732]: https://datatracker.ietf.org/doc/html/rfc2732
/// [`normalize`]: Self::normalize
/// [`resolve`]: Self::resolve
/// [`relativize`]: Self::relativize
#[derive(Clone)]
pub struct Uri {
    val: String,
    meta: Meta,
}

impl Uri {
    /// Parses a URI reference from a string.
    ///
    /// An authority that is not a valid `[userinfo@]host[:port]` is taken as
    /// registry-based as long as it only contains characters allowed there.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string does not match the URI syntax.
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        Self::parse_owned(s.to_owned(), false)
    }

    pub(crate) fn parse_owned(val: String, require_server: bool) -> Result<Self, ParseError> {
        let meta = parse::parse(&val, require_server)?;
        Ok(Self { val, meta })
    }

    /// Joins the given components, fixing up the path so that the
    /// result reads back with the same components.
    pub(crate) fn assemble(parts: Parts<'_>) -> Self {
        let mut val = String::new();
        let mut meta = Meta::default();

        if let Some(scheme) = parts.scheme {
            val.push_str(scheme);
            meta.scheme_end = NonZeroUsize::new(val.len());
            val.push(':');
        }
        if let Some((authority, server)) = parts.authority {
            val.push_str("//");
            meta.auth = Some(AuthMeta {
                start: val.len(),
                server,
            });
            val.push_str(authority);
        }

        let path_start = val.len();
        if parts.authority.is_none() {
            if parts.path.starts_with("//") {
                val.push_str("/.");
            } else if parts.scheme.is_none()
                && parts.path.split('/').next().is_some_and(|s| s.contains(':'))
            {
                val.push_str("./");
            }
        }
        val.push_str(parts.path);
        meta.path_bounds = (path_start, val.len());

        if let Some(query) = parts.query {
            val.push('?');
            val.push_str(query);
            meta.query_end = NonZeroUsize::new(val.len());
        }
        if let Some(fragment) = parts.fragment {
            val.push('#');
            val.push_str(fragment);
        }
        Self { val, meta }
    }

    pub(crate) fn parts(&self) -> Parts<'_> {
        Parts {
            scheme: self.scheme(),
            authority: self
                .meta
                .auth
                .map(|auth| (&self.val[auth.start..self.meta.path_bounds.0], auth.server)),
            path: self.raw_path().map_or("", EStr::as_str),
            query: self.raw_query().map(EStr::as_str),
            fragment: self.raw_fragment().map(EStr::as_str),
        }
    }

    fn eslice(&self, start: usize, end: usize) -> &EStr {
        EStr::new_validated(&self.val[start..end])
    }

    fn server(&self) -> Option<(usize, ServerMeta)> {
        let auth = self.meta.auth?;
        Some((auth.start, auth.server?))
    }

    fn fragment_start(&self) -> Option<usize> {
        let end = self
            .meta
            .query_end
            .map_or(self.meta.path_bounds.1, NonZeroUsize::get);
        (end < self.val.len()).then_some(end + 1)
    }

    /// Returns the URI reference as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.val
    }

    /// Consumes the `Uri` and yields the underlying `String`.
    #[must_use]
    pub fn into_string(self) -> String {
        self.val
    }

    /// Returns the scheme component, if any.
    ///
    /// The case of the scheme is preserved.
    #[must_use]
    pub fn scheme(&self) -> Option<&str> {
        self.meta.scheme_end.map(|i| &self.val[..i.get()])
    }

    /// Checks whether the URI has a scheme.
    #[must_use]
    pub fn is_absolute(&self) -> bool {
        self.meta.scheme_end.is_some()
    }

    /// Checks whether the URI is opaque, i.e., has a scheme and a
    /// scheme-specific part not starting with `'/'`.
    #[must_use]
    pub fn is_opaque(&self) -> bool {
        self.meta.scheme_end.is_some()
            && self.meta.auth.is_none()
            && !self.val[self.meta.path_bounds.0..].starts_with('/')
    }

    /// Returns the raw scheme-specific part, i.e., everything between the
    /// scheme and the fragment.
    #[must_use]
    pub fn raw_scheme_specific_part(&self) -> &EStr {
        let start = self.meta.scheme_end.map_or(0, |i| i.get() + 1);
        let end = self.fragment_start().map_or(self.val.len(), |i| i - 1);
        self.eslice(start, end)
    }

    /// Returns the decoded scheme-specific part.
    #[must_use]
    pub fn scheme_specific_part(&self) -> Cow<'_, str> {
        self.raw_scheme_specific_part().decode().to_string_lossy()
    }

    /// Returns the raw authority component, if any.
    ///
    /// An empty authority, as in `"file:///etc"`, is `Some("")`.
    #[must_use]
    pub fn raw_authority(&self) -> Option<&EStr> {
        let auth = self.meta.auth?;
        Some(self.eslice(auth.start, self.meta.path_bounds.0))
    }

    /// Returns the decoded authority component, if any.
    ///
    /// The text inside the brackets of an IPv6 literal is left as is.
    #[must_use]
    pub fn authority(&self) -> Option<Cow<'_, str>> {
        let raw = self.raw_authority()?.as_str();
        let (Some(open), Some(close)) = (raw.find('['), raw.rfind(']')) else {
            return Some(EStr::new_validated(raw).decode().to_string_lossy());
        };
        if close < open {
            return Some(EStr::new_validated(raw).decode().to_string_lossy());
        }
        let mut buf = String::with_capacity(raw.len());
        buf.push_str(&EStr::new_validated(&raw[..open]).decode().to_string_lossy());
        buf.push_str(&raw[open..=close]);
        buf.push_str(&EStr::new_validated(&raw[close + 1..]).decode().to_string_lossy());
        Some(Cow::Owned(buf))
    }

    /// Returns the raw user information of a server-based authority, if any.
    #[must_use]
    pub fn raw_user_info(&self) -> Option<&EStr> {
        let (start, server) = self.server()?;
        let host_start = server.host_bounds.0;
        (host_start > 0).then(|| self.eslice(start, start + host_start - 1))
    }

    /// Returns the decoded user information of a server-based authority, if any.
    #[must_use]
    pub fn user_info(&self) -> Option<Cow<'_, str>> {
        Some(self.raw_user_info()?.decode().to_string_lossy())
    }

    /// Returns the raw host of a server-based authority, if any.
    ///
    /// An IPv6 literal is returned with its brackets.
    #[must_use]
    pub fn raw_host(&self) -> Option<&EStr> {
        let (start, server) = self.server()?;
        let (host_start, host_end) = server.host_bounds;
        Some(self.eslice(start + host_start, start + host_end))
    }

    /// Returns the host of a server-based authority, if any.
    ///
    /// A host never contains escaped octets, so this is the raw host as a
    /// string slice.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.raw_host().map(EStr::as_str)
    }

    /// Returns the port of a server-based authority, if any.
    ///
    /// An empty port, as in `"http://host:/"`, is `None`.
    #[must_use]
    pub fn port(&self) -> Option<u32> {
        self.server()?.1.port
    }

    /// Returns the raw path, or `None` if the URI is opaque.
    #[must_use]
    pub fn raw_path(&self) -> Option<&EStr> {
        if self.is_opaque() {
            return None;
        }
        let (start, end) = self.meta.path_bounds;
        Some(self.eslice(start, end))
    }

    /// Returns the decoded path, or `None` if the URI is opaque.
    #[must_use]
    pub fn path(&self) -> Option<Cow<'_, str>> {
        Some(self.raw_path()?.decode().to_string_lossy())
    }

    /// Returns the raw query component, if any.
    #[must_use]
    pub fn raw_query(&self) -> Option<&EStr> {
        let end = self.meta.query_end?.get();
        Some(self.eslice(self.meta.path_bounds.1 + 1, end))
    }

    /// Returns the decoded query component, if any.
    #[must_use]
    pub fn query(&self) -> Option<Cow<'_, str>> {
        Some(self.raw_query()?.decode().to_string_lossy())
    }

    /// Returns the raw fragment component, if any.
    #[must_use]
    pub fn raw_fragment(&self) -> Option<&EStr> {
        let start = self.fragment_start()?;
        Some(self.eslice(start, self.val.len()))
    }

    /// Returns the decoded fragment component, if any.
    #[must_use]
    pub fn fragment(&self) -> Option<Cow<'_, str>> {
        Some(self.raw_fragment()?.decode().to_string_lossy())
    }

    /// Checks whether the authority is server-based.
    ///
    /// Returns `false` if there is no authority.
    #[must_use]
    pub fn has_server_authority(&self) -> bool {
        self.server().is_some()
    }

    /// Parses the authority as server-based, reporting why it cannot be.
    ///
    /// Returns a copy of the URI unchanged if the authority is absent or
    /// already server-based.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the authority is not a valid `[userinfo@]host[:port]`.
    pub fn parse_server_authority(&self) -> Result<Self, ParseError> {
        match self.meta.auth {
            Some(AuthMeta { server: None, .. }) => Self::parse_owned(self.val.clone(), true),
            _ => Ok(self.clone()),
        }
    }

    /// Returns the string form with every non-ASCII character escaped
    /// as UTF-8.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let uri = Uri::parse("http://example.com/caf\u{e9}")?;
    /// assert_eq!(uri.to_ascii_string(), "http://example.com/caf%C3%A9");
    /// # Ok::<_, compat_uri::ParseError>(())
    /// ```
    #[must_use]
    pub fn to_ascii_string(&self) -> Cow<'_, str> {
        pct_enc::encode_non_ascii(&self.val)
    }

    /// Converts the URI to a [`Url`].
    ///
    /// # Errors
    ///
    /// Returns `Err` if the URI is relative or its string form is not a valid URL.
    pub fn to_url(&self) -> Result<Url, MalformedUrlError> {
        Url::from_uri(self)
    }

    /// Returns everything after the scheme and its colon.
    fn after_scheme(&self) -> &str {
        let start = self.meta.scheme_end.map_or(0, |i| i.get() + 1);
        &self.val[start..]
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        let schemes_eq = match (self.scheme(), other.scheme()) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (None, None) => true,
            _ => false,
        };
        schemes_eq && self.after_scheme() == other.after_scheme()
    }
}

impl Eq for Uri {}

impl hash::Hash for Uri {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        match self.scheme() {
            Some(scheme) => {
                state.write_u8(1);
                for x in scheme.bytes() {
                    state.write_u8(x.to_ascii_lowercase());
                }
            }
            None => state.write_u8(0),
        }
        self.after_scheme().hash(state);
    }
}

impl FromStr for Uri {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for Uri {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Uri {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_owned(value, false)
    }
}

impl From<Uri> for String {
    fn from(value: Uri) -> Self {
        value.val
    }
}

impl AsRef<str> for Uri {
    fn as_ref(&self) -> &str {
        &self.val
    }
}

#[cfg(feature = "serde")]
impl Serialize for Uri {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Uri {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Uri::parse(&s).map_err(|e| {
            de::Error::custom(format_args!("failed to parse {s:?} as URI: {e}"))
        })
    }
}
