//! Composing constructors.
//!
//! Each constructor joins the given components into a URI string, escaping
//! every character not allowed in the respective component (including `'%'`,
//! so an already escaped component gets escaped again), and then parses it.

use crate::{
    error::{ParseError, ParseErrorKind},
    pct_enc::{quote, table::*},
    Uri,
};
use alloc::string::String;
use core::fmt::Write;

fn push_scheme(buf: &mut String, scheme: Option<&str>) {
    if let Some(scheme) = scheme {
        buf.push_str(scheme);
        buf.push(':');
    }
}

fn push_fragment(buf: &mut String, fragment: Option<&str>) {
    if let Some(fragment) = fragment {
        buf.push('#');
        quote(buf, fragment, URIC);
    }
}

/// Appends text that may start with a bracketed IPv6 literal,
/// which is kept as is while the rest is quoted.
fn push_with_literal(buf: &mut String, s: &str, prefix: &str, table: Table) {
    if let Some(rest) = s.strip_prefix(prefix) {
        if rest.starts_with('[') && s.contains(':') {
            if let Some(close) = s.find(']') {
                buf.push_str(&s[..=close]);
                quote(buf, &s[close + 1..], table);
                return;
            }
        }
    }
    quote(buf, s, table);
}

/// Fails if a non-empty relative path follows a scheme or an authority.
fn check_path(
    path: Option<&str>,
    path_start: usize,
    has_scheme_or_authority: bool,
) -> Result<(), ParseError> {
    match path {
        Some(path) if has_scheme_or_authority && !path.is_empty() && !path.starts_with('/') => {
            Err(ParseError {
                index: path_start,
                kind: ParseErrorKind::RelativePath,
            })
        }
        _ => Ok(()),
    }
}

impl Uri {
    /// Creates a URI from a scheme, a scheme-specific part and a fragment.
    ///
    /// The scheme-specific part and the fragment are quoted with the characters
    /// allowed in an opaque part. A leading `"//[...]"` IPv6 literal is kept
    /// as is.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the joined string is not a valid URI.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let uri = Uri::from_scheme_specific_part(Some("mailto"), Some("a b@c.com"), None)?;
    /// assert_eq!(uri.as_str(), "mailto:a%20b@c.com");
    /// assert!(uri.is_opaque());
    /// # Ok::<_, compat_uri::ParseError>(())
    /// ```
    pub fn from_scheme_specific_part(
        scheme: Option<&str>,
        ssp: Option<&str>,
        fragment: Option<&str>,
    ) -> Result<Self, ParseError> {
        let mut buf = String::new();
        push_scheme(&mut buf, scheme);
        if let Some(ssp) = ssp {
            push_with_literal(&mut buf, ssp, "//", URIC);
        }
        push_fragment(&mut buf, fragment);
        Self::parse_owned(buf, false)
    }

    /// Creates a hierarchical URI from a scheme, a host, a path and a fragment.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a scheme or a host is given with a non-empty path
    /// not starting with `'/'`, or if the joined string is not a valid URI
    /// with a server-based authority.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let uri = Uri::from_host(Some("http"), Some("::1"), Some("/a b"), None)?;
    /// assert_eq!(uri.as_str(), "http://[::1]/a%20b");
    /// # Ok::<_, compat_uri::ParseError>(())
    /// ```
    pub fn from_host(
        scheme: Option<&str>,
        host: Option<&str>,
        path: Option<&str>,
        fragment: Option<&str>,
    ) -> Result<Self, ParseError> {
        Self::from_components(scheme, None, host, None, path, None, fragment)
    }

    /// Creates a hierarchical URI from a scheme, an authority, a path,
    /// a query and a fragment.
    ///
    /// The authority is parsed as server-based if possible and as
    /// registry-based otherwise.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a scheme or an authority is given with a non-empty
    /// path not starting with `'/'`, or if the joined string is not a valid URI.
    pub fn from_authority(
        scheme: Option<&str>,
        authority: Option<&str>,
        path: Option<&str>,
        query: Option<&str>,
        fragment: Option<&str>,
    ) -> Result<Self, ParseError> {
        let mut buf = String::new();
        push_scheme(&mut buf, scheme);
        if let Some(authority) = authority {
            buf.push_str("//");
            push_with_literal(&mut buf, authority, "", AUTHORITY);
        }

        let path_start = buf.len();
        check_path(path, path_start, scheme.is_some() || authority.is_some())?;
        if let Some(path) = path {
            quote(&mut buf, path, PATH);
        }
        if let Some(query) = query {
            buf.push('?');
            quote(&mut buf, query, URIC);
        }
        push_fragment(&mut buf, fragment);
        Self::parse_owned(buf, false)
    }

    /// Creates a hierarchical URI from all of its components.
    ///
    /// A host containing `':'` is enclosed in brackets unless it already is.
    /// The host is inserted as is, while the other components are quoted.
    /// User information and port are ignored when there is no host.
    ///
    /// # Errors
    ///
    /// Returns `Err` if a scheme or a host is given with a non-empty path
    /// not starting with `'/'`, or if the joined string is not a valid URI
    /// with a server-based authority.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let uri = Uri::from_components(
    ///     Some("http"),
    ///     Some("us er"),
    ///     Some("example.com"),
    ///     Some(8080),
    ///     Some("/p"),
    ///     Some("q=1"),
    ///     Some("f"),
    /// )?;
    /// assert_eq!(uri.as_str(), "http://us%20er@example.com:8080/p?q=1#f");
    /// assert_eq!(uri.user_info().unwrap(), "us er");
    /// # Ok::<_, compat_uri::ParseError>(())
    /// ```
    pub fn from_components(
        scheme: Option<&str>,
        user_info: Option<&str>,
        host: Option<&str>,
        port: Option<u32>,
        path: Option<&str>,
        query: Option<&str>,
        fragment: Option<&str>,
    ) -> Result<Self, ParseError> {
        let mut buf = String::new();
        push_scheme(&mut buf, scheme);
        if let Some(host) = host {
            buf.push_str("//");
            if let Some(user_info) = user_info {
                quote(&mut buf, user_info, USERINFO);
                buf.push('@');
            }
            let brackets = host.contains(':') && !host.starts_with('[') && !host.ends_with(']');
            if brackets {
                buf.push('[');
            }
            buf.push_str(host);
            if brackets {
                buf.push(']');
            }
            if let Some(port) = port {
                let _ = write!(buf, ":{port}");
            }
        }

        let path_start = buf.len();
        check_path(path, path_start, scheme.is_some() || host.is_some())?;
        if let Some(path) = path {
            quote(&mut buf, path, PATH);
        }
        if let Some(query) = query {
            buf.push('?');
            quote(&mut buf, query, URIC);
        }
        push_fragment(&mut buf, fragment);
        Self::parse_owned(buf, true)
    }
}
