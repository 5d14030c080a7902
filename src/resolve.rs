//! Reference resolution and relativization.

use crate::{
    error::ParseError,
    log::debug,
    normalize::normalize_path,
    uri::Parts,
    Uri,
};
use alloc::{borrow::Cow, string::String};

impl Uri {
    /// Parses the given string and resolves it against this URI.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the string is not a valid URI reference.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let base = Uri::parse("http://a/b/c/d;p?q")?;
    /// assert_eq!(base.resolve("../g")?.as_str(), "http://a/b/g");
    /// assert_eq!(base.resolve("?y")?.as_str(), "http://a/b/c/d;p?y");
    /// assert_eq!(base.resolve("#s")?.as_str(), "http://a/b/c/d;p?q#s");
    /// # Ok::<_, compat_uri::ParseError>(())
    /// ```
    pub fn resolve(&self, reference: &str) -> Result<Uri, ParseError> {
        Ok(self.resolve_uri(&Uri::parse(reference)?))
    }

    /// Resolves the given reference against this URI, treated as the base.
    ///
    /// The reference is returned unchanged if it has a scheme, or if either
    /// it or the base is opaque. Otherwise the result takes the scheme of
    /// the base and the fragment of the reference, and:
    ///
    /// - if the reference has an authority, takes its authority, path and query;
    /// - else if the reference path is empty, keeps the authority and path of the
    ///   base, along with the query of the reference or, if it has none, of the base;
    /// - else keeps the authority of the base, takes the query of the reference
    ///   and merges the reference path with the directory of the base path.
    ///
    /// Except when the base path is kept, the resulting path is normalized.
    #[must_use]
    pub fn resolve_uri(&self, reference: &Uri) -> Uri {
        if reference.is_absolute() || reference.is_opaque() || self.is_opaque() {
            return reference.clone();
        }

        let base = self.parts();
        let r = reference.parts();

        let merged;
        let (authority, path, query) = if r.authority.is_some() {
            merged = normalize_path(r.path);
            (r.authority, &*merged, r.query)
        } else if r.path.is_empty() {
            (base.authority, base.path, r.query.or(base.query))
        } else {
            merged = if r.path.starts_with('/') {
                normalize_path(r.path)
            } else {
                Cow::Owned(normalize_path(&merge(&base, r.path)).into_owned())
            };
            (base.authority, &*merged, r.query)
        };

        Uri::assemble(Parts {
            scheme: base.scheme,
            authority,
            path,
            query,
            fragment: r.fragment,
        })
    }

    /// Computes a reference that resolves against this URI to the given one.
    ///
    /// The given URI is returned unchanged if either URI is opaque, if the
    /// schemes differ (ignoring case), if the authorities differ, or if the
    /// normalized path of this URI is not a segment-aligned prefix of that of
    /// the given URI. Otherwise the result has no scheme or authority; its
    /// path is the remainder of the given path, and its query and fragment
    /// are those of the given URI.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let base = Uri::parse("http://example.com/dir1/")?;
    /// let target = Uri::parse("http://example.com/dir1/dir2/file?q#f")?;
    /// assert_eq!(base.relativize(&target).as_str(), "dir2/file?q#f");
    ///
    /// let other = Uri::parse("http://other.com/dir1/file")?;
    /// assert_eq!(base.relativize(&other), other);
    /// # Ok::<_, compat_uri::ParseError>(())
    /// ```
    #[must_use]
    pub fn relativize(&self, target: &Uri) -> Uri {
        if self.is_opaque() || target.is_opaque() {
            return target.clone();
        }

        let base = self.parts();
        let t = target.parts();

        let schemes_eq = match (base.scheme, t.scheme) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            (a, b) => a == b,
        };
        let authorities_eq = base.authority.map(|(a, _)| a) == t.authority.map(|(a, _)| a);
        if !schemes_eq || !authorities_eq {
            debug!("not relativizing {target} against {self}: prefix differs");
            return target.clone();
        }

        let base_path = normalize_path(base.path);
        let target_path = normalize_path(t.path);

        let path = if base_path == target_path {
            ""
        } else {
            let prefix_len = if base_path.ends_with('/') {
                base_path.len()
            } else {
                base_path.len() + 1
            };
            let is_prefix = target_path.len() >= prefix_len
                && target_path.starts_with(&*base_path)
                && (base_path.ends_with('/') || target_path.as_bytes()[base_path.len()] == b'/');
            if !is_prefix {
                debug!("not relativizing {target} against {self}: path is not a prefix");
                return target.clone();
            }
            &target_path[prefix_len..]
        };

        Uri::assemble(Parts {
            scheme: None,
            authority: None,
            path,
            query: t.query,
            fragment: t.fragment,
        })
    }
}

/// Merges a relative path with the directory of the base path.
fn merge(base: &Parts<'_>, path: &str) -> String {
    let mut buf = String::with_capacity(base.path.len() + path.len() + 1);
    if base.authority.is_some() && base.path.is_empty() {
        buf.push('/');
    } else if let Some(i) = base.path.rfind('/') {
        buf.push_str(&base.path[..=i]);
    }
    buf.push_str(path);
    buf
}
