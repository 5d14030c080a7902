//! Path normalization.

use crate::{log::trace, uri::Parts, Uri};
use alloc::{borrow::Cow, string::String, vec::Vec};

/// Removes the `"."` and `".."` segments of a path.
///
/// A `".."` cancels the preceding segment unless that segment is itself
/// `".."`, in which case it is kept. Leading `".."` segments are kept, and
/// a path ending with a dot segment keeps its trailing slash. Empty
/// segments are not collapsed, and a relative path that would start with
/// one is prefixed with `"./"`.
pub(crate) fn normalize_path(path: &str) -> Cow<'_, str> {
    let (absolute, rest) = match path.strip_prefix('/') {
        Some(rest) => (true, rest),
        None => (false, path),
    };

    let mut segs: Vec<&str> = Vec::new();
    let mut trailing_slash = false;
    let mut changed = false;

    for seg in rest.split('/') {
        match seg {
            "." => {
                trailing_slash = true;
                changed = true;
            }
            ".." if segs.last().is_some_and(|&last| last != "..") => {
                segs.pop();
                trailing_slash = true;
                changed = true;
            }
            _ => {
                segs.push(seg);
                trailing_slash = false;
            }
        }
    }

    if !changed {
        return Cow::Borrowed(path);
    }

    let mut buf = String::with_capacity(path.len() + 2);
    if absolute {
        buf.push('/');
    } else if segs.len() > 1 && segs[0].is_empty() {
        // Joining would make the path absolute.
        buf.push_str("./");
    }
    for (i, seg) in segs.iter().enumerate() {
        if i > 0 {
            buf.push('/');
        }
        buf.push_str(seg);
    }
    if trailing_slash && !segs.is_empty() {
        buf.push('/');
    }
    Cow::Owned(buf)
}

impl Uri {
    /// Normalizes the path of the URI.
    ///
    /// An opaque URI is returned unchanged. Normalization is idempotent.
    ///
    /// When the result is relative and its first segment contains a colon,
    /// it is prefixed with `"./"` so that the segment is not mistaken for a scheme.
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::Uri;
    ///
    /// let uri = Uri::parse("http://example.com/a/./b/../c/")?;
    /// assert_eq!(uri.normalize().as_str(), "http://example.com/a/c/");
    ///
    /// let uri = Uri::parse("../a/b/../../../c")?;
    /// assert_eq!(uri.normalize().as_str(), "../../c");
    ///
    /// let uri = Uri::parse("a/../b:c")?;
    /// assert_eq!(uri.normalize().as_str(), "./b:c");
    /// # Ok::<_, compat_uri::ParseError>(())
    /// ```
    #[must_use]
    pub fn normalize(&self) -> Uri {
        if self.is_opaque() {
            return self.clone();
        }
        let parts = self.parts();
        let path = normalize_path(parts.path);
        trace!("normalized path {:?} to {path:?}", parts.path);
        Uri::assemble(Parts {
            path: &path,
            ..parts
        })
    }
}

#[cfg(test)]
mod tests {
    use super::normalize_path;

    #[test]
    fn paths() {
        assert_eq!(normalize_path("/a/b/c/./../../g"), "/a/g");
        assert_eq!(normalize_path("mid/content=5/../6"), "mid/6");
        assert_eq!(normalize_path("/a/b/."), "/a/b/");
        assert_eq!(normalize_path("/a/b/.."), "/a/");
        assert_eq!(normalize_path("/a/.."), "/");
        assert_eq!(normalize_path("a/.."), "");
        assert_eq!(normalize_path("/../a"), "/../a");
        assert_eq!(normalize_path("../../a"), "../../a");
        assert_eq!(normalize_path("a//b/../c"), "a//c");
        assert_eq!(normalize_path("a/..//b"), ".//b");
        assert_eq!(normalize_path(".//b"), ".//b");
        assert_eq!(normalize_path("a/../"), "");
        assert_eq!(normalize_path("./"), "");
        assert_eq!(normalize_path(""), "");
        assert_eq!(normalize_path("/"), "/");
    }
}
