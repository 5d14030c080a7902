use compat_uri::Uri;

#[track_caller]
fn relativize(base: &str, target: &str) -> String {
    let base = Uri::parse(base).unwrap();
    let target = Uri::parse(target).unwrap();
    base.relativize(&target).into_string()
}

#[test]
fn relativize_prefix() {
    assert_eq!(
        relativize("http://example.com/dir1/", "http://example.com/dir1/dir2/file?q#f"),
        "dir2/file?q#f"
    );
    assert_eq!(relativize("http://a/b", "http://a/b/c"), "c");
    assert_eq!(relativize("http://a/b/", "http://a/b/c/"), "c/");
    assert_eq!(relativize("http://a/b?x", "http://a/b?y#z"), "?y#z");
    assert_eq!(relativize("http://a/b", "http://a/b"), "");
    assert_eq!(relativize("HTTP://a/b/", "http://a/b/c"), "c");
    assert_eq!(relativize("http://a/x/../b/", "http://a/b/./c"), "c");
    assert_eq!(relativize("http://a/", "http://a/x:y"), "./x:y");
}

#[test]
fn relativize_unrelated() {
    assert_eq!(
        relativize("http://host1:123/path2", "http://host3:456/path7"),
        "http://host3:456/path7"
    );
    assert_eq!(relativize("http://a/b", "https://a/b/c"), "https://a/b/c");
    assert_eq!(relativize("http://a/b", "http://A/b/c"), "http://A/b/c");
    assert_eq!(relativize("http://a/b", "http://a/bc"), "http://a/bc");
    assert_eq!(relativize("http://a/b/c", "http://a/b/"), "http://a/b/");
    assert_eq!(relativize("mailto:a", "mailto:a/b"), "mailto:a/b");
    assert_eq!(relativize("http://a/", "mailto:x"), "mailto:x");
}

#[test]
fn relativize_then_resolve() {
    let base = Uri::parse("http://example.com/dir1/").unwrap();
    for s in [
        "http://example.com/dir1/dir2/file?q#f",
        "http://example.com/dir1/",
        "http://example.com/dir1/a:b",
        "http://other.com/x",
    ] {
        let target = Uri::parse(s).unwrap();
        let rel = base.relativize(&target);
        assert_eq!(base.resolve_uri(&rel), target, "{s}");
    }
}
