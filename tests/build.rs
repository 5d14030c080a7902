use compat_uri::{error::ParseErrorKind, Uri};

#[test]
fn from_scheme_specific_part() {
    let u = Uri::from_scheme_specific_part(Some("mailto"), Some("a b@c.com"), None).unwrap();
    assert_eq!(u.as_str(), "mailto:a%20b@c.com");
    assert!(u.is_opaque());
    assert_eq!(u.scheme_specific_part(), "a b@c.com");

    let u = Uri::from_scheme_specific_part(Some("http"), Some("//[::1]/a b"), Some("f g")).unwrap();
    assert_eq!(u.as_str(), "http://[::1]/a%20b#f%20g");
    assert_eq!(u.host(), Some("[::1]"));
    assert_eq!(u.fragment().unwrap(), "f g");

    let u = Uri::from_scheme_specific_part(Some("x"), Some("100%"), None).unwrap();
    assert_eq!(u.as_str(), "x:100%25");
    assert_eq!(u.scheme_specific_part(), "100%");

    let e = Uri::from_scheme_specific_part(Some("foo"), Some(""), None).unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::EmptySchemeSpecificPart);

    let u = Uri::from_scheme_specific_part(None, Some("a/b"), Some("c")).unwrap();
    assert_eq!(u.as_str(), "a/b#c");
}

#[test]
fn from_host() {
    let u = Uri::from_host(Some("http"), Some("::1"), Some("/a b"), None).unwrap();
    assert_eq!(u.as_str(), "http://[::1]/a%20b");

    let u = Uri::from_host(Some("http"), Some("example.com"), Some("/100%"), Some("a#b")).unwrap();
    assert_eq!(u.as_str(), "http://example.com/100%25#a%23b");
    assert_eq!(u.path().unwrap(), "/100%");
    assert_eq!(u.fragment().unwrap(), "a#b");

    let u = Uri::from_host(Some("file"), Some(""), Some("/etc"), None).unwrap();
    assert_eq!(u.as_str(), "file:///etc");
    assert_eq!(u.host(), Some(""));

    let e = Uri::from_host(Some("http"), Some("a_b"), None, None).unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::InvalidHostname);
}

#[test]
fn from_authority() {
    let u = Uri::from_authority(
        Some("http"),
        Some("user@example.com:8080"),
        Some("/a b"),
        Some("x=1 2"),
        Some("frag"),
    )
    .unwrap();
    assert_eq!(u.as_str(), "http://user@example.com:8080/a%20b?x=1%202#frag");
    assert_eq!(u.user_info().unwrap(), "user");
    assert_eq!(u.port(), Some(8080));
    assert_eq!(u.query().unwrap(), "x=1 2");

    let u = Uri::from_authority(Some("http"), Some("reg_name"), Some("/"), None, None).unwrap();
    assert!(!u.has_server_authority());
    assert_eq!(u.raw_authority().unwrap(), "reg_name");

    let u = Uri::from_authority(Some("http"), Some("[fe80::1%eth0]:80"), None, None, None).unwrap();
    assert_eq!(u.host(), Some("[fe80::1%eth0]"));
    assert_eq!(u.port(), Some(80));

    let e = Uri::from_authority(Some("http"), Some("a"), Some("rel"), None, None).unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::RelativePath);
    assert_eq!(e.index(), 8);
}

#[test]
fn from_components() {
    let u = Uri::from_components(
        Some("http"),
        Some("us er"),
        Some("example.com"),
        Some(8080),
        Some("/p"),
        Some("q=1"),
        Some("f"),
    )
    .unwrap();
    assert_eq!(u.as_str(), "http://us%20er@example.com:8080/p?q=1#f");
    assert_eq!(u.user_info().unwrap(), "us er");

    let u = Uri::from_components(Some("http"), None, Some("fe80::1"), None, None, None, None)
        .unwrap();
    assert_eq!(u.as_str(), "http://[fe80::1]");

    let u = Uri::from_components(Some("http"), None, Some("[::1]"), Some(1), None, None, None)
        .unwrap();
    assert_eq!(u.as_str(), "http://[::1]:1");

    // User information and port need a host.
    let u = Uri::from_components(None, Some("u"), None, Some(80), Some("a b"), None, None)
        .unwrap();
    assert_eq!(u.as_str(), "a%20b");

    let e = Uri::from_components(Some("s"), None, Some("h"), None, Some("p"), None, None)
        .unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::RelativePath);
    assert_eq!(e.index(), 5);

    let e = Uri::from_components(Some("http"), None, Some("a b"), None, None, None, None)
        .unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::UnexpectedChar);
}

#[test]
fn quoted_round_trip() {
    let path = "/dir name/100%/a?b";
    let query = "k=v w&x=%";
    let u = Uri::from_components(
        Some("http"),
        None,
        Some("example.com"),
        None,
        Some(path),
        Some(query),
        None,
    )
    .unwrap();
    assert_eq!(u.path().unwrap(), path);
    assert_eq!(u.query().unwrap(), query);
    assert_eq!(Uri::parse(u.as_str()).unwrap(), u);
}
