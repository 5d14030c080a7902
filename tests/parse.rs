use compat_uri::{error::ParseErrorKind, Uri};

#[track_caller]
fn fail(s: &str, index: usize, kind: ParseErrorKind) {
    let e = Uri::parse(s).unwrap_err();
    assert_eq!(e.index(), index);
    assert_eq!(e.kind(), kind);
}

#[test]
fn parse_absolute() {
    let u = Uri::parse("http://host123:456/path789").unwrap();
    assert_eq!(u.scheme(), Some("http"));
    assert_eq!(u.raw_authority().unwrap(), "host123:456");
    assert_eq!(u.raw_user_info(), None);
    assert_eq!(u.host(), Some("host123"));
    assert_eq!(u.port(), Some(456));
    assert_eq!(u.raw_path().unwrap(), "/path789");
    assert_eq!(u.raw_query(), None);
    assert_eq!(u.raw_fragment(), None);
    assert!(u.is_absolute());
    assert!(!u.is_opaque());
    assert!(u.has_server_authority());

    let u = Uri::parse("http://host123:456/path789#%20Hello").unwrap();
    assert_eq!(u.raw_fragment().unwrap(), "%20Hello");
    assert_eq!(u.fragment().unwrap(), " Hello");

    let u = Uri::parse("ftp://us%20er@h/a%2Fb?x=%41#").unwrap();
    assert_eq!(u.raw_user_info().unwrap(), "us%20er");
    assert_eq!(u.user_info().unwrap(), "us er");
    assert_eq!(u.raw_authority().unwrap(), "us%20er@h");
    assert_eq!(u.authority().unwrap(), "us er@h");
    assert_eq!(u.path().unwrap(), "/a/b");
    assert_eq!(u.query().unwrap(), "x=A");
    assert_eq!(u.fragment().unwrap(), "");
    assert_eq!(u.raw_scheme_specific_part(), "//us%20er@h/a%2Fb?x=%41");
    assert_eq!(u.scheme_specific_part(), "//us er@h/a/b?x=A");
}

#[test]
fn parse_opaque() {
    let u = Uri::parse("mailto:a@b.com#top").unwrap();
    assert!(u.is_opaque());
    assert_eq!(u.scheme(), Some("mailto"));
    assert_eq!(u.raw_scheme_specific_part(), "a@b.com");
    assert_eq!(u.raw_authority(), None);
    assert_eq!(u.raw_path(), None);
    assert_eq!(u.raw_query(), None);
    assert_eq!(u.fragment().unwrap(), "top");

    let u = Uri::parse("urn:isbn:096139210x").unwrap();
    assert!(u.is_opaque());
    assert_eq!(u.raw_scheme_specific_part(), "isbn:096139210x");
}

#[test]
fn parse_relative() {
    let u = Uri::parse("../a?b#c").unwrap();
    assert!(!u.is_absolute());
    assert!(!u.is_opaque());
    assert_eq!(u.scheme(), None);
    assert_eq!(u.raw_path().unwrap(), "../a");
    assert_eq!(u.raw_query().unwrap(), "b");
    assert_eq!(u.raw_fragment().unwrap(), "c");

    let u = Uri::parse("").unwrap();
    assert_eq!(u.raw_path().unwrap(), "");
    assert_eq!(u.raw_authority(), None);
    assert_eq!(u.raw_query(), None);
    assert_eq!(u.raw_fragment(), None);

    let u = Uri::parse("#s").unwrap();
    assert_eq!(u.raw_path().unwrap(), "");
    assert_eq!(u.raw_fragment().unwrap(), "s");

    let u = Uri::parse("a/b:c").unwrap();
    assert_eq!(u.scheme(), None);
    assert_eq!(u.raw_path().unwrap(), "a/b:c");
}

#[test]
fn empty_components() {
    let u = Uri::parse("file:///etc/hosts").unwrap();
    assert_eq!(u.raw_authority().unwrap(), "");
    assert_eq!(u.host(), Some(""));
    assert_eq!(u.port(), None);
    assert_eq!(u.raw_path().unwrap(), "/etc/hosts");

    let u = Uri::parse("http://?q").unwrap();
    assert_eq!(u.raw_authority().unwrap(), "");
    assert_eq!(u.raw_query().unwrap(), "q");
    let u = Uri::parse("//#f").unwrap();
    assert_eq!(u.raw_authority().unwrap(), "");

    let u = Uri::parse("http://a/?").unwrap();
    assert_eq!(u.raw_query().unwrap(), "");
    let u = Uri::parse("http://a/").unwrap();
    assert_eq!(u.raw_query(), None);

    let u = Uri::parse("http://host:/").unwrap();
    assert_eq!(u.host(), Some("host"));
    assert_eq!(u.port(), None);

    let u = Uri::parse("file:/etc").unwrap();
    assert!(!u.is_opaque());
    assert_eq!(u.raw_authority(), None);
    assert_eq!(u.raw_path().unwrap(), "/etc");
}

#[test]
fn parse_hosts() {
    let u = Uri::parse("http://192.168.0.1:80/").unwrap();
    assert_eq!(u.host(), Some("192.168.0.1"));
    assert_eq!(u.port(), Some(80));

    let u = Uri::parse("http://[::1]:8080/").unwrap();
    assert_eq!(u.host(), Some("[::1]"));
    assert_eq!(u.port(), Some(8080));

    let u = Uri::parse("http://[fe80::1%eth0]/").unwrap();
    assert_eq!(u.host(), Some("[fe80::1%eth0]"));
    assert_eq!(u.authority().unwrap(), "[fe80::1%eth0]");

    let u = Uri::parse("http://[::ffff:10.0.0.1]/").unwrap();
    assert_eq!(u.host(), Some("[::ffff:10.0.0.1]"));

    let u = Uri::parse("http://example.com./").unwrap();
    assert_eq!(u.host(), Some("example.com."));

    fail("http://[::1::2]/", 8, ParseErrorKind::InvalidIpv6Addr);
    fail("http://[fe80::1%]/", 16, ParseErrorKind::InvalidIpv6Addr);
}

#[test]
fn registry_authority() {
    let u = Uri::parse("//a_b/c").unwrap();
    assert!(!u.has_server_authority());
    assert_eq!(u.raw_authority().unwrap(), "a_b");
    assert_eq!(u.host(), None);
    assert_eq!(u.raw_user_info(), None);
    assert_eq!(u.port(), None);

    let e = u.parse_server_authority().unwrap_err();
    assert_eq!(e.kind(), ParseErrorKind::InvalidHostname);
    assert_eq!(e.index(), 3);

    // Not a valid IPv4 address, nor a host name.
    let u = Uri::parse("http://1.2.3.256/").unwrap();
    assert!(!u.has_server_authority());

    let u = Uri::parse("http://host:-1/").unwrap();
    assert!(!u.has_server_authority());
    assert_eq!(
        u.parse_server_authority().unwrap_err().kind(),
        ParseErrorKind::InvalidPort
    );

    let u = Uri::parse("http://h:2147483648/").unwrap();
    assert!(!u.has_server_authority());
    let u = Uri::parse("http://h:2147483647/").unwrap();
    assert_eq!(u.port(), Some(2147483647));

    let u = Uri::parse("http://example.com/").unwrap();
    assert_eq!(u.parse_server_authority().unwrap(), u);
}

#[test]
fn parse_errors() {
    fail("://example.com/path", 0, ParseErrorKind::EmptyScheme);
    fail("1http://a", 0, ParseErrorKind::UnexpectedChar);
    fail("ht_tp://a", 2, ParseErrorKind::UnexpectedChar);
    fail("http://a/b c", 10, ParseErrorKind::UnexpectedChar);
    fail("http://a/?q#f#g", 13, ParseErrorKind::UnexpectedChar);
    fail("http://a/%zz", 9, ParseErrorKind::InvalidOctet);
    fail("http://a/%4", 9, ParseErrorKind::InvalidOctet);
    fail("http://", 7, ParseErrorKind::EmptyAuthority);
    fail("//", 2, ParseErrorKind::EmptyAuthority);
    fail("foo:", 4, ParseErrorKind::EmptySchemeSpecificPart);
    fail("foo:#f", 4, ParseErrorKind::EmptySchemeSpecificPart);
    fail("http://a b/", 8, ParseErrorKind::UnexpectedChar);
}

#[test]
fn non_ascii() {
    let u = Uri::parse("http://example.com/caf\u{e9}?\u{3042}").unwrap();
    assert_eq!(u.path().unwrap(), "/caf\u{e9}");
    assert_eq!(
        u.to_ascii_string(),
        "http://example.com/caf%C3%A9?%E3%81%82"
    );

    // Non-ASCII whitespace is not allowed unescaped.
    fail("http://a/\u{3000}", 9, ParseErrorKind::UnexpectedChar);

    let u = Uri::parse("http://a/%FF").unwrap();
    assert_eq!(u.path().unwrap(), "/\u{fffd}");
}

#[test]
fn equality() {
    use std::collections::HashSet;

    let a = Uri::parse("HTTP://a/b").unwrap();
    let b = Uri::parse("http://a/b").unwrap();
    assert_eq!(a, b);
    assert_eq!(a.scheme(), Some("HTTP"));

    assert_ne!(Uri::parse("http://A/b").unwrap(), b);
    assert_ne!(Uri::parse("http://a/%62").unwrap(), b);
    assert_ne!(Uri::parse("//a/b").unwrap(), b);

    let set: HashSet<Uri> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}

#[test]
fn conversions() {
    let u: Uri = "http://a/b".parse().unwrap();
    assert_eq!(u.to_string(), "http://a/b");
    assert_eq!(Uri::try_from("http://a/b").unwrap(), u);
    assert_eq!(Uri::try_from(String::from("http://a/b")).unwrap(), u);
    assert_eq!(String::from(u.clone()), "http://a/b");
    assert_eq!(u.clone().into_string(), "http://a/b");
    assert_eq!(AsRef::<str>::as_ref(&u), "http://a/b");
    assert!("a b".parse::<Uri>().is_err());

    let debug = format!("{u:?}");
    assert!(debug.starts_with("Uri {"));
    assert!(debug.contains("scheme: Some(\"http\")"));
}
