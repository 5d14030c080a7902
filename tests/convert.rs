use compat_uri::{error::MalformedUrlErrorKind, Uri, Url};

#[test]
fn url_to_uri() {
    let url = Url::parse("http://user@example.com:8080/docs/index.html?lang=en#intro").unwrap();
    let uri = url.to_uri().unwrap();
    assert_eq!(uri.as_str(), "http://user@example.com:8080/docs/index.html?lang=en#intro");
    assert_eq!(uri.user_info().unwrap(), "user");
    assert_eq!(uri.port(), Some(8080));

    let url = Url::parse("http://a/b c").unwrap();
    assert!(url.to_uri().is_err());
    assert!(Uri::try_from(&url).is_err());
}

#[test]
fn uri_to_url() {
    let uri = Uri::parse("https://[::1]:443/a%20b?x#y").unwrap();
    let url = uri.to_url().unwrap();
    assert_eq!(url.protocol(), "https");
    assert_eq!(url.host(), Some("[::1]"));
    assert_eq!(url.port(), Some(443));
    assert_eq!(url.path(), "/a%20b");
    assert_eq!(url.query(), Some("x"));
    assert_eq!(url.fragment(), Some("y"));
    assert_eq!(Url::try_from(&uri).unwrap(), url);

    let err = |s: &str| Uri::parse(s).unwrap().to_url().unwrap_err().kind();
    assert_eq!(err("a/b"), MalformedUrlErrorKind::NotAbsolute);
    assert_eq!(err("http://host:99999/"), MalformedUrlErrorKind::InvalidPort);
}

#[test]
fn structural_fidelity() {
    for s in [
        "http://host123:456/path789",
        "http://user@example.com:8080/docs/index.html?lang=en#intro",
        "http:///path",
        "https://[fe80::1%25eth0]/",
        "ftp://a/b;type=d?",
        "mailto:x@y",
        "file:/etc/hosts",
        "http://h#",
    ] {
        let url = Url::parse(s).unwrap();
        let back = Url::from_uri(&url.to_uri().unwrap()).unwrap();
        assert_eq!(back, url, "{s}");
        assert_eq!(back.to_external_form(), url.to_external_form(), "{s}");
    }
}
