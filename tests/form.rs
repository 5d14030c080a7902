use compat_uri::{
    error::{DecodeError, EncodeError},
    form,
};

#[test]
fn encode() {
    assert_eq!(form::encode(" Hello", Some("UTF-8")).unwrap(), "+Hello");
    assert_eq!(form::encode("a-b_c.d*e", Some("UTF-8")).unwrap(), "a-b_c.d*e");
    assert_eq!(form::encode("a+b=c&d/e~", Some("UTF-8")).unwrap(), "a%2Bb%3Dc%26d%2Fe%7E");
    assert_eq!(form::encode("\u{3042}", Some("utf8")).unwrap(), "%E3%81%82");
    assert_eq!(form::encode("\u{e9}", Some("ISO-8859-1")).unwrap(), "%E9");
    assert_eq!(form::encode("\u{e9}", Some("UTF-16BE")).unwrap(), "%00%E9");
    assert_eq!(form::encode("\u{e9}", Some("UTF-16LE")).unwrap(), "%E9%00");
    assert_eq!(form::encode("\u{e9}", Some("US-ASCII")).unwrap(), "%3F");
    assert_eq!(form::encode("\u{3042}", Some("shift_jis")).unwrap(), "%82%A0");
    assert_eq!(form::encode("", Some("UTF-16")).unwrap(), "");
    assert_eq!(form::encode_utf8("x y"), "x+y");
}

#[test]
fn decode() {
    assert_eq!(form::decode("+Hello", Some("UTF-8")).unwrap(), " Hello");
    assert_eq!(form::decode("%E3%81%82", Some("UTF-8")).unwrap(), "\u{3042}");
    assert_eq!(form::decode("%E9", Some("latin1")).unwrap(), "\u{e9}");
    assert_eq!(form::decode("%FE%FF%00%E9", Some("UTF-16")).unwrap(), "\u{e9}");
    assert_eq!(form::decode("%FF%FE%E9%00", Some("UTF-16")).unwrap(), "\u{e9}");
    assert_eq!(form::decode("\u{e9}+%41", Some("UTF-8")).unwrap(), "\u{e9} A");
    assert_eq!(form::decode("%FF", Some("UTF-8")).unwrap(), "\u{fffd}");
    assert_eq!(form::decode_utf8("a%2Bb").unwrap(), "a+b");
}

#[test]
fn decode_errors() {
    let decode = |s: &str| form::decode(s, Some("UTF-8")).unwrap_err();
    assert_eq!(decode("%"), DecodeError::IncompleteEscape { index: 0 });
    assert_eq!(decode("ab%4"), DecodeError::IncompleteEscape { index: 2 });
    assert_eq!(decode("%G1"), DecodeError::IllegalEscape { index: 0 });
    assert_eq!(decode("%41%4x"), DecodeError::IllegalEscape { index: 3 });
    assert_eq!(decode("%-1"), DecodeError::IllegalEscape { index: 0 });
}

#[test]
fn argument_errors() {
    assert_eq!(form::encode("x", None), Err(EncodeError::NullArgument));
    assert_eq!(form::decode("x", None), Err(DecodeError::NullArgument));
    assert_eq!(
        form::encode("x", Some("no-such-encoding")),
        Err(EncodeError::UnsupportedEncoding("no-such-encoding".to_owned()))
    );
    assert_eq!(
        form::decode("x", Some("")),
        Err(DecodeError::UnsupportedEncoding(String::new()))
    );
    assert_eq!(
        form::decode("x", Some("")).unwrap_err().to_string(),
        "empty string encoding name"
    );
}

#[test]
fn round_trip() {
    let ascii = "a b+c/d?e=f&g%h~*._-";
    let unicode = "caf\u{e9} \u{3042}\u{1f600}!";

    for encoding in ["UTF-8", "UTF-16", "UTF-16BE", "UTF-16LE", "ISO-8859-1", "US-ASCII"] {
        let encoded = form::encode(ascii, Some(encoding)).unwrap();
        assert_eq!(form::decode(&encoded, Some(encoding)).unwrap(), ascii, "{encoding}");
    }
    for encoding in ["UTF-8", "UTF-16", "UTF-16BE", "UTF-16LE"] {
        let encoded = form::encode(unicode, Some(encoding)).unwrap();
        assert_eq!(form::decode(&encoded, Some(encoding)).unwrap(), unicode, "{encoding}");
    }
}
