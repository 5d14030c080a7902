//! `application/x-www-form-urlencoded` encoding and decoding.
//!
//! # Examples
//!
//! ```
//! use compat_uri::form;
//!
//! assert_eq!(form::encode(" Hello", Some("UTF-8"))?, "+Hello");
//! assert_eq!(form::encode("caf\u{e9}!", Some("UTF-8"))?, "caf%C3%A9%21");
//! assert_eq!(form::decode("caf%C3%A9+%21", Some("UTF-8"))?, "café !");
//! # Ok::<_, Box<dyn std::error::Error>>(())
//! ```

use crate::{
    charset::Charset,
    error::{DecodeError, EncodeError},
    pct_enc::{self, table::FORM_SAFE},
};
use alloc::{borrow::ToOwned, string::String, vec::Vec};

/// Encodes a string in the named character encoding.
///
/// ASCII letters, digits and `"-_.*"` are kept as is, and a space becomes
/// `'+'`. Every maximal run of other characters is encoded at once and each
/// resulting byte is written as `%XX` with uppercase hexadecimal digits.
/// With `UTF-16`, every run thus carries its own byte order mark.
///
/// # Errors
///
/// Returns `Err` if no encoding is given or if it is unknown.
///
/// # Examples
///
/// ```
/// use compat_uri::form;
///
/// assert_eq!(form::encode("a+b c", Some("UTF-8"))?, "a%2Bb+c");
/// assert_eq!(form::encode("\u{e9}", Some("UTF-16"))?, "%FE%FF%00%E9");
/// assert_eq!(form::encode("\u{3042}", Some("US-ASCII"))?, "%3F");
/// # Ok::<_, compat_uri::error::EncodeError>(())
/// ```
pub fn encode(s: &str, encoding: Option<&str>) -> Result<String, EncodeError> {
    let name = encoding.ok_or(EncodeError::NullArgument)?;
    let charset =
        Charset::for_name(name).ok_or_else(|| EncodeError::UnsupportedEncoding(name.to_owned()))?;
    Ok(encode_with(s, charset))
}

/// Encodes a string in UTF-8.
///
/// This is the same as [`encode`] with `Some("UTF-8")`, which cannot fail.
#[must_use]
pub fn encode_utf8(s: &str) -> String {
    encode_with(s, Charset::UTF_8)
}

fn is_safe(ch: char) -> bool {
    ch == ' ' || (ch.is_ascii() && FORM_SAFE.allows_ascii(ch as u8))
}

fn encode_with(s: &str, charset: Charset) -> String {
    let mut buf = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(ch) = rest.chars().next() {
        if ch == ' ' {
            buf.push('+');
            rest = &rest[1..];
        } else if is_safe(ch) {
            buf.push(ch);
            rest = &rest[1..];
        } else {
            let end = rest.find(is_safe).unwrap_or(rest.len());
            for x in charset.encode(&rest[..end]) {
                buf.push_str(pct_enc::encode_byte(x));
            }
            rest = &rest[end..];
        }
    }
    buf
}

/// Decodes a string in the named character encoding.
///
/// A `'+'` becomes a space. Every maximal run of `%XX` triples is collected
/// into bytes and decoded at once; malformed sequences decode to `U+FFFD`.
/// Other characters are kept as is.
///
/// # Errors
///
/// Returns `Err` if no encoding is given, if it is empty or unknown, or if a
/// `'%'` is not followed by two hexadecimal digits.
///
/// # Examples
///
/// ```
/// use compat_uri::{error::DecodeError, form};
///
/// assert_eq!(form::decode("%FE%FF%00%E9", Some("UTF-16"))?, "\u{e9}");
/// assert_eq!(
///     form::decode("%4", Some("UTF-8")),
///     Err(DecodeError::IncompleteEscape { index: 0 })
/// );
/// assert_eq!(
///     form::decode("a%zz", Some("UTF-8")),
///     Err(DecodeError::IllegalEscape { index: 1 })
/// );
/// # Ok::<_, DecodeError>(())
/// ```
pub fn decode(s: &str, encoding: Option<&str>) -> Result<String, DecodeError> {
    let name = encoding.ok_or(DecodeError::NullArgument)?;
    let charset =
        Charset::for_name(name).ok_or_else(|| DecodeError::UnsupportedEncoding(name.to_owned()))?;
    decode_with(s, charset)
}

/// Decodes a string in UTF-8.
///
/// # Errors
///
/// Returns `Err` if a `'%'` is not followed by two hexadecimal digits.
pub fn decode_utf8(s: &str) -> Result<String, DecodeError> {
    decode_with(s, Charset::UTF_8)
}

fn decode_with(s: &str, charset: Charset) -> Result<String, DecodeError> {
    let bytes = s.as_bytes();
    let mut buf = String::with_capacity(s.len());
    let mut octets = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                buf.push(' ');
                i += 1;
            }
            b'%' => {
                octets.clear();
                while i < bytes.len() && bytes[i] == b'%' {
                    let Some(&[hi, lo]) = bytes.get(i + 1..i + 3) else {
                        return Err(DecodeError::IncompleteEscape { index: i });
                    };
                    if !pct_enc::is_hexdig_pair(hi, lo) {
                        return Err(DecodeError::IllegalEscape { index: i });
                    }
                    octets.push(pct_enc::decode_octet(hi, lo));
                    i += 3;
                }
                buf.push_str(&charset.decode(&octets));
            }
            _ => {
                let end = bytes[i..]
                    .iter()
                    .position(|&x| x == b'+' || x == b'%')
                    .map_or(bytes.len(), |j| i + j);
                buf.push_str(&s[i..end]);
                i = end;
            }
        }
    }
    Ok(buf)
}
