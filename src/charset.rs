//! Named character encodings.

use alloc::{string::String, vec::Vec};
use core::fmt;
use encoding::{
    all, label::encoding_from_whatwg_label, DecoderTrap, EncoderTrap, Encoding, EncodingRef,
};

#[derive(Clone, Copy)]
enum Kind {
    /// Big-endian with a byte order mark on encoding; the byte order
    /// mark, if any, selects the endianness on decoding.
    Utf16,
    Other(EncodingRef),
}

/// A character encoding looked up by name.
///
/// Encoding never fails: a character the encoding cannot represent is
/// replaced by `'?'`. Decoding never fails either: a malformed sequence
/// is replaced by `U+FFFD`.
///
/// # Examples
///
/// ```
/// use compat_uri::charset::Charset;
///
/// let latin1 = Charset::for_name("latin1").unwrap();
/// assert_eq!(latin1.name(), "ISO-8859-1");
/// assert_eq!(latin1.encode("caf\u{e9}"), b"caf\xe9");
/// assert_eq!(Charset::for_name("US-ASCII").unwrap().encode("\u{e9}"), b"?");
/// ```
#[derive(Clone, Copy)]
pub struct Charset {
    name: &'static str,
    kind: Kind,
}

const KNOWN: &[(&str, &[&str], Kind)] = &[
    ("UTF-8", &["UTF8", "unicode-1-1-utf-8"], Kind::Other(all::UTF_8)),
    ("UTF-16", &["UTF16", "UTF_16", "unicode"], Kind::Utf16),
    (
        "UTF-16BE",
        &["UTF_16BE", "X-UTF-16BE", "UnicodeBigUnmarked"],
        Kind::Other(all::UTF_16BE),
    ),
    (
        "UTF-16LE",
        &["UTF_16LE", "X-UTF-16LE", "UnicodeLittleUnmarked"],
        Kind::Other(all::UTF_16LE),
    ),
    (
        "ISO-8859-1",
        &["ISO8859_1", "ISO8859-1", "ISO_8859_1", "ISO_8859-1", "8859_1", "latin1", "l1", "cp819"],
        Kind::Other(all::ISO_8859_1),
    ),
    (
        "US-ASCII",
        &["ASCII", "ascii7", "646", "iso646-us", "us"],
        Kind::Other(all::ASCII),
    ),
];

impl Charset {
    /// The UTF-8 encoding.
    pub const UTF_8: Charset = Charset {
        name: "UTF-8",
        kind: Kind::Other(all::UTF_8),
    };

    /// Looks up a character encoding by name, ignoring ASCII case.
    ///
    /// The names `UTF-8`, `UTF-16`, `UTF-16BE`, `UTF-16LE`, `ISO-8859-1` and
    /// `US-ASCII` are recognized along with their common aliases. Any other name
    /// is looked up as a WHATWG encoding label.
    ///
    /// Returns `None` if the name is empty or unknown.
    #[must_use]
    pub fn for_name(name: &str) -> Option<Charset> {
        if name.is_empty() {
            return None;
        }
        for &(canonical, aliases, kind) in KNOWN {
            if canonical.eq_ignore_ascii_case(name)
                || aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
            {
                return Some(Charset {
                    name: canonical,
                    kind,
                });
            }
        }
        let encoding = encoding_from_whatwg_label(name)?;
        Some(Charset {
            name: encoding.whatwg_name().unwrap_or(encoding.name()),
            kind: Kind::Other(encoding),
        })
    }

    /// Returns the canonical name of the encoding.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Encodes a string to bytes.
    #[must_use]
    pub fn encode(&self, s: &str) -> Vec<u8> {
        match self.kind {
            Kind::Utf16 => {
                let mut buf = Vec::with_capacity(s.len() * 2 + 2);
                if !s.is_empty() {
                    buf.extend_from_slice(&[0xfe, 0xff]);
                    buf.extend(encode_with(all::UTF_16BE, s));
                }
                buf
            }
            Kind::Other(encoding) => encode_with(encoding, s),
        }
    }

    /// Decodes bytes to a string.
    #[must_use]
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self.kind {
            Kind::Utf16 => match bytes {
                [0xfe, 0xff, rest @ ..] => decode_with(all::UTF_16BE, rest),
                [0xff, 0xfe, rest @ ..] => decode_with(all::UTF_16LE, rest),
                _ => decode_with(all::UTF_16BE, bytes),
            },
            Kind::Other(encoding) => decode_with(encoding, bytes),
        }
    }
}

// Replacement traps never fail, so the error arms are unreachable.

fn encode_with(encoding: EncodingRef, s: &str) -> Vec<u8> {
    encoding
        .encode(s, EncoderTrap::Replace)
        .unwrap_or_default()
}

fn decode_with(encoding: EncodingRef, bytes: &[u8]) -> String {
    encoding
        .decode(bytes, DecoderTrap::Replace)
        .unwrap_or_default()
}

impl fmt::Debug for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Charset").field(&self.name).finish()
    }
}

impl PartialEq for Charset {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Charset {}
