//! Percent-encoding utilities.

pub(crate) mod table;

pub use table::Table;

use alloc::{borrow::Cow, string::String, vec::Vec};
use core::{hash, iter::FusedIterator, str};
use ref_cast::{ref_cast_custom, RefCastCustom};

/// Percent-encoded string slices.
///
/// Every component accessor of [`Uri`] prefixed with `raw_` returns an `EStr`
/// slice holding the component exactly as it appears in the URI string.
/// Call [`decode`] on it to obtain the decoded bytes or characters.
///
/// # Comparison
///
/// `EStr` slices are compared [lexicographically](Ord#lexicographical-comparison)
/// by their byte values. Normalization is **not** performed prior to comparison.
///
/// # Examples
///
/// ```
/// use compat_uri::Uri;
///
/// let uri = Uri::parse("http://example.com/caf%C3%A9?q=%41%42")?;
/// let path = uri.raw_path().unwrap();
/// assert_eq!(path, "/caf%C3%A9");
/// assert_eq!(path.decode().to_string_lossy(), "/café");
/// # Ok::<_, compat_uri::ParseError>(())
/// ```
///
/// [`Uri`]: crate::Uri
/// [`decode`]: Self::decode
#[derive(RefCastCustom)]
#[repr(transparent)]
pub struct EStr {
    inner: str,
}

impl EStr {
    /// Converts a string slice to an `EStr` slice assuming validity.
    #[ref_cast_custom]
    pub(crate) const fn new_validated(s: &str) -> &Self;

    /// Converts a string slice to an `EStr` slice, returning `None` if the
    /// string contains a character that is neither reserved, unreserved, nor
    /// of the "other" category, or an improperly escaped octet.
    #[must_use]
    pub fn new(s: &str) -> Option<&Self> {
        if table::URIC.validate(s) {
            Some(Self::new_validated(s))
        } else {
            None
        }
    }

    /// Yields the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Returns the length of the `EStr` slice in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Checks whether the `EStr` slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns an iterator used to decode the `EStr` slice.
    ///
    /// A `'%'` that is not followed by two hexadecimal digits is yielded as is.
    /// This can only happen inside the scope identifier of an IPv6 literal.
    ///
    /// Note that the iterator will **not** decode `U+002B` (+) as `0x20` (space).
    ///
    /// # Examples
    ///
    /// ```
    /// use compat_uri::pct_enc::EStr;
    ///
    /// let dec = EStr::new("%C2%A1Hola%21").unwrap().decode();
    /// assert_eq!(*dec.clone().to_bytes(), [0xc2, 0xa1, 0x48, 0x6f, 0x6c, 0x61, 0x21]);
    /// assert_eq!(dec.to_string_lossy(), "¡Hola!");
    /// ```
    pub fn decode(&self) -> Decode<'_> {
        Decode::new(&self.inner)
    }
}

impl AsRef<str> for EStr {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl PartialEq for EStr {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl PartialEq<str> for EStr {
    fn eq(&self, other: &str) -> bool {
        &self.inner == other
    }
}

impl PartialEq<EStr> for str {
    fn eq(&self, other: &EStr) -> bool {
        self == &other.inner
    }
}

impl Eq for EStr {}

impl hash::Hash for EStr {
    fn hash<H: hash::Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

const fn gen_octet_table(hi: bool) -> [u8; 256] {
    let mut out = [0xff; 256];
    let shift = if hi { 4 } else { 0 };

    let mut i = 0;
    while i < 10 {
        out[(i + b'0') as usize] = i << shift;
        i += 1;
    }
    while i < 16 {
        out[(i - 10 + b'A') as usize] = i << shift;
        out[(i - 10 + b'a') as usize] = i << shift;
        i += 1;
    }
    out
}

const OCTET_TABLE_HI: &[u8; 256] = &gen_octet_table(true);
const OCTET_TABLE_LO: &[u8; 256] = &gen_octet_table(false);

/// Decodes a percent-encoded octet, assuming that the bytes are hexadecimal.
pub(crate) fn decode_octet(hi: u8, lo: u8) -> u8 {
    debug_assert!(hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit());
    OCTET_TABLE_HI[hi as usize] | OCTET_TABLE_LO[lo as usize]
}

/// Decodes a hexadecimal digit.
pub(crate) const fn decode_hexdigit(x: u8) -> Option<u8> {
    let v = OCTET_TABLE_LO[x as usize];
    if v < 128 {
        Some(v)
    } else {
        None
    }
}

/// Checks whether both bytes are hexadecimal digits.
pub(crate) const fn is_hexdig_pair(hi: u8, lo: u8) -> bool {
    OCTET_TABLE_LO[hi as usize] | OCTET_TABLE_LO[lo as usize] < 128
}

/// Returns the index of the first well-formed escaped octet in `s`.
fn find_escaped(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    bytes.iter().enumerate().position(|(i, &x)| {
        x == b'%'
            && matches!(bytes.get(i + 1..i + 3), Some(&[hi, lo]) if is_hexdig_pair(hi, lo))
    })
}

/// An iterator used to decode an [`EStr`] slice.
///
/// This struct is created by [`EStr::decode`]. Normally you'll use the methods below
/// instead of iterating over a `Decode` manually, unless you need precise control
/// over allocation.
#[derive(Clone, Debug)]
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Decode<'a> {
    source: &'a str,
}

/// An item returned by the [`Decode`] iterator.
#[derive(Clone, Copy, Debug)]
pub enum DecodedChunk<'a> {
    /// An unencoded subslice.
    Unencoded(&'a str),
    /// A percent-encoded octet, decoded (for example, `"%20"` decoded as `0x20`).
    PctDecoded(u8),
}

impl<'a> Decode<'a> {
    pub(crate) fn new(source: &'a str) -> Self {
        Self { source }
    }

    fn next_if_unencoded(&mut self) -> Option<&'a str> {
        let i = find_escaped(self.source).unwrap_or(self.source.len());

        if i == 0 {
            None
        } else {
            let s;
            (s, self.source) = self.source.split_at(i);
            Some(s)
        }
    }

    /// Decodes the slice to bytes.
    ///
    /// This method allocates only when the slice contains any percent-encoded octet.
    #[must_use]
    pub fn to_bytes(mut self) -> Cow<'a, [u8]> {
        let first = self.next_if_unencoded().unwrap_or_default();
        if self.source.is_empty() {
            return Cow::Borrowed(first.as_bytes());
        }

        let mut buf = Vec::with_capacity(first.len() + self.source.len());
        buf.extend_from_slice(first.as_bytes());
        for chunk in self {
            match chunk {
                DecodedChunk::Unencoded(s) => buf.extend_from_slice(s.as_bytes()),
                DecodedChunk::PctDecoded(x) => buf.push(x),
            }
        }
        Cow::Owned(buf)
    }

    /// Decodes the slice to a string, replacing any invalid UTF-8 sequences with
    /// [`U+FFFD REPLACEMENT CHARACTER`][U+FFFD].
    ///
    /// [U+FFFD]: char::REPLACEMENT_CHARACTER
    ///
    /// This method allocates only when the slice contains any percent-encoded octet.
    #[must_use]
    pub fn to_string_lossy(self) -> Cow<'a, str> {
        match self.to_bytes() {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
            Cow::Owned(bytes) => match String::from_utf8(bytes) {
                Ok(s) => Cow::Owned(s),
                Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
            },
        }
    }
}

impl<'a> Iterator for Decode<'a> {
    type Item = DecodedChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.source.is_empty() {
            None
        } else if let Some(s) = self.next_if_unencoded() {
            Some(DecodedChunk::Unencoded(s))
        } else {
            let s;
            (s, self.source) = self.source.split_at(3);
            let x = decode_octet(s.as_bytes()[1], s.as_bytes()[2]);
            Some(DecodedChunk::PctDecoded(x))
        }
    }
}

impl FusedIterator for Decode<'_> {}

pub(crate) fn encode_byte(x: u8) -> &'static str {
    const TABLE: &[u8; 256 * 3] = &{
        const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

        let mut i = 0;
        let mut table = [0; 256 * 3];
        while i < 256 {
            table[i * 3] = b'%';
            table[i * 3 + 1] = HEX_DIGITS[i >> 4];
            table[i * 3 + 2] = HEX_DIGITS[i & 0b1111];
            i += 1;
        }
        table
    };

    const TABLE_STR: &str = match str::from_utf8(TABLE) {
        Ok(s) => s,
        Err(_) => unreachable!(),
    };

    &TABLE_STR[x as usize * 3..x as usize * 3 + 3]
}

fn push_encoded_char(buf: &mut String, ch: char) {
    for &x in ch.encode_utf8(&mut [0; 4]).as_bytes() {
        buf.push_str(encode_byte(x));
    }
}

/// Appends `s` to `buf`, escaping every ASCII character not allowed by the
/// table, `'%'` included.
///
/// When the table allows escaped octets, non-ASCII whitespace and control
/// characters are escaped as UTF-8 while the "other" category is kept as is.
pub(crate) fn quote(buf: &mut String, s: &str, table: Table) {
    for ch in s.chars() {
        if ch.is_ascii() {
            if table.allows_ascii(ch as u8) {
                buf.push(ch);
            } else {
                buf.push_str(encode_byte(ch as u8));
            }
        } else if table.allows_escaped() && !table::is_other(ch) {
            push_encoded_char(buf, ch);
        } else {
            buf.push(ch);
        }
    }
}

/// Escapes every non-ASCII character in `s` as UTF-8.
pub(crate) fn encode_non_ascii(s: &str) -> Cow<'_, str> {
    if s.is_ascii() {
        return Cow::Borrowed(s);
    }
    let mut buf = String::with_capacity(s.len() * 2);
    for ch in s.chars() {
        if ch.is_ascii() {
            buf.push(ch);
        } else {
            push_encoded_char(&mut buf, ch);
        }
    }
    Cow::Owned(buf)
}
