//! Character class tables.
//!
//! The classes follow the grammar of [RFC 2396] as amended by [RFC 2732]
//! for bracketed IPv6 literals. Tables that allow escaped octets also
//! allow "other" characters: non-ASCII characters that are neither
//! whitespace nor control characters.
//!
//! [RFC 2396]: https://datatracker.ietf.org/doc/html/rfc2396
//! [RFC 2732]: https://datatracker.ietf.org/doc/html/rfc2732

use crate::pct_enc;

const MASK_PCT_ENCODED: u64 = 1 << b'%';
const MASK_OTHER: u64 = 1;
const MASK_UNENCODED_ASCII: u64 = !(MASK_PCT_ENCODED | MASK_OTHER);

/// Checks whether a character belongs to the "other" category.
pub(crate) fn is_other(ch: char) -> bool {
    !ch.is_ascii() && !ch.is_whitespace() && !ch.is_control()
}

/// A table specifying the characters allowed in a string.
#[derive(Clone, Copy, Debug)]
pub struct Table(u64, u64);

impl Table {
    /// Creates a table that only allows the given unencoded bytes.
    ///
    /// # Panics
    ///
    /// Panics if any of the bytes is not ASCII or equals `0` or `b'%'`.
    #[must_use]
    pub const fn new(mut bytes: &[u8]) -> Self {
        let mut table = 0;
        while let [cur, rem @ ..] = bytes {
            assert!(
                !matches!(cur, 0 | b'%' | 128..),
                "cannot allow non-ASCII byte, 0, or %"
            );
            table |= 1u128.wrapping_shl(*cur as u32);
            bytes = rem;
        }
        Self(table as u64, (table >> 64) as u64)
    }

    /// Combines two tables into one.
    #[must_use]
    pub const fn or(self, other: Self) -> Self {
        Self(self.0 | other.0, self.1 | other.1)
    }

    /// Marks this table as allowing escaped octets along with
    /// characters of the "other" category.
    #[must_use]
    pub const fn or_escaped(self) -> Self {
        Self(self.0 | MASK_PCT_ENCODED | MASK_OTHER, self.1)
    }

    #[inline]
    pub(crate) const fn allows_ascii(self, x: u8) -> bool {
        let table = if x < 64 {
            self.0 & MASK_UNENCODED_ASCII
        } else if x < 128 {
            self.1
        } else {
            0
        };
        table & 1u64.wrapping_shl(x as u32) != 0
    }

    /// Checks whether the given unencoded character is allowed by the table.
    #[inline]
    #[must_use]
    pub fn allows(self, ch: char) -> bool {
        if ch.is_ascii() {
            self.allows_ascii(ch as u8)
        } else {
            self.allows_escaped() && is_other(ch)
        }
    }

    /// Checks whether escaped octets are allowed by the table.
    #[inline]
    #[must_use]
    pub const fn allows_escaped(self) -> bool {
        self.0 & MASK_PCT_ENCODED != 0
    }

    /// Validates the given string with the table.
    pub(crate) fn validate(self, s: &str) -> bool {
        let bytes = s.as_bytes();
        let mut chars = s.char_indices();
        while let Some((i, ch)) = chars.next() {
            if ch == '%' && self.allows_escaped() {
                match bytes.get(i + 1..i + 3) {
                    Some(&[hi, lo]) if pct_enc::is_hexdig_pair(hi, lo) => {
                        chars.next();
                        chars.next();
                    }
                    _ => return false,
                }
            } else if !self.allows(ch) {
                return false;
            }
        }
        true
    }
}

const fn new(bytes: &[u8]) -> Table {
    Table::new(bytes)
}

/// `alpha = lowalpha | upalpha`
pub const ALPHA: Table = new(b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz");

/// `digit = "0" | "1" | ... | "9"`
pub const DIGIT: Table = new(b"0123456789");

/// `alphanum = alpha | digit`
pub const ALPHANUM: Table = ALPHA.or(DIGIT);

/// `scheme = alpha *( alpha | digit | "+" | "-" | "." )`
pub const SCHEME: Table = ALPHANUM.or(new(b"+-."));

/// `mark = "-" | "_" | "." | "!" | "~" | "*" | "'" | "(" | ")"`
pub const MARK: Table = new(b"-_.!~*'()");

/// `unreserved = alphanum | mark`
pub const UNRESERVED: Table = ALPHANUM.or(MARK);

/// `reserved = ";" | "/" | "?" | ":" | "@" | "&" | "=" | "+" | "$" | "," | "[" | "]"`
pub const RESERVED: Table = new(b";/?:@&=+$,[]");

/// `uric = reserved | unreserved | escaped`
pub const URIC: Table = RESERVED.or(UNRESERVED).or_escaped();

/// `pchar = unreserved | escaped | ":" | "@" | "&" | "=" | "+" | "$" | ","`
pub const PCHAR: Table = UNRESERVED.or(new(b":@&=+$,")).or_escaped();

/// `path = *( pchar | ";" | "/" )`
pub const PATH: Table = PCHAR.or(new(b";/"));

/// `userinfo = *( unreserved | escaped | ";" | ":" | "&" | "=" | "+" | "$" | "," )`
pub const USERINFO: Table = UNRESERVED.or(new(b";:&=+$,")).or_escaped();

/// `reg_name = 1*( unreserved | escaped | "$" | "," | ";" | ":" | "@" | "&" | "=" | "+" )`
pub const REG_NAME: Table = UNRESERVED.or(new(b"$,;:@&=+")).or_escaped();

/// Characters that may appear in a server-based authority.
pub const SERVER: Table = USERINFO.or(ALPHANUM).or(new(b"-.:@[]"));

/// Characters that may appear in an authority given to a composer unescaped.
pub const AUTHORITY: Table = REG_NAME.or(SERVER);

/// Characters of an IPv6 scope identifier.
pub const SCOPE_ID: Table = ALPHANUM.or(new(b"_."));

/// Characters left as is by `application/x-www-form-urlencoded` encoding.
pub const FORM_SAFE: Table = ALPHANUM.or(new(b"-_.*"));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert!(URIC.allows('['));
        assert!(!URIC.allows('#'));
        assert!(!URIC.allows('%'));
        assert!(URIC.allows('é'));
        assert!(!URIC.allows('\u{3000}'));
        assert!(!PATH.allows('?'));
        assert!(SERVER.allows('['));
        assert!(!REG_NAME.allows('['));
        assert!(!SCOPE_ID.allows('é'));
    }

    #[test]
    fn validate() {
        assert!(URIC.validate("a%20b"));
        assert!(!URIC.validate("a%2"));
        assert!(!URIC.validate("a%zz"));
        assert!(URIC.validate("caf\u{e9}"));
        assert!(!PATH.validate("a b"));
        assert!(!SCHEME.validate("%41"));
    }
}
