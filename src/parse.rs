use crate::{
    error::{ParseError, ParseErrorKind},
    log::debug,
    pct_enc::{self, table::*, Table},
    uri::{AuthMeta, Meta, ServerMeta},
};
use core::{
    num::NonZeroUsize,
    ops::{Deref, DerefMut},
};

type Result<T> = core::result::Result<T, ParseError>;

/// Returns immediately with an error.
macro_rules! err {
    ($index:expr, $kind:ident) => {
        return Err(ParseError {
            index: $index,
            kind: ParseErrorKind::$kind,
        })
    };
}

/// Parses a URI string.
///
/// With `require_server` set, an authority that fails to parse as
/// `[userinfo@]host[:port]` is an error instead of being taken as
/// registry-based.
pub(crate) fn parse(s: &str, require_server: bool) -> Result<Meta> {
    let mut parser = Parser {
        require_server,
        reader: Reader::new(s),
        out: Meta::default(),
    };
    parser.parse_from_scheme()?;
    Ok(parser.out)
}

/// Checks whether `s` is an IPv6 address, optionally followed by `'%'`
/// and a scope identifier.
pub(crate) fn is_ipv6_literal(s: &str) -> bool {
    let (addr, scope) = match s.split_once('%') {
        Some((addr, scope)) => (addr, Some(scope)),
        None => (s, None),
    };
    let mut reader = Reader::new(addr);
    reader.read_v6().is_some()
        && !reader.has_remaining()
        && scope.map_or(true, |scope| {
            !scope.is_empty() && scope.bytes().all(|x| SCOPE_ID.allows_ascii(x))
        })
}

/// URI parser.
///
/// # Invariants
///
/// `pos <= len`, `pos` is non-decreasing and on the boundary of a UTF-8 code point.
///
/// # Guarantees
///
/// When parsing succeeds, all output indexes are within bounds, correctly
/// ordered and on the boundary of a UTF-8 code point, and all components
/// defined by output indexes are validated.
struct Parser<'a> {
    require_server: bool,
    reader: Reader<'a>,
    out: Meta,
}

struct Reader<'a> {
    s: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Deref for Parser<'a> {
    type Target = Reader<'a>;

    fn deref(&self) -> &Self::Target {
        &self.reader
    }
}

impl DerefMut for Parser<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.reader
    }
}

enum Seg {
    // *1":" 1*4HEXDIG
    Normal(u16, bool),
    // "::"
    Ellipsis,
    // *1":" 1*4HEXDIG "."
    MaybeV4(bool),
    // ":"
    SingleColon,
}

impl<'a> Reader<'a> {
    fn new(s: &'a str) -> Self {
        Reader {
            s,
            bytes: s.as_bytes(),
            pos: 0,
        }
    }

    /// Creates a reader over `s[..end]` positioned at `start`.
    fn sub(&self, start: usize, end: usize) -> Reader<'a> {
        let mut reader = Reader::new(&self.s[..end]);
        reader.pos = start;
        reader
    }

    fn len(&self) -> usize {
        self.bytes.len()
    }

    fn has_remaining(&self) -> bool {
        self.pos < self.len()
    }

    fn peek(&self, i: usize) -> Option<u8> {
        self.bytes.get(self.pos + i).copied()
    }

    // Any call to this method must keep the invariants.
    fn skip(&mut self, n: usize) {
        // INVARIANT: `pos` is non-decreasing.
        self.pos += n;
        debug_assert!(self.pos <= self.len());
    }

    fn read_str(&mut self, s: &str) -> bool {
        if self.bytes[self.pos..].starts_with(s.as_bytes()) {
            // INVARIANT: The remaining bytes start with `s` so it's fine to skip `s.len()`.
            self.skip(s.len());
            true
        } else {
            false
        }
    }

    /// Returns the index of the first of the given ASCII delimiters
    /// at or after `pos`, or the length if there is none.
    fn find(&self, delims: &[u8]) -> usize {
        self.bytes[self.pos..]
            .iter()
            .position(|x| delims.contains(x))
            .map_or(self.len(), |i| self.pos + i)
    }

    /// Returns the end of the longest run starting at `i` and ending
    /// no later than `end` made of characters allowed by the table.
    ///
    /// A bare `'%'` is allowed when `bare_pct` is set. Otherwise, in tables
    /// allowing escaped octets, a `'%'` must start one, and `Err` holds the
    /// index of the first `'%'` that does not.
    fn scan_range(
        &self,
        mut i: usize,
        end: usize,
        table: Table,
        bare_pct: bool,
    ) -> core::result::Result<usize, usize> {
        while i < end {
            let x = self.bytes[i];
            if x == b'%' && bare_pct {
                i += 1;
            } else if x == b'%' && table.allows_escaped() {
                match self.bytes.get(i + 1..i + 3) {
                    Some(&[hi, lo]) if i + 3 <= end && pct_enc::is_hexdig_pair(hi, lo) => i += 3,
                    _ => return Err(i),
                }
            } else if x < 128 {
                if !table.allows_ascii(x) {
                    break;
                }
                i += 1;
            } else {
                let Some(ch) = self.s[i..].chars().next() else {
                    break;
                };
                if !table.allows(ch) {
                    break;
                }
                i += ch.len_utf8();
            }
        }
        Ok(i)
    }

    /// Advances over the characters allowed by the table.
    fn read(&mut self, table: Table) -> Result<bool> {
        let start = self.pos;
        match self.scan_range(start, self.len(), table, false) {
            Ok(i) => {
                // INVARIANT: `i` is non-decreasing and on a character boundary.
                self.pos = i;
                Ok(i > start)
            }
            Err(i) => err!(i, InvalidOctet),
        }
    }

    fn read_v6(&mut self) -> Option<[u16; 8]> {
        let mut segs = [0; 8];
        let mut ellipsis_idx = 8;

        let mut i = 0;
        while i < 8 {
            match self.read_v6_segment() {
                Some(Seg::Normal(seg, colon)) => {
                    if colon == (i == 0 || i == ellipsis_idx) {
                        // Leading colon, triple colons, or no colon.
                        return None;
                    }
                    segs[i] = seg;
                    i += 1;
                }
                Some(Seg::Ellipsis) => {
                    if ellipsis_idx != 8 {
                        // Multiple ellipses.
                        return None;
                    }
                    ellipsis_idx = i;
                }
                Some(Seg::MaybeV4(colon)) => {
                    if i > 6 || colon == (i == ellipsis_idx) {
                        // Not enough space, triple colons, or no colon.
                        return None;
                    }
                    let octets = self.read_v4()?.to_be_bytes();
                    segs[i] = u16::from_be_bytes([octets[0], octets[1]]);
                    segs[i + 1] = u16::from_be_bytes([octets[2], octets[3]]);
                    i += 2;
                    break;
                }
                Some(Seg::SingleColon) => return None,
                None => break,
            }
        }

        if ellipsis_idx == 8 {
            // No ellipsis.
            if i != 8 {
                // Too short.
                return None;
            }
        } else if i == 8 {
            // Eliding nothing.
            return None;
        } else {
            // Shift the segments after the ellipsis to the right.
            for j in (ellipsis_idx..i).rev() {
                segs[8 - (i - j)] = segs[j];
                segs[j] = 0;
            }
        }

        Some(segs)
    }

    fn read_v6_segment(&mut self) -> Option<Seg> {
        let colon = self.read_str(":");
        let Some(first) = self.peek(0) else {
            return colon.then_some(Seg::SingleColon);
        };

        let mut x = match pct_enc::decode_hexdigit(first) {
            Some(v) => v as u16,
            _ => {
                return colon.then(|| {
                    if first == b':' {
                        // INVARIANT: Skipping ":" is fine.
                        self.skip(1);
                        Seg::Ellipsis
                    } else {
                        Seg::SingleColon
                    }
                });
            }
        };
        let mut i = 1;

        while i < 4 {
            let Some(b) = self.peek(i) else {
                // INVARIANT: Skipping `i` hexadecimal digits is fine.
                self.skip(i);
                return None;
            };
            match pct_enc::decode_hexdigit(b) {
                Some(v) => {
                    x = (x << 4) | v as u16;
                    i += 1;
                }
                _ if b == b'.' => return Some(Seg::MaybeV4(colon)),
                _ => break,
            }
        }
        // INVARIANT: Skipping `i` hexadecimal digits is fine.
        self.skip(i);
        Some(Seg::Normal(x, colon))
    }

    fn read_v4(&mut self) -> Option<u32> {
        let mut addr = self.read_v4_octet()? << 24;
        for i in (0..3).rev() {
            if !self.read_str(".") {
                return None;
            }
            addr |= self.read_v4_octet()? << (i * 8);
        }
        Some(addr)
    }

    // At most three digits per octet, leading zeros allowed.
    fn read_v4_octet(&mut self) -> Option<u32> {
        let mut res = self.peek_digit(0)?;
        let mut i = 1;
        while i < 3 {
            let Some(x) = self.peek_digit(i) else {
                break;
            };
            res = res * 10 + x;
            i += 1;
        }
        // INVARIANT: Skipping `i` digits is fine.
        self.skip(i);

        u8::try_from(res).is_ok().then_some(res)
    }

    fn peek_digit(&self, i: usize) -> Option<u32> {
        self.peek(i).and_then(|x| (x as char).to_digit(10))
    }
}

impl Parser<'_> {
    fn parse_from_scheme(&mut self) -> Result<()> {
        let i = self.find(b"/?#:");
        if self.bytes.get(i) == Some(&b':') {
            if i == 0 {
                err!(0, EmptyScheme);
            }
            self.read_scheme(i)?;
            self.out.scheme_end = NonZeroUsize::new(i);
            // INVARIANT: Skipping the scheme and ":" is fine.
            self.skip(i + 1);

            if self.peek(0) == Some(b'/') {
                self.parse_hierarchical()?;
            } else {
                self.parse_opaque()?;
            }
        } else {
            self.parse_hierarchical()?;
        }

        if self.read_str("#") {
            self.read(URIC)?;
        }
        if self.has_remaining() {
            err!(self.pos, UnexpectedChar);
        }
        Ok(())
    }

    fn read_scheme(&self, end: usize) -> Result<()> {
        if !self.bytes[0].is_ascii_alphabetic() {
            err!(0, UnexpectedChar);
        }
        if let Some(i) = (1..end).find(|&i| !SCHEME.allows_ascii(self.bytes[i])) {
            err!(i, UnexpectedChar);
        }
        Ok(())
    }

    fn parse_opaque(&mut self) -> Result<()> {
        let start = self.pos;
        let end = self.find(b"#");
        if end == start {
            err!(start, EmptySchemeSpecificPart);
        }
        self.read(URIC)?;
        if self.pos != end {
            err!(self.pos, UnexpectedChar);
        }
        self.out.path_bounds = (start, end);
        Ok(())
    }

    fn parse_hierarchical(&mut self) -> Result<()> {
        if self.read_str("//") {
            let start = self.pos;
            let end = self.find(b"/?#");
            self.out.auth = Some(self.parse_authority(start, end)?);
            // INVARIANT: `end` is on the boundary of an ASCII delimiter or the end.
            self.pos = end;
        }

        let start = self.pos;
        self.read(PATH)?;
        self.out.path_bounds = (start, self.pos);

        if self.read_str("?") {
            self.read(URIC)?;
            self.out.query_end = NonZeroUsize::new(self.pos);
        }
        Ok(())
    }

    fn parse_authority(&self, start: usize, end: usize) -> Result<AuthMeta> {
        if start == end {
            // An empty authority must be followed by a path, query or fragment.
            if end == self.len() {
                err!(start, EmptyAuthority);
            }
            return Ok(AuthMeta {
                start,
                server: Some(ServerMeta::default()),
            });
        }

        // A bracketed IPv6 literal may carry a bare '%' before its scope id.
        let has_literal = self.bytes[start..end].contains(&b']');
        let server_stop = self.scan_range(start, end, SERVER, has_literal);
        let server_chars = server_stop == Ok(end);
        let reg_chars = self.scan_range(start, end, REG_NAME, false) == Ok(end);

        if server_chars {
            match self.parse_server(start, end) {
                Ok(server) => {
                    return Ok(AuthMeta {
                        start,
                        server: Some(server),
                    })
                }
                Err(e) if self.require_server || !reg_chars => return Err(e),
                Err(_e) => {
                    debug!("taking authority as registry-based: {_e}");
                }
            }
        }

        if reg_chars {
            return Ok(AuthMeta {
                start,
                server: None,
            });
        }

        match server_stop {
            Ok(i) => err!(i, UnexpectedChar),
            Err(i) => err!(i, InvalidOctet),
        }
    }

    fn parse_server(&self, start: usize, end: usize) -> Result<ServerMeta> {
        let mut p = start;

        if let Some(at) = self.bytes[start..end].iter().position(|&x| x == b'@') {
            let at = start + at;
            match self.scan_range(start, at, USERINFO, false) {
                Ok(i) if i == at => {}
                Ok(i) => err!(i, UnexpectedChar),
                Err(i) => err!(i, InvalidOctet),
            }
            p = at + 1;
        }

        let host_start = p;
        if self.bytes.get(p) == Some(&b'[') {
            p = self.parse_ip_literal(p + 1, end)?;
        } else if let Some(i) = self.parse_v4(p, end) {
            p = i;
        } else {
            p = self.parse_hostname(p, end)?;
        }
        let host_end = p;

        let mut port = None;
        if p < end && self.bytes[p] == b':' {
            p += 1;
            let digits = self.bytes[p..end]
                .iter()
                .take_while(|x| x.is_ascii_digit())
                .count();
            if digits > 0 {
                match self.s[p..p + digits].parse::<i32>() {
                    Ok(n) => port = Some(n as u32),
                    Err(_) => err!(p, InvalidPort),
                }
            }
            p += digits;
            if p < end {
                err!(p, InvalidPort);
            }
        }
        if p < end {
            err!(p, UnexpectedChar);
        }

        Ok(ServerMeta {
            host_bounds: (host_start - start, host_end - start),
            port,
        })
    }

    /// Parses an IPv6 literal starting after the opening bracket and
    /// returns the index after the closing bracket.
    fn parse_ip_literal(&self, start: usize, end: usize) -> Result<usize> {
        let Some(close) = self.bytes[start..end].iter().position(|&x| x == b']') else {
            err!(end, UnexpectedChar);
        };
        let close = start + close;
        if close == start {
            err!(start, InvalidIpv6Addr);
        }

        let addr_end = self.bytes[start..close]
            .iter()
            .position(|&x| x == b'%')
            .map_or(close, |i| start + i);

        let mut reader = self.sub(start, addr_end);
        if reader.read_v6().is_none() || reader.has_remaining() {
            err!(start, InvalidIpv6Addr);
        }

        if addr_end < close {
            let scope_start = addr_end + 1;
            if scope_start == close {
                err!(scope_start, InvalidIpv6Addr);
            }
            match self.scan_range(scope_start, close, SCOPE_ID, false) {
                Ok(i) if i == close => {}
                Ok(i) | Err(i) => err!(i, InvalidIpv6Addr),
            }
        }
        Ok(close + 1)
    }

    /// Returns the end of a dotted-quad IPv4 address at `start`
    /// if it is followed by a port or nothing.
    fn parse_v4(&self, start: usize, end: usize) -> Option<usize> {
        let run_end = self.bytes[start..end]
            .iter()
            .position(|&x| !(x.is_ascii_digit() || x == b'.'))
            .map_or(end, |i| start + i);

        let mut reader = self.sub(start, run_end);
        reader.read_v4()?;
        if reader.has_remaining() {
            return None;
        }
        (run_end == end || self.bytes[run_end] == b':').then_some(run_end)
    }

    /// Parses a host name and returns the index after it.
    ///
    /// Labels are alphanumeric with inner hyphens, separated by dots, and a
    /// trailing dot is allowed. The rightmost label of a multi-label name
    /// must start with a letter.
    fn parse_hostname(&self, start: usize, end: usize) -> Result<usize> {
        let alnum = |i: usize| i < end && self.bytes[i].is_ascii_alphanumeric();

        let mut p = start;
        let mut last_label = None;
        while p < end {
            if !alnum(p) {
                break;
            }
            last_label = Some(p);
            while alnum(p) || (p < end && self.bytes[p] == b'-') {
                p += 1;
            }
            if self.bytes[p - 1] == b'-' {
                err!(p - 1, InvalidHostname);
            }
            if p < end && self.bytes[p] == b'.' {
                p += 1;
            } else {
                break;
            }
        }

        if p < end && self.bytes[p] != b':' {
            err!(p, InvalidHostname);
        }
        let Some(last_label) = last_label else {
            err!(start, InvalidHostname);
        };
        if last_label > start && !self.bytes[last_label].is_ascii_alphabetic() {
            err!(last_label, InvalidHostname);
        }
        Ok(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v6(s: &str) -> Option<[u16; 8]> {
        let mut reader = Reader::new(s);
        reader.read_v6().filter(|_| !reader.has_remaining())
    }

    #[test]
    fn ipv6() {
        assert_eq!(v6("::1"), Some([0, 0, 0, 0, 0, 0, 0, 1]));
        assert_eq!(v6("1080::8:800:200c:417a"), Some([0x1080, 0, 0, 0, 8, 0x800, 0x200c, 0x417a]));
        assert_eq!(v6("::ffff:192.168.0.1"), Some([0, 0, 0, 0, 0, 0xffff, 0xc0a8, 1]));
        assert_eq!(v6(":::1"), None);
        assert_eq!(v6("1:2:3:4:5:6:7:8:9"), None);
        assert_eq!(v6("1::2::3"), None);
    }

    #[test]
    fn hostnames() {
        assert!(parse("//a-b.c/", true).is_ok());
        assert!(parse("//example.com./", true).is_ok());
        assert!(parse("//123/", true).is_ok());
        assert_eq!(
            parse("//a-.com/", true).unwrap_err().kind(),
            ParseErrorKind::InvalidHostname
        );
        assert_eq!(
            parse("//a.1com/", true).unwrap_err().kind(),
            ParseErrorKind::InvalidHostname
        );
    }

    #[test]
    fn registry_fallback() {
        let meta = parse("//a_b/", false).unwrap();
        assert!(meta.auth.unwrap().server.is_none());
        assert!(parse("//a_b/", true).is_err());
    }
}
