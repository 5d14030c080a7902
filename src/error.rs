//! Error types.

use alloc::string::String;
use core::fmt;

/// Detailed cause of a [`ParseError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ParseErrorKind {
    /// A colon appears before any scheme character, as in `"://example.com"`.
    ///
    /// The error index is always `0`.
    EmptyScheme,
    /// Unexpected character that is not allowed by the URI syntax.
    ///
    /// The error index points to the first byte of the character.
    UnexpectedChar,
    /// Invalid percent-encoded octet that is either non-hexadecimal or incomplete.
    ///
    /// The error index points to the percent character "%" of the octet.
    InvalidOctet,
    /// Invalid IPv6 address or scope identifier inside square brackets.
    ///
    /// The error index points to the first byte of the address.
    InvalidIpv6Addr,
    /// Malformed host name in a server-based authority.
    InvalidHostname,
    /// Port that is not all digits or does not fit a signed 32-bit integer.
    ///
    /// The error index points to the first byte after the colon.
    InvalidPort,
    /// Nothing follows `"//"`, as in `"http://"`.
    ///
    /// The error index points to the end of the input.
    EmptyAuthority,
    /// Nothing follows the colon of an opaque URI, as in `"foo:"`.
    EmptySchemeSpecificPart,
    /// A non-empty path given to a composing constructor does not start
    /// with `'/'` although a scheme or an authority is present.
    RelativePath,
}

/// An error occurred when parsing or composing a [`Uri`].
///
/// [`Uri`]: crate::Uri
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ParseError {
    pub(crate) index: usize,
    pub(crate) kind: ParseErrorKind,
}

impl ParseError {
    /// Returns the index at which the error occurred.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> ParseErrorKind {
        self.kind
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            ParseErrorKind::EmptyScheme => "expected scheme name at index ",
            ParseErrorKind::UnexpectedChar => "unexpected character at index ",
            ParseErrorKind::InvalidOctet => "malformed escape pair at index ",
            ParseErrorKind::InvalidIpv6Addr => "malformed IPv6 address at index ",
            ParseErrorKind::InvalidHostname => "illegal character in hostname at index ",
            ParseErrorKind::InvalidPort => "malformed port number at index ",
            ParseErrorKind::EmptyAuthority => "expected authority at index ",
            ParseErrorKind::EmptySchemeSpecificPart => "expected scheme-specific part at index ",
            ParseErrorKind::RelativePath => "relative path in absolute URI at index ",
        };
        write!(f, "{}{}", msg, self.index)
    }
}

impl std::error::Error for ParseError {}

/// Detailed cause of a [`MalformedUrlError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MalformedUrlErrorKind {
    /// The input has no protocol and there is no context to inherit one from,
    /// or the protocol given to a composer is empty.
    NoProtocol,
    /// The protocol does not match `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`.
    InvalidProtocol,
    /// The port is not a decimal number in the range `0..=65535`.
    InvalidPort,
    /// Garbage follows a bracketed host, or the bracket is never closed.
    InvalidAuthority,
    /// A bracketed host is not a valid IPv6 address.
    InvalidHost,
    /// A relative [`Uri`] cannot be converted to a URL.
    ///
    /// [`Uri`]: crate::Uri
    NotAbsolute,
}

/// An error occurred when parsing or composing a [`Url`].
///
/// [`Url`]: crate::Url
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MalformedUrlError {
    pub(crate) kind: MalformedUrlErrorKind,
}

impl MalformedUrlError {
    pub(crate) fn new(kind: MalformedUrlErrorKind) -> Self {
        Self { kind }
    }

    /// Returns the detailed cause of the error.
    #[must_use]
    pub fn kind(&self) -> MalformedUrlErrorKind {
        self.kind
    }
}

impl fmt::Display for MalformedUrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self.kind {
            MalformedUrlErrorKind::NoProtocol => "no protocol",
            MalformedUrlErrorKind::InvalidProtocol => "invalid protocol",
            MalformedUrlErrorKind::InvalidPort => "invalid port number",
            MalformedUrlErrorKind::InvalidAuthority => "invalid authority field",
            MalformedUrlErrorKind::InvalidHost => "invalid host",
            MalformedUrlErrorKind::NotAbsolute => "URI is not absolute",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for MalformedUrlError {}

/// An error occurred when form-encoding a string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum EncodeError {
    /// No character encoding was given.
    NullArgument,
    /// The named character encoding is not available.
    UnsupportedEncoding(String),
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullArgument => f.write_str("character encoding is absent"),
            Self::UnsupportedEncoding(name) => write!(f, "unsupported encoding: {name:?}"),
        }
    }
}

impl std::error::Error for EncodeError {}

/// An error occurred when decoding a form-encoded string.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DecodeError {
    /// No character encoding was given.
    NullArgument,
    /// The named character encoding is empty or not available.
    UnsupportedEncoding(String),
    /// A `'%'` is followed by a non-hexadecimal digit.
    IllegalEscape {
        /// The index of the `'%'`.
        index: usize,
    },
    /// A `'%'` is followed by fewer than two characters.
    IncompleteEscape {
        /// The index of the `'%'`.
        index: usize,
    },
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NullArgument => f.write_str("character encoding is absent"),
            Self::UnsupportedEncoding(name) if name.is_empty() => {
                f.write_str("empty string encoding name")
            }
            Self::UnsupportedEncoding(name) => write!(f, "unsupported encoding: {name:?}"),
            Self::IllegalEscape { index } => {
                write!(f, "illegal hex characters in escape (%) pattern at index {index}")
            }
            Self::IncompleteEscape { index } => {
                write!(f, "incomplete trailing escape (%) pattern at index {index}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}
