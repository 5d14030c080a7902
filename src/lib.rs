#![warn(missing_debug_implementations, missing_docs, rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

//! URI and URL handling with long-established semantics.
//!
//! This crate provides:
//!
//! - [`Uri`]: a reference parser following [RFC 2396] as amended by
//!   [RFC 2732], with composition, normalization, resolution and relativization.
//! - [`Url`]: a lenient locator with protocol-relative parsing against a
//!   context and default ports.
//! - [`form`]: `application/x-www-form-urlencoded` encoding and decoding in
//!   a named character encoding.
//!
//! # Feature flags
//!
//! All features are disabled by default.
//!
//! - `serde`: Enables [`Serialize`] and [`Deserialize`] implementations
//!   for [`Uri`] and [`Url`].
//!
//! - `log`: Emits diagnostics through the [`log`] facade when a reference
//!   cannot be relativized, a path is normalized, or a URL inherits from
//!   its context.
//!
//! [RFC 2396]: https://datatracker.ietf.org/doc/html/rfc2396
//! [RFC 2732]: https://datatracker.ietf.org/doc/html/rfc2732
//! [`Serialize`]: https://docs.rs/serde/latest/serde/trait.Serialize.html
//! [`Deserialize`]: https://docs.rs/serde/latest/serde/trait.Deserialize.html
//! [`log`]: https://docs.rs/log

extern crate alloc;

mod log;

pub mod charset;
pub mod error;
pub mod form;
pub mod pct_enc;

mod build;
mod fmt;
mod normalize;
mod parse;
mod resolve;
mod uri;
mod url;

pub use error::{MalformedUrlError, ParseError};
pub use uri::Uri;
pub use url::Url;
