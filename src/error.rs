//! Centralized error handling for brcode.
//!
//! Every failure the library can raise is a [`BrcodeError`]; there are no
//! panics in library code (enforced by `#![deny(clippy::unwrap_used)]` and
//! `#![deny(clippy::panic)]`).
//!
//! One condition is deliberately *not* an error: truncation. A short read
//! anywhere after the magic preamble makes [`deserialize`] or [`read_data`]
//! return `Ok(false)` instead of raising, because a clean end-of-input at a
//! hunk boundary is a normal, successful termination and must stay
//! distinguishable from a mid-hunk truncation without forcing error handling
//! onto the common path. A raised `BrcodeError` therefore always means "not
//! a valid/compatible stream" or a caller bug, never "the stream ended".
//!
//! [`deserialize`]: crate::reader::BrcodeReader::deserialize
//! [`read_data`]: crate::reader::BrcodeReader::read_data
//!
//! ## Usage
//!
//! ```rust
//! use brcode::{BrcodeError, BrcodeWriter};
//!
//! let mut out = Vec::new();
//! let mut writer = BrcodeWriter::new(&mut out)?;
//! match writer.add_field("", b"payload") {
//!     Err(BrcodeError::EmptyName) => {} // a hunk must carry a name
//!     other => panic!("unexpected: {other:?}"),
//! }
//! # Ok::<(), brcode::BrcodeError>(())
//! ```

use std::fmt;
use std::io;
use std::sync::Arc;

/// A specialized `Result` type for brcode operations.
pub type Result<T> = std::result::Result<T, BrcodeError>;

/// The master error enum covering all failure domains in brcode.
///
/// Every variant is unrecoverable for the current call: it signals either a
/// programming error on the writing side, or a corrupt/foreign input on the
/// reading side, never a transient condition. There is nothing to retry.
///
/// The type is `Clone` so errors can be stored for later analysis; the I/O
/// cause is wrapped in an `Arc` to keep cloning cheap.
#[derive(Debug, Clone)]
pub enum BrcodeError {
    /// Low-level I/O failure from the underlying byte sink or source.
    ///
    /// Distinct from truncation: a short read is reported as a `false`
    /// return, not as an error.
    Io(Arc<io::Error>),

    /// Fewer than 4 bytes were available where the magic preamble belongs.
    MagicMissing,

    /// A magic preamble is present but does not match this host bit-for-bit.
    ///
    /// Covers wrong-endianness streams and unknown/future format versions
    /// alike; the reader rejects anything it cannot interpret in place
    /// rather than attempting byte-swapping.
    MagicUnsupported,

    /// A required hunk name or map sub-name was empty (writer-side,
    /// detected before any byte is emitted).
    EmptyName,

    /// A name length, sub-name length, payload length, or array index
    /// exceeds its bit width in the wire format (writer-side, detected
    /// before any byte is emitted). The message names the offending field.
    OutOfRange(String),

    /// A MAP hunk with a zero-length sub-name was encountered mid-stream.
    ///
    /// A valid writer never produces this, so it indicates corruption or a
    /// foreign stream.
    MapNameEmpty,

    /// A hunk header decoded to an unrecognized type value (the reserved
    /// tag, or anything a future format version might define).
    UnknownType(u8),

    /// The declared payload length is incompatible with the shape requested
    /// from [`read_data`](crate::reader::BrcodeReader::read_data). A
    /// caller/schema bug, not an I/O condition.
    SizeMismatch(String),
}

impl fmt::Display for BrcodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::MagicMissing => write!(f, "stream too short for magic preamble"),
            Self::MagicUnsupported => {
                write!(f, "magic preamble has unsupported byte order or version")
            }
            Self::EmptyName => write!(f, "hunk name must not be empty"),
            Self::OutOfRange(s) => write!(f, "value out of range: {s}"),
            Self::MapNameEmpty => write!(f, "map hunk carries an empty sub-name"),
            Self::UnknownType(t) => write!(f, "unknown hunk type value: {t}"),
            Self::SizeMismatch(s) => write!(f, "payload size mismatch: {s}"),
        }
    }
}

impl std::error::Error for BrcodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for BrcodeError {
    fn from(err: io::Error) -> Self {
        Self::Io(Arc::new(err))
    }
}
