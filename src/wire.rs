//! Shape-inferring traits for typed payload access.
//!
//! The wire format itself only moves opaque byte payloads; these traits are
//! the thin idiomatic layer that branches on a Rust value's shape. Three
//! shapes exist:
//!
//! * a fixed-width scalar ([`Scalar`]): one native-endian machine value,
//! * text: a UTF-8 string stored as its raw bytes,
//! * a homogeneous sequence: scalars packed back to back.
//!
//! [`WirePayload`] turns a value of any of these shapes into payload bytes
//! for the writer's typed entry points; [`ReadPayload`] is the target side,
//! validating the declared payload length against the requested shape before
//! a single byte is consumed.
//!
//! Implementations for the primitive numeric types, `str`/`String`, slices,
//! and `Vec` live in the private `wire_impls` module.

use std::borrow::Cow;

use crate::error::Result;

/// A fixed-width machine scalar with a native-endian wire representation.
///
/// Implemented for `u8`-`u64`, `i8`-`i64`, `f32` and `f64`. Widths are the
/// in-memory widths; there is no varint encoding and no byte-order
/// conversion.
pub trait Scalar: Copy {
    /// Wire width in bytes.
    const WIDTH: usize;

    /// Appends the native-endian bytes of `self` to `out`.
    fn put_wire(&self, out: &mut Vec<u8>);

    /// Reconstructs a value from exactly [`Scalar::WIDTH`] bytes.
    fn from_wire(bytes: &[u8]) -> Self;
}

/// A value whose shape determines its payload bytes.
///
/// This is the sugar behind the writer's typed entry points
/// ([`write_field`](crate::writer::BrcodeWriter::write_field) and friends):
/// scalars become their native-endian bytes, text its raw UTF-8 bytes, and
/// sequences the concatenation of their elements' bytes.
pub trait WirePayload {
    /// The payload bytes for this value. Borrows where the in-memory
    /// representation already is the wire representation (text).
    fn wire_bytes(&self) -> Cow<'_, [u8]>;
}

/// A mutable target for [`read_data`](crate::reader::BrcodeReader::read_data).
///
/// Splits extraction into two steps so that a shape error is raised before
/// any stream byte is consumed: [`accept_len`](ReadPayload::accept_len)
/// checks the hunk's declared payload length against the target's shape,
/// then [`decode_from`](ReadPayload::decode_from) rebuilds the value from
/// the payload bytes.
pub trait ReadPayload {
    /// Validates the declared payload length for this target shape.
    ///
    /// # Errors
    /// [`BrcodeError::SizeMismatch`](crate::BrcodeError::SizeMismatch) if
    /// the length is incompatible: not equal to the width for a scalar, or
    /// not a whole multiple of the element width for a sequence. Text
    /// accepts any length.
    fn accept_len(payload_len: usize) -> Result<()>;

    /// Replaces `self` with the value decoded from `bytes`. Called only
    /// after `accept_len` approved `bytes.len()`.
    fn decode_from(&mut self, bytes: &[u8]);
}
