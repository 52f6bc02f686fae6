//! Macro-generated implementations of the wire traits for the primitive
//! numeric types, text, slices, and vectors.

use std::borrow::Cow;

use crate::error::{BrcodeError, Result};
use crate::wire::{ReadPayload, Scalar, WirePayload};

// One macro per scalar type rather than blanket impls over `T: Scalar`:
// coherence would treat such blankets as overlapping the `str`/`String`
// impls below.
macro_rules! impl_scalar {
    ($($ty:ty => $width:expr),* $(,)?) => {$(
        impl Scalar for $ty {
            const WIDTH: usize = $width;

            fn put_wire(&self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_ne_bytes());
            }

            fn from_wire(bytes: &[u8]) -> Self {
                // `read_data` hands over exactly WIDTH bytes; a mismatch
                // would already have failed in `accept_len`.
                <$ty>::from_ne_bytes(bytes.try_into().unwrap_or([0u8; $width]))
            }
        }

        impl WirePayload for $ty {
            fn wire_bytes(&self) -> Cow<'_, [u8]> {
                let mut out = Vec::with_capacity($width);
                self.put_wire(&mut out);
                Cow::Owned(out)
            }
        }

        impl ReadPayload for $ty {
            fn accept_len(payload_len: usize) -> Result<()> {
                if payload_len != $width {
                    return Err(BrcodeError::SizeMismatch(format!(
                        "payload is {payload_len} bytes, scalar target is {} bytes",
                        $width
                    )));
                }
                Ok(())
            }

            fn decode_from(&mut self, bytes: &[u8]) {
                *self = <$ty as Scalar>::from_wire(bytes);
            }
        }
    )*};
}

impl_scalar! {
    u8 => 1, i8 => 1,
    u16 => 2, i16 => 2,
    u32 => 4, i32 => 4,
    u64 => 8, i64 => 8,
    f32 => 4, f64 => 8,
}

// --- WRITE SIDE: shape -> payload bytes ---

impl WirePayload for str {
    fn wire_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl WirePayload for String {
    fn wire_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl<T: Scalar> WirePayload for [T] {
    fn wire_bytes(&self) -> Cow<'_, [u8]> {
        let mut out = Vec::with_capacity(self.len() * T::WIDTH);
        for item in self {
            item.put_wire(&mut out);
        }
        Cow::Owned(out)
    }
}

impl<T: Scalar> WirePayload for Vec<T> {
    fn wire_bytes(&self) -> Cow<'_, [u8]> {
        self.as_slice().wire_bytes()
    }
}

// --- READ SIDE: payload bytes -> value ---

impl ReadPayload for String {
    fn accept_len(_payload_len: usize) -> Result<()> {
        Ok(())
    }

    fn decode_from(&mut self, bytes: &[u8]) {
        // Names and text payloads are expected to be UTF-8; foreign bytes
        // degrade to replacement characters instead of failing the read.
        *self = String::from_utf8_lossy(bytes).into_owned();
    }
}

impl<T: Scalar> ReadPayload for Vec<T> {
    fn accept_len(payload_len: usize) -> Result<()> {
        if payload_len % T::WIDTH != 0 {
            return Err(BrcodeError::SizeMismatch(format!(
                "payload of {payload_len} bytes is not a multiple of the {}-byte element width",
                T::WIDTH
            )));
        }
        Ok(())
    }

    fn decode_from(&mut self, bytes: &[u8]) {
        self.clear();
        self.reserve(bytes.len() / T::WIDTH);
        for chunk in bytes.chunks_exact(T::WIDTH) {
            self.push(T::from_wire(chunk));
        }
    }
}
