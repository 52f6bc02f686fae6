//! Defines the physical binary layout of brcode streams.
//!
//! # Layout
//! A stream is a 4-byte magic preamble followed by a flat sequence of hunks:
//!
//! `[Magic] [Hunk 0] [Hunk 1] ...`
//!
//! ## Hunk Anatomy
//! Each hunk is self-contained:
//!
//! `[ Header (4B) ] [ Addressing (0-256B) ] [ Name ] [ Payload ]`
//!
//! The header is one 32-bit word packing the hunk type, name length, and
//! payload length. ARRAY hunks follow it with a `u16` index; MAP hunks with
//! a `u8` sub-name length and the sub-name bytes. Everything is written in
//! the host's native byte order with no padding; the magic records which
//! order that was, and a reader rejects streams written in the other one.

use crate::error::{BrcodeError, Result};

/// Size of the magic preamble in bytes.
pub const MAGIC_LEN: usize = 4;

/// The two signature bytes opening every stream: `'B' 'R'`.
pub const SIGNATURE: [u8; 2] = *b"BR";

/// Current format version, stored as the fourth magic byte.
pub const FORMAT_VERSION: u8 = 1;

/// Size of a packed hunk header in bytes.
pub const HEADER_LEN: usize = 4;

/// Maximum hunk name length (7-bit field; 0 is reserved for the sentinel).
pub const MAX_NAME_LEN: usize = 127;

/// Maximum payload length (23-bit field).
pub const MAX_PAYLOAD_LEN: usize = 0x7F_FFFF;

/// Maximum array element index (16-bit field).
pub const MAX_ARRAY_INDEX: u32 = u16::MAX as u32;

/// Maximum map sub-name length (8-bit field; 0 is invalid on the wire).
pub const MAX_SUB_NAME_LEN: usize = u8::MAX as usize;

#[cfg(target_endian = "big")]
const ENDIAN_BYTE: u8 = b'B';
#[cfg(target_endian = "little")]
const ENDIAN_BYTE: u8 = b'L';

/// Builds the magic preamble for the host: signature, endianness byte
/// (`'B'` or `'L'` matching the native order), and the format version.
///
/// Deterministic on a given host; `validate_magic(&build_magic())` always
/// succeeds.
pub fn build_magic() -> [u8; MAGIC_LEN] {
    [SIGNATURE[0], SIGNATURE[1], ENDIAN_BYTE, FORMAT_VERSION]
}

/// Validates a magic preamble against the host's expected value.
///
/// Folding endianness and version into one comparable value lets the reader
/// reject any input it cannot interpret bit-for-bit in a single check,
/// instead of attempting byte-swapping.
///
/// # Errors
/// [`BrcodeError::MagicMissing`] if fewer than [`MAGIC_LEN`] bytes are
/// available; [`BrcodeError::MagicUnsupported`] if the bytes do not exactly
/// match the native-endian magic (wrong byte order and unknown versions
/// alike).
pub fn validate_magic(bytes: &[u8]) -> Result<()> {
    if bytes.len() < MAGIC_LEN {
        return Err(BrcodeError::MagicMissing);
    }
    if bytes[..MAGIC_LEN] != build_magic() {
        return Err(BrcodeError::MagicUnsupported);
    }
    Ok(())
}

/// The addressing mode of a hunk, stored in bits 0-1 of the header word.
///
/// A closed, fixed set: there is no extensibility point short of a format
/// version bump. The fourth bit pattern (3) is reserved and surfaces as
/// [`BrcodeError::UnknownType`] when a reader acts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HunkKind {
    /// A plain named value. Also used for scope markers (payload length 0)
    /// and, with name length 0, for the end-of-scope sentinel.
    Field = 0,
    /// An array element; the header is followed by a `u16` index.
    Array = 1,
    /// A map element; the header is followed by a length-prefixed sub-name.
    Map = 2,
}

impl HunkKind {
    /// Decodes the 2-bit type value. Returns `None` for the reserved
    /// pattern so the caller can keep the raw header inspectable.
    pub fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0 => Some(Self::Field),
            1 => Some(Self::Array),
            2 => Some(Self::Map),
            _ => None,
        }
    }
}

// Header word layout, LSB first: type(2) name_len(7) payload_len(23).
const KIND_MASK: u32 = 0b11;
const NAME_SHIFT: u32 = 2;
const NAME_MASK: u32 = 0x7F;
const PAYLOAD_SHIFT: u32 = 9;
const PAYLOAD_MASK: u32 = MAX_PAYLOAD_LEN as u32;

/// An unpacked hunk header.
///
/// `decode` never fails: the type value is kept raw so a corrupt header
/// stays inspectable for diagnostics, and an unrecognized type is only
/// reported (as [`BrcodeError::UnknownType`]) when the reader tries to act
/// on the hunk via [`HunkHeader::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    /// Raw 2-bit type value as found on the wire.
    pub raw_kind: u8,
    /// Name length in bytes (0 only for the end-of-scope sentinel).
    pub name_len: u8,
    /// Payload length in bytes.
    pub payload_len: u32,
}

impl HunkHeader {
    /// Packs a header into one 32-bit word.
    ///
    /// # Errors
    /// [`BrcodeError::OutOfRange`] if re-widening a packed sub-field does
    /// not reproduce the original value, i.e. the value did not fit its bit
    /// width. Note that name length 0 packs fine here; forbidding empty
    /// names on ordinary hunks is the writer's job, since the sentinel
    /// legitimately uses it.
    pub fn encode(kind: HunkKind, name_len: usize, payload_len: usize) -> Result<u32> {
        let word = (kind as u32 & KIND_MASK)
            | ((name_len as u32 & NAME_MASK) << NAME_SHIFT)
            | ((payload_len as u32 & PAYLOAD_MASK) << PAYLOAD_SHIFT);
        let check = Self::decode(word);
        if check.name_len as usize != name_len {
            return Err(BrcodeError::OutOfRange(format!(
                "name length {name_len} exceeds {MAX_NAME_LEN}"
            )));
        }
        if check.payload_len as usize != payload_len {
            return Err(BrcodeError::OutOfRange(format!(
                "payload length {payload_len} exceeds {MAX_PAYLOAD_LEN}"
            )));
        }
        Ok(word)
    }

    /// Splits a 32-bit word back into its type, name length, and payload
    /// length. Never fails; see the type-level docs.
    pub fn decode(word: u32) -> Self {
        Self {
            raw_kind: (word & KIND_MASK) as u8,
            name_len: ((word >> NAME_SHIFT) & NAME_MASK) as u8,
            payload_len: (word >> PAYLOAD_SHIFT) & PAYLOAD_MASK,
        }
    }

    /// Interprets the raw type value.
    ///
    /// # Errors
    /// [`BrcodeError::UnknownType`] for the reserved bit pattern.
    pub fn kind(&self) -> Result<HunkKind> {
        HunkKind::from_bits(self.raw_kind).ok_or(BrcodeError::UnknownType(self.raw_kind))
    }

    /// Whether this header is the reserved end-of-scope sentinel: a FIELD
    /// header with name length 0 and payload length 0, nothing following.
    pub fn is_sentinel(&self) -> bool {
        self.raw_kind == HunkKind::Field as u8 && self.name_len == 0 && self.payload_len == 0
    }
}
