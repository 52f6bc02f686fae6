//! The write-side engine.
//!
//! [`BrcodeWriter`] appends well-formed hunks to an append-only byte sink.
//! Each successful call emits exactly one hunk (header, addressing, name,
//! payload) as a single contiguous write; a call that fails validation
//! emits nothing at all. The writer never buffers more than the one hunk it
//! is currently assembling, and never rewrites a byte once emitted.

use std::io::Write;

use crate::error::{BrcodeError, Result};
use crate::format::{self, HunkHeader, HunkKind, MAX_ARRAY_INDEX, MAX_SUB_NAME_LEN};
use crate::wire::WirePayload;

/// What follows the header word for each addressing mode.
#[derive(Clone, Copy)]
enum Addressing<'a> {
    None,
    Index(u16),
    SubName(&'a str),
}

/// Streaming writer for the brcode format.
///
/// Construction writes the 4-byte magic preamble immediately and fails if
/// the sink rejects it. The writer owns its sink exclusively for its
/// lifetime; interleaving another writer on the same stream produces
/// garbage.
#[derive(Debug)]
pub struct BrcodeWriter<W: Write> {
    sink: W,
}

impl<W: Write> BrcodeWriter<W> {
    /// Creates a writer over `sink`, emitting the magic preamble.
    pub fn new(mut sink: W) -> Result<Self> {
        sink.write_all(&format::build_magic())?;
        Ok(Self { sink })
    }

    /// Consumes the writer, returning the underlying sink.
    ///
    /// The stream needs no trailer; it is complete after any hunk boundary.
    pub fn into_inner(self) -> W {
        self.sink
    }

    /// Appends a FIELD hunk: a named, raw byte payload.
    ///
    /// # Errors
    /// [`BrcodeError::EmptyName`] if `name` is empty;
    /// [`BrcodeError::OutOfRange`] if the name exceeds 127 bytes or the
    /// payload exceeds 8,388,607 bytes.
    pub fn add_field(&mut self, name: &str, payload: &[u8]) -> Result<()> {
        self.emit(HunkKind::Field, name, Addressing::None, payload)
    }

    /// Appends an ARRAY hunk: a named payload addressed by element index.
    ///
    /// # Errors
    /// As [`add_field`](Self::add_field), plus [`BrcodeError::OutOfRange`]
    /// if `index` does not fit 16 bits.
    pub fn add_array_element(&mut self, name: &str, index: u32, payload: &[u8]) -> Result<()> {
        if index > MAX_ARRAY_INDEX {
            return Err(BrcodeError::OutOfRange(format!(
                "array index {index} exceeds {MAX_ARRAY_INDEX}"
            )));
        }
        self.emit(HunkKind::Array, name, Addressing::Index(index as u16), payload)
    }

    /// Appends a MAP hunk: a named payload addressed by a string key.
    ///
    /// # Errors
    /// [`BrcodeError::EmptyName`] if `name` or `sub_name` is empty;
    /// [`BrcodeError::OutOfRange`] if `sub_name` exceeds 255 bytes, or as
    /// [`add_field`](Self::add_field) for the name and payload.
    pub fn add_map_element(&mut self, name: &str, sub_name: &str, payload: &[u8]) -> Result<()> {
        if sub_name.is_empty() {
            return Err(BrcodeError::EmptyName);
        }
        if sub_name.len() > MAX_SUB_NAME_LEN {
            return Err(BrcodeError::OutOfRange(format!(
                "sub-name length {} exceeds {MAX_SUB_NAME_LEN}",
                sub_name.len()
            )));
        }
        self.emit(HunkKind::Map, name, Addressing::SubName(sub_name), payload)
    }

    /// Appends a FIELD hunk, or nothing at all when `payload` is empty.
    ///
    /// The format has no explicit "null" hunk; absence of data is
    /// represented solely by the hunk never being written, and a reading
    /// application must treat "never seen during deserialization" as the
    /// absent state.
    pub fn add_field_if_not_empty(&mut self, name: &str, payload: &[u8]) -> Result<()> {
        if payload.is_empty() {
            return Ok(());
        }
        self.add_field(name, payload)
    }

    /// Opens a nested scope: emits a FIELD hunk with payload length 0 (the
    /// scope marker).
    ///
    /// Matching is purely lexical: the nearest unmatched
    /// [`end_scope`](Self::end_scope) closes the nearest open scope. Getting
    /// it right is the caller's responsibility; the writer does not validate
    /// nesting balance.
    pub fn begin_scope(&mut self, name: &str) -> Result<()> {
        self.add_field(name, &[])
    }

    /// Closes the innermost open scope: emits the reserved sentinel, a
    /// FIELD header with name length 0 and payload length 0.
    pub fn end_scope(&mut self) -> Result<()> {
        let word = HunkHeader::encode(HunkKind::Field, 0, 0)?;
        log::trace!("end scope");
        self.sink.write_all(&word.to_ne_bytes())?;
        Ok(())
    }

    // --- TYPED CONVENIENCE ENTRY POINTS ---
    //
    // Sugar over the raw primitives above; the payload bytes are inferred
    // from the argument's shape (fixed-width scalar, text, or homogeneous
    // sequence). See the `wire` module.

    /// Typed [`add_field`](Self::add_field): the payload is inferred from
    /// the value's shape.
    pub fn write_field<P>(&mut self, name: &str, value: &P) -> Result<()>
    where
        P: WirePayload + ?Sized,
    {
        self.add_field(name, &value.wire_bytes())
    }

    /// Typed [`add_array_element`](Self::add_array_element).
    pub fn write_array_element<P>(&mut self, name: &str, index: u32, value: &P) -> Result<()>
    where
        P: WirePayload + ?Sized,
    {
        self.add_array_element(name, index, &value.wire_bytes())
    }

    /// Typed [`add_map_element`](Self::add_map_element).
    pub fn write_map_element<P>(&mut self, name: &str, sub_name: &str, value: &P) -> Result<()>
    where
        P: WirePayload + ?Sized,
    {
        self.add_map_element(name, sub_name, &value.wire_bytes())
    }

    /// Typed [`add_field_if_not_empty`](Self::add_field_if_not_empty):
    /// writes nothing when the value's payload bytes are empty.
    pub fn write_field_if_not_empty<P>(&mut self, name: &str, value: &P) -> Result<()>
    where
        P: WirePayload + ?Sized,
    {
        self.add_field_if_not_empty(name, &value.wire_bytes())
    }

    /// Assembles and appends one hunk. All validation happens before the
    /// first byte reaches the sink.
    fn emit(
        &mut self,
        kind: HunkKind,
        name: &str,
        addressing: Addressing<'_>,
        payload: &[u8],
    ) -> Result<()> {
        if name.is_empty() {
            return Err(BrcodeError::EmptyName);
        }
        let word = HunkHeader::encode(kind, name.len(), payload.len())?;

        let addressing_len = match addressing {
            Addressing::None => 0,
            Addressing::Index(_) => 2,
            Addressing::SubName(s) => 1 + s.len(),
        };
        let mut hunk =
            Vec::with_capacity(format::HEADER_LEN + addressing_len + name.len() + payload.len());
        hunk.extend_from_slice(&word.to_ne_bytes());
        match addressing {
            Addressing::None => {}
            Addressing::Index(index) => hunk.extend_from_slice(&index.to_ne_bytes()),
            Addressing::SubName(sub_name) => {
                hunk.push(sub_name.len() as u8);
                hunk.extend_from_slice(sub_name.as_bytes());
            }
        }
        hunk.extend_from_slice(name.as_bytes());
        hunk.extend_from_slice(payload);

        log::trace!("emit {kind:?} hunk: name={name} payload={}B", payload.len());
        self.sink.write_all(&hunk)?;
        Ok(())
    }
}
