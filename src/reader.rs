//! The read-side engine.
//!
//! [`BrcodeReader`] validates the magic preamble at construction, then
//! consumes hunks one at a time from a forward-only byte source, driving a
//! caller-supplied [`HunkVisitor`] per hunk.
//!
//! # The Recursion Protocol
//!
//! Nested scopes carry no length prefix; they are bounded by a scope-open
//! hunk (FIELD, payload length 0) and the end-of-scope sentinel. Descending
//! into one is cooperative: the visitor invoked for the scope-opening hunk
//! re-enters [`BrcodeReader::deserialize`], and that inner call consumes the
//! whole nested scope *including* its sentinel before returning `Ok(true)`.
//! The outer loop then continues with the hunk following the scope. This is
//! ordinary recursive descent on the call stack; pathological nesting risks
//! stack exhaustion rather than hitting any structural limit.
//!
//! A visitor must consume exactly the declared payload via
//! [`BrcodeReader::read_data`] (or recurse for a scope) before returning,
//! otherwise the next loop iteration misreads the stream.

use std::io::{self, Read};

use crate::error::{BrcodeError, Result};
use crate::format::{self, HunkHeader, HunkKind};
use crate::wire::ReadPayload;

/// Outcome of filling a fixed-size buffer from the source.
enum Fill {
    /// The buffer was filled completely.
    Full,
    /// The source was already exhausted; not a single byte was read.
    Eof,
    /// The source ended partway through the buffer.
    Short,
}

/// Reads exactly `buf.len()` bytes, distinguishing a clean end-of-input
/// from a mid-buffer truncation. `Interrupted` reads are retried.
fn fill<R: Read>(source: &mut R, buf: &mut [u8]) -> Result<Fill> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) if filled == 0 => return Ok(Fill::Eof),
            Ok(0) => return Ok(Fill::Short),
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Fill::Full)
}

/// Ephemeral per-hunk metadata handed to the visitor.
///
/// Owned by the reader for the duration of one visit; visitors must copy
/// out anything they need to retain (the borrow checker enforces what the
/// format merely documents).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Addressing mode of the hunk.
    pub kind: HunkKind,
    /// Hunk name, decoded as UTF-8 (lossily for foreign bytes).
    pub name: String,
    /// Map key; present exactly when `kind` is [`HunkKind::Map`].
    pub sub_name: Option<String>,
    /// Element index; present exactly when `kind` is [`HunkKind::Array`].
    pub index: Option<u16>,
    /// Declared payload size in bytes.
    pub size: usize,
}

impl FieldDescriptor {
    /// Whether this hunk opens a nested scope by the format's convention: a
    /// FIELD hunk with payload length 0.
    ///
    /// An empty data field written with
    /// [`add_field`](crate::BrcodeWriter::add_field) produces the same
    /// bytes, so the two are indistinguishable on the wire. Streams meant
    /// for structural inspection should keep empty data fields out via
    /// [`add_field_if_not_empty`](crate::BrcodeWriter::add_field_if_not_empty).
    /// A visitor seeing this marker should recurse into
    /// [`deserialize`](BrcodeReader::deserialize) instead of calling
    /// [`read_data`](BrcodeReader::read_data).
    pub fn is_scope_marker(&self) -> bool {
        self.kind == HunkKind::Field && self.size == 0
    }
}

/// Per-hunk callback driven by [`BrcodeReader::deserialize`].
///
/// The `Ok(bool)` return is reserved: the read loop delivers every hunk in
/// scope regardless of what the visitor returns. Any "stop early" semantics
/// would be a new format contract; until one exists, return `Ok(true)`.
/// Errors (`Err`) do propagate and abort the loop.
///
/// Implemented for any matching `FnMut`, so a flat walk can pass a closure
/// directly; visitors that recurse into scopes usually read better as a
/// struct.
pub trait HunkVisitor<R: Read> {
    /// Handles one hunk. Must consume exactly the declared payload via
    /// [`BrcodeReader::read_data`], or re-enter
    /// [`BrcodeReader::deserialize`] when the hunk opens a scope.
    fn visit(&mut self, reader: &mut BrcodeReader<R>, field: &FieldDescriptor) -> Result<bool>;
}

impl<R, F> HunkVisitor<R> for F
where
    R: Read,
    F: FnMut(&mut BrcodeReader<R>, &FieldDescriptor) -> Result<bool>,
{
    fn visit(&mut self, reader: &mut BrcodeReader<R>, field: &FieldDescriptor) -> Result<bool> {
        self(reader, field)
    }
}

/// Streaming reader for the brcode format.
///
/// Construction consumes and validates the magic preamble immediately. The
/// reader owns its source exclusively; reads are forward-only with no
/// backtracking.
#[derive(Debug)]
pub struct BrcodeReader<R: Read> {
    source: R,
    /// Declared payload length of the hunk currently being dispatched;
    /// consumed by `read_data`.
    current_payload: usize,
}

impl<R: Read> BrcodeReader<R> {
    /// Creates a reader over `source`, consuming the magic preamble.
    ///
    /// # Errors
    /// [`BrcodeError::MagicMissing`] if fewer than 4 bytes are available;
    /// [`BrcodeError::MagicUnsupported`] if they do not match the
    /// native-endian magic bit-for-bit.
    pub fn new(mut source: R) -> Result<Self> {
        let mut magic = [0u8; format::MAGIC_LEN];
        match fill(&mut source, &mut magic)? {
            Fill::Full => format::validate_magic(&magic)?,
            Fill::Eof | Fill::Short => return Err(BrcodeError::MagicMissing),
        }
        Ok(Self {
            source,
            current_payload: 0,
        })
    }

    /// Consumes the reader, returning the underlying source.
    pub fn into_inner(self) -> R {
        self.source
    }

    /// Drives the read loop over the current scope.
    ///
    /// Decodes one hunk at a time and invokes `visitor` for each. The loop
    /// terminates with `Ok(true)` on a clean end of input exactly at a hunk
    /// boundary, or on the end-of-scope sentinel (without invoking the
    /// visitor for it), which is how a recursive call started from inside a
    /// visitor knows its scope has ended. Any short read mid-hunk
    /// terminates with `Ok(false)`.
    ///
    /// # Errors
    /// [`BrcodeError::UnknownType`] for a hunk with the reserved type
    /// value; [`BrcodeError::MapNameEmpty`] for a MAP hunk with a
    /// zero-length sub-name; [`BrcodeError::Io`] for source failures; plus
    /// anything the visitor itself raises.
    pub fn deserialize<V>(&mut self, visitor: &mut V) -> Result<bool>
    where
        V: HunkVisitor<R> + ?Sized,
    {
        loop {
            let mut word = [0u8; format::HEADER_LEN];
            match fill(&mut self.source, &mut word)? {
                Fill::Eof => return Ok(true),
                Fill::Short => return Ok(false),
                Fill::Full => {}
            }
            let header = HunkHeader::decode(u32::from_ne_bytes(word));
            if header.is_sentinel() {
                return Ok(true);
            }
            let kind = header.kind()?;

            let index = match kind {
                HunkKind::Array => {
                    let mut raw = [0u8; 2];
                    match fill(&mut self.source, &mut raw)? {
                        Fill::Full => Some(u16::from_ne_bytes(raw)),
                        Fill::Eof | Fill::Short => return Ok(false),
                    }
                }
                _ => None,
            };

            let sub_name = match kind {
                HunkKind::Map => {
                    let mut len = [0u8; 1];
                    match fill(&mut self.source, &mut len)? {
                        Fill::Full => {}
                        Fill::Eof | Fill::Short => return Ok(false),
                    }
                    if len[0] == 0 {
                        return Err(BrcodeError::MapNameEmpty);
                    }
                    let mut raw = vec![0u8; len[0] as usize];
                    match fill(&mut self.source, &mut raw)? {
                        Fill::Full => Some(String::from_utf8_lossy(&raw).into_owned()),
                        Fill::Eof | Fill::Short => return Ok(false),
                    }
                }
                _ => None,
            };

            let mut raw_name = vec![0u8; header.name_len as usize];
            match fill(&mut self.source, &mut raw_name)? {
                Fill::Full => {}
                Fill::Eof | Fill::Short => return Ok(false),
            }

            let field = FieldDescriptor {
                kind,
                name: String::from_utf8_lossy(&raw_name).into_owned(),
                sub_name,
                index,
                size: header.payload_len as usize,
            };
            log::trace!(
                "dispatch {kind:?} hunk: name={} payload={}B",
                field.name,
                field.size
            );
            self.current_payload = field.size;
            // The returned flag is reserved; every hunk in scope is
            // delivered regardless. See the trait docs.
            let _ = visitor.visit(self, &field)?;
        }
    }

    /// Extracts the current hunk's payload into `target`.
    ///
    /// The target's shape decides the contract: a fixed-width scalar
    /// requires the payload length to equal its width; text accepts any
    /// length and is resized to it; a homogeneous sequence requires the
    /// payload length to be a whole multiple of the element width. Shape
    /// violations raise before any byte is consumed.
    ///
    /// Returns `Ok(true)` when the full payload was read, `Ok(false)` when
    /// the source ended partway through. Truncation is an I/O condition,
    /// kept distinct from the [`BrcodeError::SizeMismatch`] caller bug.
    pub fn read_data<T: ReadPayload>(&mut self, target: &mut T) -> Result<bool> {
        let len = self.current_payload;
        T::accept_len(len)?;
        let mut raw = vec![0u8; len];
        match fill(&mut self.source, &mut raw)? {
            Fill::Full => {}
            Fill::Eof | Fill::Short => return Ok(false),
        }
        self.current_payload = 0;
        target.decode_from(&raw);
        Ok(true)
    }
}
