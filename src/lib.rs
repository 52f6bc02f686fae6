//! # Brcode
//!
//! A compact, self-describing binary serialization format and its streaming
//! writer/reader. A brcode stream stores named values, array elements, and
//! keyed map elements as a flat sequence of *hunks*; nested sub-structures
//! are delimited by sentinel markers instead of length prefixes, so the
//! writer never has to know a subtree's size in advance.
//!
//! ## Stream Layout
//!
//! Every stream begins with a 4-byte magic preamble and continues as a
//! sequence of hunks (native byte order, no padding):
//!
//! ```text
//! Magic (4B):        'B' 'R' <endian: 'B'|'L'> <version: u8>
//! Hunk header (4B):  bits 0-1  type (0=FIELD, 1=ARRAY, 2=MAP, 3 reserved)
//!                    bits 2-8  name length (1-127; 0 = end-of-scope sentinel)
//!                    bits 9-31 payload length (0-8,388,607)
//! [ARRAY only] (2B): index: u16
//! [MAP only] (1+NB): sub-name length: u8 (1-255), sub-name bytes
//! Name:              name-length raw bytes, not terminated
//! Payload:           payload-length raw bytes, application-defined
//! ```
//!
//! A nested scope is opened by a FIELD hunk with payload length 0 and closed
//! by the reserved sentinel (a FIELD header with name length 0 and payload
//! length 0, nothing following). Matching is purely lexical; the writer does
//! not validate nesting balance.
//!
//! ## Reading Model
//!
//! [`BrcodeReader::deserialize`] decodes one hunk at a time and dispatches a
//! caller-supplied [`HunkVisitor`] with an ephemeral [`FieldDescriptor`].
//! The visitor consumes the payload via [`BrcodeReader::read_data`], or
//! re-enters `deserialize` to descend into a nested scope. This cooperative
//! recursion is ordinary call-stack recursion; its depth is bounded only by
//! how deeply the application nests scopes.
//!
//! Clean end-of-input at a hunk boundary terminates `deserialize` with
//! `Ok(true)`; a mid-hunk truncation yields `Ok(false)`. A raised
//! [`BrcodeError`] always means the stream is invalid or incompatible, never
//! a transient condition.
//!
//! ## Example
//!
//! ```rust
//! use std::io::Read;
//! use brcode::{BrcodeReader, BrcodeWriter, FieldDescriptor, HunkVisitor, Result};
//!
//! struct Collect {
//!     seen: Vec<(String, u8)>,
//! }
//!
//! impl<R: Read> HunkVisitor<R> for Collect {
//!     fn visit(&mut self, reader: &mut BrcodeReader<R>, field: &FieldDescriptor) -> Result<bool> {
//!         let mut value = 0u8;
//!         reader.read_data(&mut value)?;
//!         self.seen.push((field.name.clone(), value));
//!         Ok(true)
//!     }
//! }
//!
//! let mut out = Vec::new();
//! let mut writer = BrcodeWriter::new(&mut out)?;
//! writer.write_field("orange", &33u8)?;
//!
//! let mut reader = BrcodeReader::new(&out[..])?;
//! let mut visitor = Collect { seen: Vec::new() };
//! let clean = reader.deserialize(&mut visitor)?;
//! assert!(clean);
//! assert_eq!(visitor.seen, vec![("orange".to_string(), 33)]);
//! # Ok::<(), brcode::BrcodeError>(())
//! ```
//!
//! ## Scope and Guarantees
//!
//! * **Absence is omission.** The format has no "null" hunk;
//!   [`BrcodeWriter::add_field_if_not_empty`] skips the hunk entirely, and a
//!   reading application must treat "never seen during deserialization" as
//!   the absent state.
//! * **Native byte order only.** The endianness byte in the magic records how
//!   the stream was written; a mismatching stream is rejected
//!   ([`BrcodeError::MagicUnsupported`]), never byte-swapped.
//! * **No panics.** No `unwrap()` or `panic!()` calls in the library
//!   (enforced by clippy lints). All failures surface as [`BrcodeError`].
//! * **Single-threaded.** Writer and reader each own their byte stream
//!   exclusively; there is no internal buffering beyond one assembled hunk
//!   and no background work.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod error;
pub mod format;
pub mod inspector;
pub mod reader;
pub mod wire;
pub mod writer;

// Private modules
mod wire_impls;

// --- RE-EXPORTS ---

pub use error::{BrcodeError, Result};
pub use format::{HunkHeader, HunkKind};
pub use inspector::{BrcodeInspector, HunkInfo, StreamReport};
pub use reader::{BrcodeReader, FieldDescriptor, HunkVisitor};
pub use wire::{ReadPayload, Scalar, WirePayload};
pub use writer::BrcodeWriter;
