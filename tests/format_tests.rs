#![allow(missing_docs)]

use std::io::Read;

use brcode::format::{
    build_magic, validate_magic, MAX_ARRAY_INDEX, MAX_NAME_LEN, MAX_PAYLOAD_LEN, MAX_SUB_NAME_LEN,
};
use brcode::{
    BrcodeError, BrcodeReader, BrcodeWriter, FieldDescriptor, HunkHeader, HunkKind, HunkVisitor,
    Result,
};

// --- MAGIC ---

#[test]
fn test_magic_is_deterministic_and_self_validating() {
    assert_eq!(build_magic(), build_magic());
    assert!(validate_magic(&build_magic()).is_ok());
    assert_eq!(&build_magic()[..2], b"BR");
}

#[test]
fn test_magic_missing_on_short_input() {
    assert!(matches!(
        validate_magic(&[]),
        Err(BrcodeError::MagicMissing)
    ));
    assert!(matches!(
        validate_magic(&build_magic()[..3]),
        Err(BrcodeError::MagicMissing)
    ));
    assert!(matches!(
        BrcodeReader::new(&[][..]),
        Err(BrcodeError::MagicMissing)
    ));
    assert!(matches!(
        BrcodeReader::new(&b"BR"[..]),
        Err(BrcodeError::MagicMissing)
    ));
}

#[test]
fn test_magic_unsupported_on_foreign_input() {
    assert!(matches!(
        BrcodeReader::new(&b"GIF89a"[..]),
        Err(BrcodeError::MagicUnsupported)
    ));

    // Same signature and version, opposite byte order: rejected, never
    // byte-swapped.
    let mut swapped = build_magic();
    swapped[2] = if swapped[2] == b'L' { b'B' } else { b'L' };
    assert!(matches!(
        validate_magic(&swapped),
        Err(BrcodeError::MagicUnsupported)
    ));

    // Future version.
    let mut future = build_magic();
    future[3] = 2;
    assert!(matches!(
        validate_magic(&future),
        Err(BrcodeError::MagicUnsupported)
    ));
}

// --- HEADER PACKING ---

#[test]
fn test_header_roundtrip() -> Result<()> {
    for (kind, name_len, payload_len) in [
        (HunkKind::Field, 1, 0),
        (HunkKind::Array, 64, 1024),
        (HunkKind::Map, MAX_NAME_LEN, MAX_PAYLOAD_LEN),
    ] {
        let word = HunkHeader::encode(kind, name_len, payload_len)?;
        let header = HunkHeader::decode(word);
        assert_eq!(header.raw_kind, kind as u8);
        assert_eq!(header.name_len as usize, name_len);
        assert_eq!(header.payload_len as usize, payload_len);
        assert_eq!(header.kind()?, kind);
    }
    Ok(())
}

#[test]
fn test_header_field_widths() {
    assert!(HunkHeader::encode(HunkKind::Field, 127, 0).is_ok());
    assert!(matches!(
        HunkHeader::encode(HunkKind::Field, 128, 0),
        Err(BrcodeError::OutOfRange(_))
    ));
    assert!(HunkHeader::encode(HunkKind::Field, 1, 8_388_607).is_ok());
    assert!(matches!(
        HunkHeader::encode(HunkKind::Field, 1, 8_388_608),
        Err(BrcodeError::OutOfRange(_))
    ));
}

#[test]
fn test_reserved_type_is_inspectable_but_unusable() {
    // Type bits 3, name length 1: decodes fine, acting on it fails.
    let word = 0b11u32 | (1 << 2);
    let header = HunkHeader::decode(word);
    assert_eq!(header.raw_kind, 3);
    assert_eq!(header.name_len, 1);
    assert!(!header.is_sentinel());
    assert!(matches!(header.kind(), Err(BrcodeError::UnknownType(3))));
}

#[test]
fn test_sentinel_detection() -> Result<()> {
    let sentinel = HunkHeader::decode(HunkHeader::encode(HunkKind::Field, 0, 0)?);
    assert!(sentinel.is_sentinel());
    // Same lengths under a different type are not the sentinel.
    let array = HunkHeader::decode(HunkHeader::encode(HunkKind::Array, 0, 0)?);
    assert!(!array.is_sentinel());
    Ok(())
}

// --- WRITER VALIDATION ---

/// A writer call that fails validation must not emit a single byte.
fn assert_rejected<F>(call: F, expect_empty_name: bool)
where
    F: FnOnce(&mut BrcodeWriter<&mut Vec<u8>>) -> Result<()>,
{
    let mut out = Vec::new();
    let mut writer = BrcodeWriter::new(&mut out).expect("magic write");
    let result = call(&mut writer);
    match result {
        Err(BrcodeError::EmptyName) if expect_empty_name => {}
        Err(BrcodeError::OutOfRange(_)) if !expect_empty_name => {}
        other => panic!("unexpected result: {other:?}"),
    }
    drop(writer);
    assert_eq!(out.len(), 4, "failed call must emit nothing past the magic");
}

#[test]
fn test_writer_rejects_empty_names() {
    assert_rejected(|w| w.add_field("", b"x"), true);
    assert_rejected(|w| w.add_array_element("", 0, b"x"), true);
    assert_rejected(|w| w.add_map_element("", "k", b"x"), true);
    assert_rejected(|w| w.add_map_element("name", "", b"x"), true);
}

#[test]
fn test_writer_rejects_out_of_range_values() {
    let long_name = "n".repeat(MAX_NAME_LEN + 1);
    assert_rejected(|w| w.add_field(&long_name, b"x"), false);

    let long_sub = "s".repeat(MAX_SUB_NAME_LEN + 1);
    assert_rejected(|w| w.add_map_element("name", &long_sub, b"x"), false);

    assert_rejected(
        |w| w.add_array_element("name", MAX_ARRAY_INDEX + 1, b"x"),
        false,
    );

    let oversized = vec![0u8; MAX_PAYLOAD_LEN + 1];
    assert_rejected(|w| w.add_field("name", &oversized), false);
}

#[test]
fn test_writer_accepts_boundary_values() -> Result<()> {
    let mut out = Vec::new();
    let mut writer = BrcodeWriter::new(&mut out)?;
    writer.add_field(&"n".repeat(MAX_NAME_LEN), b"x")?;
    writer.add_array_element("idx", MAX_ARRAY_INDEX, b"x")?;
    writer.add_map_element("map", &"s".repeat(MAX_SUB_NAME_LEN), b"x")?;
    Ok(())
}

// --- READER ERROR PATHS (hand-crafted streams) ---

#[derive(Default)]
struct Recorder {
    names: Vec<String>,
    short: bool,
}

impl<R: Read> HunkVisitor<R> for Recorder {
    fn visit(&mut self, reader: &mut BrcodeReader<R>, field: &FieldDescriptor) -> Result<bool> {
        let mut payload: Vec<u8> = Vec::new();
        self.short |= !reader.read_data(&mut payload)?;
        self.names.push(field.name.clone());
        Ok(true)
    }
}

fn drive(stream: &[u8]) -> Result<(bool, Recorder)> {
    let mut reader = BrcodeReader::new(stream)?;
    let mut recorder = Recorder::default();
    let clean = reader.deserialize(&mut recorder)?;
    Ok((clean, recorder))
}

#[test]
fn test_unknown_type_mid_stream() -> Result<()> {
    let mut stream = build_magic().to_vec();
    let word = 0b11u32 | (1 << 2); // reserved type, name length 1
    stream.extend_from_slice(&word.to_ne_bytes());
    stream.push(b'x');

    let mut reader = BrcodeReader::new(&stream[..])?;
    let mut recorder = Recorder::default();
    assert!(matches!(
        reader.deserialize(&mut recorder),
        Err(BrcodeError::UnknownType(3))
    ));
    Ok(())
}

#[test]
fn test_map_name_empty_mid_stream() -> Result<()> {
    let mut stream = build_magic().to_vec();
    let word = HunkHeader::encode(HunkKind::Map, 4, 0)?;
    stream.extend_from_slice(&word.to_ne_bytes());
    stream.push(0); // sub-name length 0: never produced by a valid writer
    stream.extend_from_slice(b"name");

    let mut reader = BrcodeReader::new(&stream[..])?;
    let mut recorder = Recorder::default();
    assert!(matches!(
        reader.deserialize(&mut recorder),
        Err(BrcodeError::MapNameEmpty)
    ));
    Ok(())
}

#[test]
fn test_size_mismatch_is_raised_before_consuming() -> Result<()> {
    struct WrongWidth;
    impl<R: Read> HunkVisitor<R> for WrongWidth {
        fn visit(
            &mut self,
            reader: &mut BrcodeReader<R>,
            _field: &FieldDescriptor,
        ) -> Result<bool> {
            let mut scalar = 0u32;
            // 3-byte payload into a 4-byte scalar: caller bug.
            match reader.read_data(&mut scalar) {
                Err(BrcodeError::SizeMismatch(_)) => {}
                other => panic!("unexpected: {other:?}"),
            }
            // A sequence of u16 does not divide 3 bytes either.
            let mut seq: Vec<u16> = Vec::new();
            match reader.read_data(&mut seq) {
                Err(BrcodeError::SizeMismatch(_)) => {}
                other => panic!("unexpected: {other:?}"),
            }
            // The payload is still intact for a correctly-shaped target.
            let mut raw: Vec<u8> = Vec::new();
            assert!(reader.read_data(&mut raw)?);
            assert_eq!(raw, b"abc");
            Ok(true)
        }
    }

    let mut out = Vec::new();
    let mut writer = BrcodeWriter::new(&mut out)?;
    writer.add_field("three", b"abc")?;
    let mut reader = BrcodeReader::new(&out[..])?;
    assert!(reader.deserialize(&mut WrongWidth)?);
    Ok(())
}

// --- TRUNCATION ---

#[test]
fn test_clean_eof_versus_truncation() -> Result<()> {
    let mut out = Vec::new();
    let mut writer = BrcodeWriter::new(&mut out)?;
    writer.add_field("first", b"0123456789")?;
    writer.add_array_element("second", 3, b"ab")?;
    writer.add_map_element("third", "key", b"z")?;
    let full = out;

    // Clean boundary: everything before the third hunk.
    let second_end = full.len() - (4 + 1 + 3 + 5 + 1);
    let (clean, recorder) = drive(&full[..second_end])?;
    assert!(clean);
    assert!(!recorder.short);
    assert_eq!(recorder.names, vec!["first", "second"]);

    // Mid-header cut inside the third hunk.
    let (clean, recorder) = drive(&full[..second_end + 2])?;
    assert!(!clean);
    assert_eq!(recorder.names, vec!["first", "second"]);
    Ok(())
}

/// Truncating a valid stream at every byte boundary after the magic never
/// panics and never reports a fully-intact success.
#[test]
fn test_every_truncation_point_is_sound() -> Result<()> {
    let mut out = Vec::new();
    let mut writer = BrcodeWriter::new(&mut out)?;
    writer.add_field("first", b"0123456789")?;
    writer.add_array_element("second", 3, b"ab")?;
    writer.add_map_element("third", "key", b"z")?;
    let full = out;

    let (_, intact) = drive(&full)?;
    let all_names = intact.names;

    for cut in 4..full.len() {
        let (clean, recorder) = drive(&full[..cut])?;
        // Whatever was delivered must be a prefix of the real hunk
        // sequence, and a fully-clean run with intact payloads can only
        // happen on a hunk boundary.
        assert!(recorder.names.len() <= all_names.len());
        assert_eq!(recorder.names[..], all_names[..recorder.names.len()]);
        if clean && !recorder.short {
            let mut first_only = Vec::new();
            BrcodeWriter::new(&mut first_only)?.add_field("first", b"0123456789")?;
            let first_end = first_only.len();
            let mut probe = Vec::new();
            let mut rewriter = BrcodeWriter::new(&mut probe)?;
            rewriter.add_field("first", b"0123456789")?;
            rewriter.add_array_element("second", 3, b"ab")?;
            let boundary = cut == 4 || cut == first_end || cut == probe.len();
            assert!(boundary, "clean success at non-boundary cut {cut}");
        }
    }
    Ok(())
}
