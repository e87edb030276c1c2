use super::*;
use crate::error::{AudioFormatError, DescriptorFault};
use crate::packer::{PackItem, Packer};
use slotpack_shared::{SLOTPACK_FORMAT, WTPA2_BANK_FORMAT};

/// Encodes as a tiny self-describing blob so tests can check metadata
struct TaggedCodec;

impl AudioCodec for TaggedCodec {
    fn extension(&self) -> &'static str {
        "pcm"
    }

    fn decode(&self, _bytes: &[u8]) -> Result<DecodedAudio, AudioFormatError> {
        Err(AudioFormatError::NotRecognized)
    }

    fn encode(&self, audio: &DecodedAudio) -> Result<Vec<u8>, AudioFormatError> {
        let mut out = Vec::new();
        out.extend_from_slice(&audio.sample_rate.to_be_bytes());
        out.push(audio.bit_depth);
        out.push(audio.channel_count);
        out.extend_from_slice(&audio.frame_count.to_be_bytes());
        out.extend_from_slice(&audio.pcm);
        Ok(out)
    }
}

struct FailingCodec;

impl AudioCodec for FailingCodec {
    fn extension(&self) -> &'static str {
        "bin"
    }

    fn decode(&self, _bytes: &[u8]) -> Result<DecodedAudio, AudioFormatError> {
        Err(AudioFormatError::NotRecognized)
    }

    fn encode(&self, _audio: &DecodedAudio) -> Result<Vec<u8>, AudioFormatError> {
        Err(AudioFormatError::Unsupported("nothing".into()))
    }
}

fn small_format() -> ContainerFormat {
    SLOTPACK_FORMAT.with_max_slots(8).with_block_size(64)
}

fn audio(frames: u32, channels: u8, depth: u8, seed: u8) -> DecodedAudio {
    let len = frames as usize * channels as usize * depth as usize / 8;
    DecodedAudio {
        pcm: (0..len).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect(),
        sample_rate: 32000,
        bit_depth: depth,
        channel_count: channels,
        frame_count: frames,
    }
}

fn packed(format: &ContainerFormat, items: &[PackItem]) -> Vec<u8> {
    Packer::new(format).unwrap().pack(items).unwrap().to_bytes()
}

fn extract_all(format: &ContainerFormat, bytes: &[u8], limit: Option<usize>) -> (ExtractReport, Vec<(String, Vec<u8>)>) {
    let extractor = Extractor::new(format).unwrap().with_slot_limit(limit);
    let mut sink = Vec::new();
    let report = extractor
        .extract(&mut SliceSource::new(bytes), &TaggedCodec, &mut sink)
        .unwrap();
    (report, sink)
}

#[test]
fn test_roundtrip_preserves_metadata_and_pcm() {
    let format = small_format();
    let items = vec![
        PackItem::new("kick.aif", audio(100, 1, 16, 1)),
        PackItem::new("pad.aif", audio(33, 2, 24, 2)),
        PackItem::new("hat.aif", audio(5, 1, 8, 3)),
        PackItem::new("bass.aif", audio(17, 2, 32, 4)),
    ];
    let bytes = packed(&format, &items);
    let (report, sink) = extract_all(&format, &bytes, None);

    assert!(report.failures.is_empty());
    assert_eq!(report.examined, 8);
    assert_eq!(report.extracted.len(), 4);

    for (item, (file_name, blob)) in items.iter().zip(&sink) {
        let expected = TaggedCodec.encode(&item.audio).unwrap();
        assert_eq!(blob, &expected, "{file_name}");
    }
    assert_eq!(sink[0].0, "kick.pcm");
    assert_eq!(sink[3].0, "bass.pcm");
}

#[test]
fn test_extract_is_idempotent() {
    let format = small_format();
    let bytes = packed(
        &format,
        &[
            PackItem::new("a", audio(10, 1, 16, 0)),
            PackItem::new("a", audio(11, 1, 16, 9)),
        ],
    );
    let (_, first) = extract_all(&format, &bytes, None);
    let (_, second) = extract_all(&format, &bytes, None);
    assert_eq!(first, second);
    assert_eq!(first[0].0, "a.pcm");
    assert_eq!(first[1].0, "a_001.pcm");
}

#[test]
fn test_output_names_never_overwrite_earlier_slots() {
    let format = small_format();
    let bytes = packed(
        &format,
        &[
            PackItem::new("kick", audio(10, 1, 8, 0)),
            PackItem::new("kick_002", audio(10, 1, 8, 1)),
            PackItem::new("kick", audio(10, 1, 8, 2)),
        ],
    );
    let (report, sink) = extract_all(&format, &bytes, None);

    assert!(report.failures.is_empty());
    assert_eq!(report.extracted.len(), 3);

    let names: Vec<&str> = sink.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(names, ["kick.pcm", "kick_002.pcm", "kick_002_1.pcm"]);
    let unique: hashbrown::HashSet<String> = names.iter().map(|n| n.to_lowercase()).collect();
    assert_eq!(unique.len(), sink.len());
}

#[test]
fn test_slot_limit_bounds_examined_entries() {
    let format = small_format();
    let items: Vec<_> = (0..5)
        .map(|i| PackItem::new(format!("s{i}"), audio(4, 1, 8, i)))
        .collect();
    let bytes = packed(&format, &items);

    let (report, sink) = extract_all(&format, &bytes, Some(3));
    assert_eq!(report.examined, 3);
    assert_eq!(sink.len(), 3);

    let (report, _) = extract_all(&format, &bytes, Some(1000));
    assert_eq!(report.examined, 8);
    assert_eq!(report.extracted.len(), 5);
}

#[test]
fn test_truncated_payload_does_not_stop_other_slots() {
    let format = small_format();
    let items = vec![
        PackItem::new("first", audio(10, 1, 16, 1)),
        PackItem::new("second", audio(10, 1, 16, 2)),
        PackItem::new("last", audio(500, 1, 16, 3)),
    ];
    let bytes = packed(&format, &items);
    let view = Extractor::new(&format)
        .unwrap()
        .read_table(&mut SliceSource::new(&bytes))
        .unwrap();
    let last = *view.table.get(2).unwrap().descriptor().unwrap();

    // Cut the image inside the last payload; the header still declares the full size
    let cut = &bytes[..last.data_offset as usize + 10];
    let (report, sink) = extract_all(&format, cut, None);

    assert_eq!(sink.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].slot, 2);
    assert!(matches!(
        report.failures[0].kind,
        SlotErrorKind::OutOfRange { .. }
    ));
    assert!(report.is_success());
}

#[test]
fn test_unknown_length_reports_short_read() {
    let format = small_format();
    let mut bytes = packed(&format, &[PackItem::new("x", audio(300, 1, 16, 1))]);
    // Raw device: no declared size, no known length
    bytes[16..20].copy_from_slice(&[0; 4]);
    bytes.truncate(bytes.len() - 100);

    let extractor = Extractor::new(&format).unwrap();
    let mut source = SeekSource::new(std::io::Cursor::new(bytes), None);
    let mut sink: Vec<(String, Vec<u8>)> = Vec::new();
    let report = extractor.extract(&mut source, &TaggedCodec, &mut sink).unwrap();

    assert!(sink.is_empty());
    assert!(matches!(
        report.failures[0].kind,
        SlotErrorKind::ShortRead { .. }
    ));
    assert!(!report.is_success());
}

#[test]
fn test_invalid_descriptor_is_reported() {
    let format = small_format();
    let mut bytes = packed(
        &format,
        &[
            PackItem::new("good", audio(8, 1, 8, 1)),
            PackItem::new("bad", audio(8, 1, 8, 2)),
        ],
    );
    // Slot 1 bit depth -> 12
    bytes[32 + 36 + 20] = 12;

    let (report, sink) = extract_all(&format, &bytes, None);
    assert_eq!(sink.len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].kind,
        SlotErrorKind::InvalidDescriptor(DescriptorFault::BitDepth(12))
    ));
}

#[test]
fn test_encode_failures_are_per_slot() {
    let format = small_format();
    let bytes = packed(&format, &[PackItem::new("a", audio(4, 1, 8, 0))]);
    let extractor = Extractor::new(&format).unwrap();
    let mut sink: Vec<(String, Vec<u8>)> = Vec::new();
    let report = extractor
        .extract(&mut SliceSource::new(&bytes), &FailingCodec, &mut sink)
        .unwrap();
    assert!(matches!(report.failures[0].kind, SlotErrorKind::Encode(_)));
}

#[test]
fn test_empty_container_is_success() {
    let format = small_format();
    let bytes = packed(&format, &[]);
    let (report, sink) = extract_all(&format, &bytes, None);
    assert!(sink.is_empty());
    assert!(report.failures.is_empty());
    assert!(report.is_success());
}

#[test]
fn test_bad_header_is_fatal() {
    let format = small_format();
    let extractor = Extractor::new(&format).unwrap();
    let mut sink: Vec<(String, Vec<u8>)> = Vec::new();
    let result = extractor.extract(&mut SliceSource::new(&[0u8; 4096]), &TaggedCodec, &mut sink);
    assert!(matches!(
        result,
        Err(ExtractError::Format(FormatError::BadMagic { .. }))
    ));
}

#[test]
fn test_detect_kind() {
    let format = small_format();
    let container = packed(&format, &[]);
    assert_eq!(
        detect_kind(&container, &format, &WTPA2_BANK_FORMAT),
        Some(ContainerKind::SlotTable)
    );
    assert_eq!(
        detect_kind(b"WTPASAMP", &format, &WTPA2_BANK_FORMAT),
        Some(ContainerKind::Wtpa2Bank)
    );
    assert_eq!(detect_kind(b"RIFF", &format, &WTPA2_BANK_FORMAT), None);
    assert_eq!(detect_kind(b"WTPAVIDE", &format, &WTPA2_BANK_FORMAT), None);
}
