//! Legacy WTPA2 sample bank
//!
//! # Layout
//! ```text
//! 0x000: "WTPA"
//! 0x004: "SAMP"
//! 0x010: occupancy bitmap, slot n = bit (n % 8) of byte 0x10 + n / 8
//! 0x200: slot 0: frame count u32 BE, then 8-bit signed mono PCM
//! 0x200 + n * slot_size: slot n
//! ```
//!
//! The bank has no descriptors of its own. Reading one synthesizes a
//! [`SlotTable`] so extraction shares the slot-table code path.

use slotpack_shared::BankFormat;
use tracing::{debug, warn};

use crate::audio::{AudioCodec, DecodedAudio};
use crate::error::{AudioFormatError, CapacityError, DescriptorFault, ExtractError, FormatError, PackError};
use crate::extract::{ByteSource, ExtractReport, SampleSink, extract_entries};
use crate::formats::{SampleDescriptor, encode_name};
use crate::packer::PackItem;
use crate::table::{SlotEntry, SlotTable};

/// Check that decoded audio can be stored in a bank slot as is.
pub fn bank_accepts(bank: &BankFormat, audio: &DecodedAudio) -> Result<(), AudioFormatError> {
    if audio.bit_depth != bank.bit_depth || audio.channel_count != bank.channel_count {
        return Err(AudioFormatError::Unsupported(format!(
            "{}-bit {}-channel audio (bank slots hold {}-bit mono)",
            audio.bit_depth, audio.channel_count, bank.bit_depth
        )));
    }
    if audio.frame_count > bank.max_frames() {
        return Err(AudioFormatError::Unsupported(format!(
            "{} frames (a bank slot holds at most {})",
            audio.frame_count,
            bank.max_frames()
        )));
    }
    Ok(())
}

/// True if `head` starts with the bank signature and content tag
pub fn is_bank(head: &[u8], bank: &BankFormat) -> bool {
    head.len() >= 8 && head[0..4] == bank.magic && head[4..8] == bank.kind
}

fn bitmap_position(bank: &BankFormat, slot: usize) -> (usize, u8) {
    (bank.toc_offset as usize + slot / 8, 1 << (slot % 8))
}

/// Build a bank image with `items` in slots `0..items.len()`.
///
/// Every slot but the last is padded to its full stride; the image ends right
/// after the last payload.
pub fn pack_bank(bank: &BankFormat, items: &[PackItem]) -> Result<Vec<u8>, PackError> {
    let capacity = bank.slot_count as usize;
    if items.len() > capacity {
        return Err(CapacityError::TooManyItems {
            count: items.len(),
            max: capacity,
        }
        .into());
    }

    let mut image = vec![0u8; bank.header_size as usize];
    image[0..4].copy_from_slice(&bank.magic);
    image[4..8].copy_from_slice(&bank.kind);

    for (slot, item) in items.iter().enumerate() {
        let audio = &item.audio;
        audio
            .validate()
            .and_then(|()| bank_accepts(bank, audio))
            .map_err(|reason| PackError::InvalidItem {
                index: slot,
                source_id: item.source.clone(),
                reason,
            })?;
        if audio.sample_rate != bank.sample_rate {
            warn!(
                "{}: sample rate {} Hz, the bank plays back at {} Hz",
                item.source, audio.sample_rate, bank.sample_rate
            );
        }

        let (byte, mask) = bitmap_position(bank, slot);
        image[byte] |= mask;

        image.resize(bank.slot_offset(slot) as usize, 0);
        image.extend_from_slice(&audio.frame_count.to_be_bytes());
        image.extend_from_slice(&audio.pcm);
        debug!("Bank slot {}: {} frames from {}", slot, audio.frame_count, item.source);
    }

    Ok(image)
}

/// Read the bank header and synthesize a table for at most `limit` slots.
pub fn read_bank_table(
    bank: &BankFormat,
    source: &mut dyn ByteSource,
    limit: Option<usize>,
) -> Result<SlotTable, ExtractError> {
    let mut header = vec![0u8; bank.header_size as usize];
    let got = source.read_at(0, &mut header)?;
    if got < header.len() {
        return Err(FormatError::TooShort {
            needed: header.len() as u64,
            available: got as u64,
        }
        .into());
    }
    if header[0..4] != bank.magic {
        return Err(FormatError::BadMagic {
            expected: String::from_utf8_lossy(&bank.magic).into_owned(),
            found: String::from_utf8_lossy(&header[0..4]).into_owned(),
        }
        .into());
    }
    if header[4..8] != bank.kind {
        return Err(FormatError::UnexpectedKind {
            expected: String::from_utf8_lossy(&bank.kind).into_owned(),
            found: String::from_utf8_lossy(&header[4..8]).into_owned(),
        }
        .into());
    }

    let capacity = bank.slot_count as usize;
    let examined = limit.unwrap_or(capacity).min(capacity);
    let entries = (0..examined)
        .map(|slot| {
            let (byte, mask) = bitmap_position(bank, slot);
            if header[byte] & mask == 0 {
                SlotEntry::Empty
            } else {
                read_bank_slot(bank, source, slot)
            }
        })
        .collect();

    Ok(SlotTable::from_entries(capacity, entries))
}

fn read_bank_slot(bank: &BankFormat, source: &mut dyn ByteSource, slot: usize) -> SlotEntry {
    let offset = bank.slot_offset(slot);
    let mut prefix = [0u8; BankFormat::LENGTH_PREFIX as usize];
    match source.read_at(offset, &mut prefix) {
        Ok(n) if n == prefix.len() => {}
        Ok(_) => return SlotEntry::Invalid(DescriptorFault::Truncated),
        Err(e) => {
            warn!("Bank slot {}: failed to read length: {}", slot, e);
            return SlotEntry::Invalid(DescriptorFault::Truncated);
        }
    }

    let frames = u32::from_be_bytes(prefix);
    let data_offset = offset + BankFormat::LENGTH_PREFIX as u64;
    if frames == 0 {
        return SlotEntry::Invalid(DescriptorFault::NoFrames);
    }
    if frames > bank.max_frames() {
        return SlotEntry::Invalid(DescriptorFault::OutOfBounds {
            end: data_offset + frames as u64,
            bound: bank.slot_offset(slot + 1),
        });
    }

    SlotEntry::Occupied(SampleDescriptor {
        name: encode_name(&format!("{slot:03}")),
        sample_rate: bank.sample_rate,
        bit_depth: bank.bit_depth,
        channel_count: bank.channel_count,
        frame_count: frames,
        data_offset: data_offset as u32,
        data_length: frames,
    })
}

/// Recover the samples of a bank image as `NNN.<ext>` files.
pub fn extract_bank(
    bank: &BankFormat,
    source: &mut dyn ByteSource,
    limit: Option<usize>,
    codec: &dyn AudioCodec,
    sink: &mut dyn SampleSink,
) -> Result<ExtractReport, ExtractError> {
    let table = read_bank_table(bank, source, limit)?;
    Ok(extract_entries(&table, source, codec, sink))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::SliceSource;
    use crate::error::SlotErrorKind;
    use slotpack_shared::WTPA2_BANK_FORMAT;

    const BANK: BankFormat = WTPA2_BANK_FORMAT;

    fn mono8(frames: u32, fill: u8) -> DecodedAudio {
        DecodedAudio {
            pcm: vec![fill; frames as usize],
            sample_rate: 22050,
            bit_depth: 8,
            channel_count: 1,
            frame_count: frames,
        }
    }

    /// Hands the PCM back unchanged
    struct RawCodec;

    impl AudioCodec for RawCodec {
        fn extension(&self) -> &'static str {
            "raw"
        }

        fn decode(&self, _bytes: &[u8]) -> Result<DecodedAudio, AudioFormatError> {
            Err(AudioFormatError::NotRecognized)
        }

        fn encode(&self, audio: &DecodedAudio) -> Result<Vec<u8>, AudioFormatError> {
            Ok(audio.pcm.clone())
        }
    }

    #[test]
    fn test_pack_bank_layout() {
        let items = vec![
            PackItem::new("a.aif", mono8(10, 1)),
            PackItem::new("b.aif", mono8(3, 2)),
        ];
        let image = pack_bank(&BANK, &items).unwrap();

        assert_eq!(&image[0..8], b"WTPASAMP");
        assert_eq!(image[16], 0b0000_0011);
        assert!(image[17..512].iter().all(|&b| b == 0));

        assert_eq!(&image[512..516], &10u32.to_be_bytes());
        assert!(image[516..526].iter().all(|&b| b == 1));

        let second = BANK.slot_offset(1) as usize;
        assert_eq!(&image[second..second + 4], &3u32.to_be_bytes());
        assert_eq!(image.len(), second + 4 + 3);
    }

    #[test]
    fn test_bitmap_bits_follow_slot_index() {
        let items: Vec<_> = (0..10)
            .map(|i| PackItem::new(format!("{i}"), mono8(1, 0)))
            .collect();
        let image = pack_bank(&BANK, &items).unwrap();
        assert_eq!(image[16], 0xFF);
        assert_eq!(image[17], 0b0000_0011);
    }

    #[test]
    fn test_pack_bank_rejects_wide_audio() {
        let mut audio = mono8(4, 0);
        audio.bit_depth = 16;
        audio.pcm = vec![0; 8];
        let err = pack_bank(&BANK, &[PackItem::new("wide", audio)]).unwrap_err();
        assert!(matches!(err, PackError::InvalidItem { index: 0, .. }));
    }

    #[test]
    fn test_pack_bank_capacity() {
        let small = BankFormat {
            slot_count: 2,
            ..BANK
        };
        let items: Vec<_> = (0..3)
            .map(|i| PackItem::new(format!("{i}"), mono8(1, 0)))
            .collect();
        assert!(matches!(
            pack_bank(&small, &items),
            Err(PackError::Capacity(CapacityError::TooManyItems { count: 3, max: 2 }))
        ));
    }

    #[test]
    fn test_bank_roundtrip() {
        let items = vec![
            PackItem::new("a", mono8(100, 0x11)),
            PackItem::new("b", mono8(7, 0xF0)),
        ];
        let image = pack_bank(&BANK, &items).unwrap();
        assert!(is_bank(&image, &BANK));

        let mut sink: Vec<(String, Vec<u8>)> = Vec::new();
        let report = extract_bank(&BANK, &mut SliceSource::new(&image), None, &RawCodec, &mut sink).unwrap();

        assert_eq!(report.examined, 512);
        assert!(report.failures.is_empty());
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0], ("000.raw".to_string(), vec![0x11; 100]));
        assert_eq!(sink[1], ("001.raw".to_string(), vec![0xF0; 7]));
    }

    #[test]
    fn test_bank_slot_limit() {
        let items: Vec<_> = (0..3)
            .map(|i| PackItem::new(format!("{i}"), mono8(2, i as u8)))
            .collect();
        let image = pack_bank(&BANK, &items).unwrap();

        let table = read_bank_table(&BANK, &mut SliceSource::new(&image), Some(2)).unwrap();
        assert_eq!(table.examined(), 2);
        assert_eq!(table.occupied_count(), 2);
    }

    #[test]
    fn test_bank_oversize_and_truncated_slots() {
        let items = vec![
            PackItem::new("a", mono8(4, 1)),
            PackItem::new("b", mono8(4, 2)),
        ];
        let mut image = pack_bank(&BANK, &items).unwrap();
        // Corrupt slot 0 length, chop slot 1 payload
        image[512..516].copy_from_slice(&u32::MAX.to_be_bytes());
        image.truncate(image.len() - 2);

        let mut sink: Vec<(String, Vec<u8>)> = Vec::new();
        let report = extract_bank(&BANK, &mut SliceSource::new(&image), None, &RawCodec, &mut sink).unwrap();

        assert!(sink.is_empty());
        assert_eq!(report.failures.len(), 2);
        assert!(matches!(
            report.failures[0].kind,
            SlotErrorKind::InvalidDescriptor(DescriptorFault::OutOfBounds { .. })
        ));
        assert!(matches!(report.failures[1].kind, SlotErrorKind::OutOfRange { .. }));
        assert!(!report.is_success());
    }

    #[test]
    fn test_bank_header_checks() {
        let mut image = pack_bank(&BANK, &[]).unwrap();
        assert_eq!(image.len(), 512);

        image[4..8].copy_from_slice(b"PATT");
        let err = read_bank_table(&BANK, &mut SliceSource::new(&image), None).unwrap_err();
        assert!(matches!(err, ExtractError::Format(FormatError::UnexpectedKind { .. })));

        image[0..4].copy_from_slice(b"NOPE");
        let err = read_bank_table(&BANK, &mut SliceSource::new(&image), None).unwrap_err();
        assert!(matches!(err, ExtractError::Format(FormatError::BadMagic { .. })));

        let err = read_bank_table(&BANK, &mut SliceSource::new(&image[..100]), None).unwrap_err();
        assert!(matches!(err, ExtractError::Format(FormatError::TooShort { .. })));
    }
}
