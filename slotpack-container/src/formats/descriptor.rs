//! Slot descriptor (one slot table entry)
//!
//! # Layout
//! ```text
//! 0x00: name [u8; 16] (printable ASCII, zero padded)
//! 0x10: sample_rate u32 BE
//! 0x14: bit_depth u8
//! 0x15: channel_count u8
//! 0x16: reserved u16 (zero)
//! 0x18: frame_count u32 BE
//! 0x1C: data_offset u32 BE
//! 0x20: data_length u32 BE
//! ```
//!
//! An all-zero name with zero frame count and zero length is the empty sentinel.

use serde::{Serialize, Serializer};

use crate::audio::{SUPPORTED_BIT_DEPTHS, payload_len};
use crate::error::DescriptorFault;

/// Width of the fixed name field
pub const NAME_WIDTH: usize = 16;

/// Limits a descriptor has to respect inside one container
#[derive(Debug, Clone, Copy)]
pub struct DescriptorBounds {
    pub block_size: u32,
    /// First byte after the header and table
    pub data_region_start: u64,
    /// Payloads must end at or before this offset
    pub limit: u64,
}

/// Slot descriptor (36 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SampleDescriptor {
    #[serde(serialize_with = "serialize_name")]
    pub name: [u8; NAME_WIDTH],
    pub sample_rate: u32,
    pub bit_depth: u8,
    pub channel_count: u8,
    pub frame_count: u32,
    pub data_offset: u32,
    pub data_length: u32,
}

fn serialize_name<S: Serializer>(name: &[u8; NAME_WIDTH], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&decode_name(name))
}

/// Name field as text, stopping at the first zero byte.
pub fn decode_name(name: &[u8; NAME_WIDTH]) -> String {
    let end = name.iter().position(|&b| b == 0).unwrap_or(NAME_WIDTH);
    String::from_utf8_lossy(&name[..end]).into_owned()
}

/// Pack text into the fixed name field. Callers pass printable ASCII of at most
/// `NAME_WIDTH` bytes; anything longer is cut.
pub fn encode_name(name: &str) -> [u8; NAME_WIDTH] {
    let mut field = [0u8; NAME_WIDTH];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_WIDTH);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

fn is_printable(b: u8) -> bool {
    (0x20..=0x7E).contains(&b)
}

impl SampleDescriptor {
    pub const SIZE: usize = 36;

    /// The empty sentinel
    pub const EMPTY: Self = Self {
        name: [0; NAME_WIDTH],
        sample_rate: 0,
        bit_depth: 0,
        channel_count: 0,
        frame_count: 0,
        data_offset: 0,
        data_length: 0,
    };

    /// Write descriptor to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..16].copy_from_slice(&self.name);
        bytes[16..20].copy_from_slice(&self.sample_rate.to_be_bytes());
        bytes[20] = self.bit_depth;
        bytes[21] = self.channel_count;
        // 22..24 reserved
        bytes[24..28].copy_from_slice(&self.frame_count.to_be_bytes());
        bytes[28..32].copy_from_slice(&self.data_offset.to_be_bytes());
        bytes[32..36].copy_from_slice(&self.data_length.to_be_bytes());
        bytes
    }

    /// Read descriptor from bytes (no validation)
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let be32 = |at: usize| u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
        let mut name = [0u8; NAME_WIDTH];
        name.copy_from_slice(&bytes[0..16]);
        Some(Self {
            name,
            sample_rate: be32(16),
            bit_depth: bytes[20],
            channel_count: bytes[21],
            frame_count: be32(24),
            data_offset: be32(28),
            data_length: be32(32),
        })
    }

    pub fn name(&self) -> String {
        decode_name(&self.name)
    }

    /// Zeroed name with no frames and no payload
    pub fn is_empty_sentinel(&self) -> bool {
        self.name.iter().all(|&b| b == 0) && self.frame_count == 0 && self.data_length == 0
    }

    /// Exclusive end offset of the payload
    pub fn data_end(&self) -> u64 {
        self.data_offset as u64 + self.data_length as u64
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count as f64 / self.sample_rate as f64
    }

    /// Check an occupied descriptor against the container it was read from
    pub fn validate(&self, bounds: &DescriptorBounds) -> Result<(), DescriptorFault> {
        let name_len = self.name.iter().position(|&b| b == 0).unwrap_or(NAME_WIDTH);
        if name_len == 0 {
            return Err(DescriptorFault::EmptyName);
        }
        let (text, padding) = self.name.split_at(name_len);
        if !text.iter().all(|&b| is_printable(b)) || padding.iter().any(|&b| b != 0) {
            return Err(DescriptorFault::BadName);
        }

        if !SUPPORTED_BIT_DEPTHS.contains(&self.bit_depth) {
            return Err(DescriptorFault::BitDepth(self.bit_depth));
        }
        if !(1..=2).contains(&self.channel_count) {
            return Err(DescriptorFault::Channels(self.channel_count));
        }
        if self.frame_count == 0 {
            return Err(DescriptorFault::NoFrames);
        }

        let expected = payload_len(self.frame_count, self.channel_count, self.bit_depth);
        if self.data_length as u64 != expected {
            return Err(DescriptorFault::LengthMismatch {
                found: self.data_length,
                expected,
            });
        }
        if (self.data_offset as u64) < bounds.data_region_start {
            return Err(DescriptorFault::InsideTable(self.data_offset));
        }
        if !self.data_offset.is_multiple_of(bounds.block_size) {
            return Err(DescriptorFault::Unaligned(self.data_offset));
        }
        if self.data_end() > bounds.limit {
            return Err(DescriptorFault::OutOfBounds {
                end: self.data_end(),
                bound: bounds.limit,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOUNDS: DescriptorBounds = DescriptorBounds {
        block_size: 512,
        data_region_start: 1024,
        limit: 1024 * 1024,
    };

    fn kick() -> SampleDescriptor {
        SampleDescriptor {
            name: encode_name("kick"),
            sample_rate: 44100,
            bit_depth: 16,
            channel_count: 1,
            frame_count: 1000,
            data_offset: 1024,
            data_length: 2000,
        }
    }

    #[test]
    fn test_descriptor_roundtrip() {
        let descriptor = kick();
        let bytes = descriptor.to_bytes();
        assert_eq!(SampleDescriptor::from_bytes(&bytes).unwrap(), descriptor);
        assert_eq!(&bytes[0..4], b"kick");
        assert_eq!(&bytes[22..24], &[0, 0]);
        assert_eq!(&bytes[24..28], &1000u32.to_be_bytes());
    }

    #[test]
    fn test_empty_sentinel() {
        assert!(SampleDescriptor::EMPTY.is_empty_sentinel());
        assert_eq!(SampleDescriptor::EMPTY.to_bytes(), [0u8; 36]);
        assert!(!kick().is_empty_sentinel());
    }

    #[test]
    fn test_name_encoding() {
        assert_eq!(decode_name(&encode_name("snare")), "snare");
        assert_eq!(
            decode_name(&encode_name("a-very-long-sample-name")),
            "a-very-long-samp"
        );
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(kick().validate(&BOUNDS), Ok(()));
    }

    #[test]
    fn test_validate_name_faults() {
        let mut d = kick();
        d.name = [0; NAME_WIDTH];
        assert_eq!(d.validate(&BOUNDS), Err(DescriptorFault::EmptyName));

        d.name = encode_name("ki\x07ck");
        assert_eq!(d.validate(&BOUNDS), Err(DescriptorFault::BadName));

        d.name = encode_name("ab");
        d.name[5] = b'x'; // text after the terminator
        assert_eq!(d.validate(&BOUNDS), Err(DescriptorFault::BadName));
    }

    #[test]
    fn test_validate_geometry_faults() {
        let mut d = kick();
        d.bit_depth = 12;
        assert_eq!(d.validate(&BOUNDS), Err(DescriptorFault::BitDepth(12)));

        let mut d = kick();
        d.channel_count = 0;
        assert_eq!(d.validate(&BOUNDS), Err(DescriptorFault::Channels(0)));

        let mut d = kick();
        d.data_length = 1999;
        assert!(matches!(
            d.validate(&BOUNDS),
            Err(DescriptorFault::LengthMismatch { found: 1999, expected: 2000 })
        ));
    }

    #[test]
    fn test_validate_placement_faults() {
        let mut d = kick();
        d.data_offset = 512;
        assert_eq!(d.validate(&BOUNDS), Err(DescriptorFault::InsideTable(512)));

        let mut d = kick();
        d.data_offset = 1030;
        assert_eq!(d.validate(&BOUNDS), Err(DescriptorFault::Unaligned(1030)));

        let mut d = kick();
        d.data_offset = 1024 * 1024;
        assert!(matches!(
            d.validate(&BOUNDS),
            Err(DescriptorFault::OutOfBounds { .. })
        ));
    }
}
