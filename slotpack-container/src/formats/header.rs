//! Container header (`SLOTPACK` images)
//!
//! # Layout
//! ```text
//! 0x00: magic [u8; 8]
//! 0x08: version u16 BE
//! 0x0A: slot capacity u16 BE
//! 0x0C: block size u32 BE
//! 0x10: declared total size u32 BE (0 = unknown)
//! 0x14: reserved (12 bytes, zero)
//! ```

use slotpack_shared::ContainerFormat;

use crate::error::FormatError;
use crate::layout::Layout;

/// Container header (32 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    pub magic: [u8; 8],
    pub version: u16,
    /// Number of descriptors in the slot table
    pub capacity: u16,
    pub block_size: u32,
    /// Length of the whole image, padding included
    pub total_size: u32,
}

impl ContainerHeader {
    pub const SIZE: usize = 32;

    pub fn new(format: &ContainerFormat, total_size: u32) -> Self {
        Self {
            magic: format.magic,
            version: format.version,
            capacity: format.max_slots,
            block_size: format.block_size,
            total_size,
        }
    }

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..8].copy_from_slice(&self.magic);
        bytes[8..10].copy_from_slice(&self.version.to_be_bytes());
        bytes[10..12].copy_from_slice(&self.capacity.to_be_bytes());
        bytes[12..16].copy_from_slice(&self.block_size.to_be_bytes());
        bytes[16..20].copy_from_slice(&self.total_size.to_be_bytes());
        bytes
    }

    /// Read header from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let mut magic = [0u8; 8];
        magic.copy_from_slice(&bytes[0..8]);
        Some(Self {
            magic,
            version: u16::from_be_bytes([bytes[8], bytes[9]]),
            capacity: u16::from_be_bytes([bytes[10], bytes[11]]),
            block_size: u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            total_size: u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
        })
    }

    /// Check the header against the format it is supposed to follow
    pub fn validate(&self, format: &ContainerFormat) -> Result<(), FormatError> {
        if self.magic != format.magic {
            return Err(FormatError::BadMagic {
                expected: format.magic_str().to_string(),
                found: String::from_utf8_lossy(&self.magic).into_owned(),
            });
        }
        if self.version == 0 || self.version > format.version {
            return Err(FormatError::UnsupportedVersion {
                found: self.version,
                supported: format.version,
            });
        }
        let layout = Layout::new(format)?;
        layout.check_capacity(self.capacity as usize)?;
        if self.block_size != format.block_size {
            return Err(FormatError::BlockSizeMismatch {
                found: self.block_size,
                expected: format.block_size,
            });
        }
        layout.check_end(self.total_size as u64)
    }

    /// Read and validate a header from the start of a container
    pub fn parse(bytes: &[u8], format: &ContainerFormat) -> Result<Self, FormatError> {
        let header = Self::from_bytes(bytes).ok_or(FormatError::TooShort {
            needed: Self::SIZE as u64,
            available: bytes.len() as u64,
        })?;
        header.validate(format)?;
        Ok(header)
    }

    /// Declared image size, if the writer recorded one
    pub fn declared_size(&self) -> Option<u64> {
        (self.total_size != 0).then_some(self.total_size as u64)
    }
}
