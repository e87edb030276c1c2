//! Container format specifications for slot-based sampler storage.
//!
//! This module defines the `ContainerFormat` struct which serves as the single source
//! of truth for every slot-table container constant (magic bytes, capacity, block
//! size, size ceiling). Formats are plain values: pass them explicitly to the layout,
//! table, packer and extractor so several versions can live side by side.
//!
//! # Example
//!
//! ```
//! use slotpack_shared::SLOTPACK_FORMAT;
//!
//! assert_eq!(SLOTPACK_FORMAT.magic, *b"SLOTPACK");
//! assert_eq!(SLOTPACK_FORMAT.max_slots, 512);
//!
//! // A smaller variant for a different device revision
//! let small = SLOTPACK_FORMAT.with_max_slots(16).with_block_size(4096);
//! assert_eq!(small.max_slots, 16);
//! assert_eq!(SLOTPACK_FORMAT.max_slots, 512);
//! ```

/// Slot-table container format specification.
///
/// Defines the constants used to lay out and recognise a container image.
/// Each device revision gets its own static `ContainerFormat` instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerFormat {
    /// Human readable format name (e.g., "slotpack")
    pub name: &'static str,

    /// Container file extension without dot (e.g., "spk")
    pub extension: &'static str,

    /// Magic bytes at start of the container (8 bytes)
    pub magic: [u8; 8],

    /// Format version; readers accept 1..=version
    pub version: u16,

    /// Number of slot descriptors in the table
    pub max_slots: u16,

    /// Device write granularity; payloads start on multiples of this
    pub block_size: u32,

    /// Hard ceiling for the whole container image in bytes
    pub max_container_size: u32,

    /// Rate the device plays back at natively, if it has one
    pub preferred_sample_rate: Option<u32>,
}

impl ContainerFormat {
    /// Create a new container format specification.
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        name: &'static str,
        extension: &'static str,
        magic: [u8; 8],
        version: u16,
        max_slots: u16,
        block_size: u32,
        max_container_size: u32,
        preferred_sample_rate: Option<u32>,
    ) -> Self {
        Self {
            name,
            extension,
            magic,
            version,
            max_slots,
            block_size,
            max_container_size,
            preferred_sample_rate,
        }
    }

    pub const fn with_max_slots(mut self, max_slots: u16) -> Self {
        self.max_slots = max_slots;
        self
    }

    pub const fn with_block_size(mut self, block_size: u32) -> Self {
        self.block_size = block_size;
        self
    }

    pub const fn with_max_container_size(mut self, max_container_size: u32) -> Self {
        self.max_container_size = max_container_size;
        self
    }

    pub const fn with_preferred_sample_rate(mut self, rate: Option<u32>) -> Self {
        self.preferred_sample_rate = rate;
        self
    }

    /// Magic bytes as text for diagnostics.
    pub fn magic_str(&self) -> &str {
        std::str::from_utf8(&self.magic).unwrap_or("<binary>")
    }
}

/// Default slot-table container format.
///
/// - Extension: `.spk`
/// - Magic bytes: `SLOTPACK`
/// - 512 slots, 512-byte blocks (SD card sector), 256 MiB ceiling
pub const SLOTPACK_FORMAT: ContainerFormat = ContainerFormat::new(
    "slotpack",
    "spk",
    *b"SLOTPACK",
    1,
    512,
    512,
    256 * 1024 * 1024,
    None,
);

/// Legacy fixed-slot bank layout read directly by the WTPA2 firmware.
///
/// There is no slot table: a bitmap in the header marks which fixed-size slots hold
/// a sample, and every slot starts with its own big-endian frame count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankFormat {
    /// Human readable format name
    pub name: &'static str,

    /// Device signature at offset 0
    pub magic: [u8; 4],

    /// Content tag at offset 4
    pub kind: [u8; 4],

    /// Size of the header block; slot 0 starts here
    pub header_size: u32,

    /// Offset of the occupancy bitmap inside the header
    pub toc_offset: u32,

    /// Number of fixed slots
    pub slot_count: u16,

    /// Stride between slots (length prefix included)
    pub slot_size: u32,

    /// Implied playback rate
    pub sample_rate: u32,

    /// Implied sample width
    pub bit_depth: u8,

    /// Implied channel count
    pub channel_count: u8,
}

impl BankFormat {
    /// Byte size of the per-slot length prefix.
    pub const LENGTH_PREFIX: u32 = 4;

    /// Largest number of frames a single slot can store.
    pub const fn max_frames(&self) -> u32 {
        self.slot_size - Self::LENGTH_PREFIX
    }

    /// Absolute offset of a slot's length prefix.
    pub const fn slot_offset(&self, slot: usize) -> u64 {
        self.header_size as u64 + slot as u64 * self.slot_size as u64
    }
}

/// WTPA2 sample bank specification.
///
/// - Header: 512 bytes, `WTPA` at 0, `SAMP` at 4, bitmap at 16
/// - 512 slots × 512 KiB, 8-bit mono at 22050 Hz
pub const WTPA2_BANK_FORMAT: BankFormat = BankFormat {
    name: "wtpa2",
    magic: *b"WTPA",
    kind: *b"SAMP",
    header_size: 512,
    toc_offset: 16,
    slot_count: 512,
    slot_size: 512 * 1024,
    sample_rate: 22050,
    bit_depth: 8,
    channel_count: 1,
};
