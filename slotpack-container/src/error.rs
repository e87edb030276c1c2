//! Error taxonomy for packing and extracting slot containers
//!
//! Structural errors ([`FormatError`], [`CapacityError`]) abort a whole operation.
//! Per-item errors ([`SlotError`], [`AudioFormatError`]) are collected and reported
//! once the scan or pack is finished.

use thiserror::Error;

/// Header or table cannot be interpreted with the given format
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// Input ends before the structure it should contain
    #[error("Input too short: need {needed} bytes, found {available}")]
    TooShort { needed: u64, available: u64 },
    /// Signature at offset 0 does not match
    #[error("Magic bytes not found (expected {expected:?}, found {found:?})")]
    BadMagic { expected: String, found: String },
    /// Signature matches but the content tag does not
    #[error("Unexpected content tag (expected {expected:?}, found {found:?})")]
    UnexpectedKind { expected: String, found: String },
    /// Version is zero or newer than this reader
    #[error("Unsupported format version: {found} (max supported: {supported})")]
    UnsupportedVersion { found: u16, supported: u16 },
    /// Slot capacity outside 1..=max_slots
    #[error("Invalid slot capacity: {capacity} (max {max})")]
    InvalidCapacity { capacity: usize, max: usize },
    /// Header block size disagrees with the format
    #[error("Block size mismatch: container uses {found}, format expects {expected}")]
    BlockSizeMismatch { found: u32, expected: u32 },
    /// Format constants are unusable
    #[error("Invalid format definition: {0}")]
    InvalidFormat(String),
    /// Computed offset is past the format ceiling
    #[error("Offset {offset} exceeds maximum container size {max}")]
    OffsetOutOfRange { offset: u64, max: u64 },
}

/// Input does not fit the container
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("Too many samples: {count} (max {max} slots)")]
    TooManyItems { count: usize, max: usize },
    #[error("Container too large: {size} bytes (max {max} bytes)")]
    ContainerTooLarge { size: u64, max: u64 },
}

/// Audio file could not be decoded, or a payload could not be re-encoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioFormatError {
    #[error("Unrecognised audio file")]
    NotRecognized,
    #[error("Malformed audio file: {0}")]
    Malformed(String),
    #[error("Unsupported audio format: {0}")]
    Unsupported(String),
}

/// Reason a slot descriptor was rejected during table parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DescriptorFault {
    #[error("name contains non-printable bytes")]
    BadName,
    #[error("name is empty")]
    EmptyName,
    #[error("unsupported bit depth {0}")]
    BitDepth(u8),
    #[error("unsupported channel count {0}")]
    Channels(u8),
    #[error("frame count is zero")]
    NoFrames,
    #[error("data length {found} does not match {expected} bytes of frames")]
    LengthMismatch { found: u32, expected: u64 },
    #[error("data offset {0} is not block aligned")]
    Unaligned(u32),
    #[error("data offset {0} overlaps the header or slot table")]
    InsideTable(u32),
    #[error("payload end {end} exceeds container bound {bound}")]
    OutOfBounds { end: u64, bound: u64 },
    #[error("descriptor could not be read")]
    Truncated,
}

/// Packing failed; nothing should be written
#[derive(Debug, Error)]
pub enum PackError {
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("Cannot pack item {index} ({source_id}): {reason}")]
    InvalidItem {
        index: usize,
        source_id: String,
        reason: AudioFormatError,
    },
    #[error("Duplicate slot name '{name}' (slots {first} and {second})")]
    DuplicateName {
        name: String,
        first: usize,
        second: usize,
    },
}

/// Extraction could not start
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("Failed to read container: {0}")]
    Io(#[from] std::io::Error),
}

/// One slot could not be recovered; extraction carries on
#[derive(Debug, Error)]
#[error("Slot {slot}: {kind}")]
pub struct SlotError {
    pub slot: usize,
    pub kind: SlotErrorKind,
}

impl SlotError {
    pub fn new(slot: usize, kind: SlotErrorKind) -> Self {
        Self { slot, kind }
    }
}

#[derive(Debug, Error)]
pub enum SlotErrorKind {
    #[error("invalid descriptor ({0})")]
    InvalidDescriptor(DescriptorFault),
    #[error("payload {offset}..{end} lies beyond the available {available} bytes")]
    OutOfRange { offset: u64, end: u64, available: u64 },
    #[error("short read: expected {expected} bytes, got {got}")]
    ShortRead { expected: usize, got: usize },
    #[error("read failed: {0}")]
    Read(std::io::Error),
    #[error("encode failed: {0}")]
    Encode(AudioFormatError),
    #[error("write failed: {0}")]
    Write(std::io::Error),
}
