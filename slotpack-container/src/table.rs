//! Slot table: the container's index of samples
//!
//! Parsing never fails on a single bad descriptor. A raw medium may hold garbage,
//! stale slots from earlier use, or a different format revision, so every entry is
//! classified on its own as [`SlotEntry::Occupied`], [`SlotEntry::Empty`] or
//! [`SlotEntry::Invalid`].

use slotpack_shared::ContainerFormat;

use crate::error::{DescriptorFault, FormatError};
use crate::formats::{ContainerHeader, DescriptorBounds, SampleDescriptor};
use crate::layout::Layout;

/// Outcome of reading one descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotEntry {
    Empty,
    Occupied(SampleDescriptor),
    /// Bytes were present but did not describe a usable sample
    Invalid(DescriptorFault),
}

impl SlotEntry {
    pub fn is_occupied(&self) -> bool {
        matches!(self, SlotEntry::Occupied(_))
    }

    pub fn descriptor(&self) -> Option<&SampleDescriptor> {
        match self {
            SlotEntry::Occupied(descriptor) => Some(descriptor),
            _ => None,
        }
    }

    /// Classify raw descriptor bytes
    pub fn classify(descriptor: SampleDescriptor, bounds: &DescriptorBounds) -> Self {
        if descriptor.is_empty_sentinel() {
            return SlotEntry::Empty;
        }
        match descriptor.validate(bounds) {
            Ok(()) => SlotEntry::Occupied(descriptor),
            Err(fault) => SlotEntry::Invalid(fault),
        }
    }
}

/// Fixed-capacity, ordered slot table
///
/// `entries()` holds the slots that were examined; for a table parsed with a slot
/// limit this can be fewer than `capacity()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotTable {
    capacity: usize,
    entries: Vec<SlotEntry>,
}

impl SlotTable {
    /// Table with every slot empty
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: vec![SlotEntry::Empty; capacity],
        }
    }

    /// Table holding the given examined entries
    pub fn from_entries(capacity: usize, entries: Vec<SlotEntry>) -> Self {
        debug_assert!(entries.len() <= capacity);
        Self { capacity, entries }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries examined
    pub fn examined(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[SlotEntry] {
        &self.entries
    }

    pub fn get(&self, slot: usize) -> Option<&SlotEntry> {
        self.entries.get(slot)
    }

    /// Replace an entry; slots past the examined range are ignored
    pub fn set(&mut self, slot: usize, entry: SlotEntry) {
        if let Some(existing) = self.entries.get_mut(slot) {
            *existing = entry;
        }
    }

    pub fn occupied(&self) -> impl Iterator<Item = (usize, &SampleDescriptor)> {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(slot, entry)| entry.descriptor().map(|d| (slot, d)))
    }

    pub fn occupied_count(&self) -> usize {
        self.occupied().count()
    }

    pub fn invalid(&self) -> impl Iterator<Item = (usize, DescriptorFault)> + '_ {
        self.entries.iter().enumerate().filter_map(|(slot, entry)| match entry {
            SlotEntry::Invalid(fault) => Some((slot, *fault)),
            _ => None,
        })
    }

    /// Parse every descriptor of a container held in `bytes`.
    pub fn parse(bytes: &[u8], format: &ContainerFormat) -> Result<Self, FormatError> {
        Self::parse_bounded(bytes, format, usize::MAX, Some(bytes.len() as u64))
    }

    /// Parse at most `limit` descriptors.
    ///
    /// `bytes` must start at offset 0 of the container and cover at least the
    /// examined part of the table. `available` is the total input length when it
    /// is known; it bounds payloads only when the header declares no size.
    pub fn parse_bounded(
        bytes: &[u8],
        format: &ContainerFormat,
        limit: usize,
        available: Option<u64>,
    ) -> Result<Self, FormatError> {
        let layout = Layout::new(format)?;
        let header = ContainerHeader::parse(bytes, format)?;
        let capacity = header.capacity as usize;
        let examined = capacity.min(limit);

        let table_end = layout.descriptor_offset(examined);
        if (bytes.len() as u64) < table_end {
            return Err(FormatError::TooShort {
                needed: table_end,
                available: bytes.len() as u64,
            });
        }

        let bounds = DescriptorBounds {
            block_size: format.block_size,
            data_region_start: layout.data_region_start(header.capacity),
            limit: header
                .declared_size()
                .or(available)
                .unwrap_or(layout.max_container_size()),
        };

        let entries = (0..examined)
            .map(|slot| {
                let at = layout.descriptor_offset(slot) as usize;
                match SampleDescriptor::from_bytes(&bytes[at..]) {
                    Some(descriptor) => SlotEntry::classify(descriptor, &bounds),
                    None => SlotEntry::Invalid(DescriptorFault::Truncated),
                }
            })
            .collect();

        Ok(Self { capacity, entries })
    }

    /// Serialize the whole table: exactly `capacity` descriptors.
    ///
    /// Empty, invalid and unexamined slots are written as the empty sentinel.
    pub fn serialize(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.capacity * SampleDescriptor::SIZE);
        for slot in 0..self.capacity {
            let descriptor = match self.entries.get(slot) {
                Some(SlotEntry::Occupied(descriptor)) => *descriptor,
                _ => SampleDescriptor::EMPTY,
            };
            bytes.extend_from_slice(&descriptor.to_bytes());
        }
        bytes
    }
}
