//! Packer: lays out decoded samples into a container image
//!
//! The whole container is built in memory first. Nothing is returned unless
//! every item fits, so a failed pack never produces a partial image.

use slotpack_shared::ContainerFormat;
use tracing::{debug, warn};

use crate::audio::DecodedAudio;
use crate::error::{CapacityError, FormatError, PackError};
use crate::formats::{ContainerHeader, SampleDescriptor, encode_name};
use crate::layout::Layout;
use crate::names::{NameAllocator, NamePolicy};
use crate::table::{SlotEntry, SlotTable};

/// One decoded input, in the order it should occupy the slots
#[derive(Debug, Clone)]
pub struct PackItem {
    /// Where the audio came from, usually a path; the slot name is derived from it
    pub source: String,
    pub audio: DecodedAudio,
}

impl PackItem {
    pub fn new(source: impl Into<String>, audio: DecodedAudio) -> Self {
        Self {
            source: source.into(),
            audio,
        }
    }
}

/// A fully laid-out container
#[derive(Debug, Clone)]
pub struct Container {
    pub header: ContainerHeader,
    pub table: SlotTable,
    /// Offset of the first byte of `data`
    pub data_start: u64,
    /// Data region, padded to a whole block
    pub data: Vec<u8>,
}

impl Container {
    pub fn total_size(&self) -> u64 {
        self.data_start + self.data.len() as u64
    }

    /// Header, table, padding and payloads as one contiguous image
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.total_size() as usize);
        bytes.extend_from_slice(&self.header.to_bytes());
        bytes.extend(self.table.serialize());
        bytes.resize(self.data_start as usize, 0);
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

pub struct Packer {
    layout: Layout,
    names: NamePolicy,
}

impl Packer {
    pub fn new(format: &ContainerFormat) -> Result<Self, FormatError> {
        Ok(Self {
            layout: Layout::new(format)?,
            names: NamePolicy::default(),
        })
    }

    pub fn with_name_policy(mut self, names: NamePolicy) -> Self {
        self.names = names;
        self
    }

    /// Pack `items` into slots `0..items.len()`, preserving their order.
    pub fn pack(&self, items: &[PackItem]) -> Result<Container, PackError> {
        let format = *self.layout.format();
        let capacity = format.max_slots as usize;
        if items.len() > capacity {
            return Err(CapacityError::TooManyItems {
                count: items.len(),
                max: capacity,
            }
            .into());
        }

        let data_start = self.layout.data_region_start(format.max_slots);
        let max_size = self.layout.max_container_size();
        let mut table = SlotTable::new(capacity);
        let mut names = NameAllocator::new(self.names);
        let mut data = Vec::new();
        let mut cursor = data_start;

        for (slot, item) in items.iter().enumerate() {
            let audio = &item.audio;
            audio.validate().map_err(|reason| PackError::InvalidItem {
                index: slot,
                source_id: item.source.clone(),
                reason,
            })?;

            if let Some(preferred) = format.preferred_sample_rate {
                if audio.sample_rate != preferred {
                    warn!(
                        "{}: sample rate {} Hz differs from the device rate {} Hz",
                        item.source, audio.sample_rate, preferred
                    );
                }
            }

            let offset = self.layout.align(cursor);
            let end = offset + audio.pcm.len() as u64;
            let padded_end = self.layout.align(end);
            if padded_end > max_size {
                return Err(CapacityError::ContainerTooLarge {
                    size: padded_end,
                    max: max_size,
                }
                .into());
            }

            let name = names.assign(&item.source, slot)?;
            debug!(
                "Slot {}: '{}' at offset {} ({} bytes)",
                slot,
                name,
                offset,
                audio.pcm.len()
            );

            // Offsets fit in u32: they are bounded by max_size, itself a u32
            let descriptor = SampleDescriptor {
                name: encode_name(&name),
                sample_rate: audio.sample_rate,
                bit_depth: audio.bit_depth,
                channel_count: audio.channel_count,
                frame_count: audio.frame_count,
                data_offset: offset as u32,
                data_length: audio.pcm.len() as u32,
            };
            table.set(slot, SlotEntry::Occupied(descriptor));

            data.resize((offset - data_start) as usize, 0);
            data.extend_from_slice(&audio.pcm);
            cursor = end;
        }

        let total_size = self.layout.align(cursor);
        data.resize((total_size - data_start) as usize, 0);

        Ok(Container {
            header: ContainerHeader::new(&format, total_size as u32),
            table,
            data_start,
            data,
        })
    }
}
