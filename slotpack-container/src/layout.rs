//! Container geometry and alignment arithmetic
//!
//! ```text
//! ┌──────────────────────────────────────────────┐ 0
//! │ ContainerHeader (32 bytes)                   │
//! ├──────────────────────────────────────────────┤ slot_table_offset()
//! │ SampleDescriptor × capacity (36 bytes each)  │
//! ├──────────────────────────────────────────────┤
//! │ zero padding up to the next block            │
//! ├──────────────────────────────────────────────┤ data_region_start(capacity)
//! │ payload 0 │ pad │ payload 1 │ pad │ ...       │ each payload block aligned
//! └──────────────────────────────────────────────┘ total_size (block multiple)
//! ```

use slotpack_shared::ContainerFormat;

use crate::error::FormatError;
use crate::formats::{BinarySerializable, ContainerHeader, SampleDescriptor};

/// Round `offset` up to the next multiple of `block_size` (a power of two).
pub fn align(offset: u64, block_size: u64) -> u64 {
    offset.next_multiple_of(block_size)
}

/// Byte geometry for one validated container format
#[derive(Debug, Clone, Copy)]
pub struct Layout {
    format: ContainerFormat,
}

impl Layout {
    /// Validate the format constants and build its layout
    pub fn new(format: &ContainerFormat) -> Result<Self, FormatError> {
        if format.max_slots == 0 {
            return Err(FormatError::InvalidFormat("slot capacity is zero".into()));
        }
        if !format.block_size.is_power_of_two() {
            return Err(FormatError::InvalidFormat(format!(
                "block size {} is not a power of two",
                format.block_size
            )));
        }

        let layout = Self { format: *format };
        layout.check_end(layout.data_region_start(format.max_slots))?;
        Ok(layout)
    }

    pub fn format(&self) -> &ContainerFormat {
        &self.format
    }

    pub fn block_size(&self) -> u64 {
        self.format.block_size as u64
    }

    pub fn max_container_size(&self) -> u64 {
        self.format.max_container_size as u64
    }

    pub fn header_size(&self) -> u64 {
        <ContainerHeader as BinarySerializable>::SIZE as u64
    }

    pub fn slot_table_offset(&self) -> u64 {
        self.header_size()
    }

    pub fn slot_descriptor_size(&self) -> u64 {
        <SampleDescriptor as BinarySerializable>::SIZE as u64
    }

    /// Offset of descriptor `index`; with `index == capacity` this is the table end
    pub fn descriptor_offset(&self, index: usize) -> u64 {
        self.slot_table_offset() + index as u64 * self.slot_descriptor_size()
    }

    pub fn table_size(&self, capacity: u16) -> u64 {
        capacity as u64 * self.slot_descriptor_size()
    }

    /// First payload byte: end of the table rounded up to a block
    pub fn data_region_start(&self, capacity: u16) -> u64 {
        align(
            self.slot_table_offset() + self.table_size(capacity),
            self.block_size(),
        )
    }

    pub fn align(&self, offset: u64) -> u64 {
        align(offset, self.block_size())
    }

    pub fn check_capacity(&self, capacity: usize) -> Result<(), FormatError> {
        if capacity == 0 || capacity > self.format.max_slots as usize {
            return Err(FormatError::InvalidCapacity {
                capacity,
                max: self.format.max_slots as usize,
            });
        }
        Ok(())
    }

    pub fn check_end(&self, offset: u64) -> Result<(), FormatError> {
        if offset > self.max_container_size() {
            return Err(FormatError::OffsetOutOfRange {
                offset,
                max: self.max_container_size(),
            });
        }
        Ok(())
    }
}
