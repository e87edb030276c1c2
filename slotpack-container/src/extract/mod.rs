//! Extractor: recovers sample files from a container or raw device
//!
//! Only the header is trusted to abort a run. Everything after it is examined
//! slot by slot and failures are collected into the [`ExtractReport`].

mod sink;
mod source;

#[cfg(test)]
mod tests;

pub use sink::{DirectorySink, SampleSink};
pub use source::{ByteSource, FileSource, SeekSource, SliceSource, read_at_most};

use hashbrown::HashSet;
use serde::Serialize;
use slotpack_shared::{BankFormat, ContainerFormat};
use tracing::{debug, warn};

use crate::audio::{AudioCodec, DecodedAudio};
use crate::bank::is_bank;
use crate::error::{ExtractError, FormatError, SlotError, SlotErrorKind};
use crate::formats::{ContainerHeader, SampleDescriptor};
use crate::layout::Layout;
use crate::names::output_file_name;
use crate::table::{SlotEntry, SlotTable};

/// Which layout a container image uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    SlotTable,
    Wtpa2Bank,
}

/// Tell the layouts apart from the first bytes of an image.
pub fn detect_kind(head: &[u8], format: &ContainerFormat, bank: &BankFormat) -> Option<ContainerKind> {
    if head.starts_with(&format.magic) {
        Some(ContainerKind::SlotTable)
    } else if is_bank(head, bank) {
        Some(ContainerKind::Wtpa2Bank)
    } else {
        None
    }
}

/// Header plus the examined part of the slot table
#[derive(Debug, Clone)]
pub struct ContainerView {
    pub header: ContainerHeader,
    pub table: SlotTable,
}

/// One recovered sample
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedSlot {
    pub slot: usize,
    pub file_name: String,
    pub descriptor: SampleDescriptor,
}

#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Slot table entries looked at
    pub examined: usize,
    pub extracted: Vec<ExtractedSlot>,
    pub failures: Vec<SlotError>,
}

impl ExtractReport {
    /// False only when something failed and nothing was recovered.
    /// An empty container is a success.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty() || !self.extracted.is_empty()
    }
}

pub struct Extractor {
    layout: Layout,
    slot_limit: Option<usize>,
}

impl Extractor {
    pub fn new(format: &ContainerFormat) -> Result<Self, FormatError> {
        Ok(Self {
            layout: Layout::new(format)?,
            slot_limit: None,
        })
    }

    /// Examine at most `limit` table entries; `None` means the whole table
    pub fn with_slot_limit(mut self, limit: Option<usize>) -> Self {
        self.slot_limit = limit;
        self
    }

    fn limit(&self) -> usize {
        self.slot_limit
            .unwrap_or(self.layout.format().max_slots as usize)
    }

    /// Read the header and the bounded slot table without touching payloads.
    pub fn read_table(&self, source: &mut dyn ByteSource) -> Result<ContainerView, ExtractError> {
        let format = self.layout.format();

        let mut head = vec![0u8; self.layout.header_size() as usize];
        let got = source.read_at(0, &mut head)?;
        head.truncate(got);
        let header = ContainerHeader::parse(&head, format)?;

        let examined = (header.capacity as usize).min(self.limit());
        let table_end = self.layout.descriptor_offset(examined);
        let mut bytes = vec![0u8; table_end as usize];
        let got = source.read_at(0, &mut bytes)?;
        bytes.truncate(got);

        let table = SlotTable::parse_bounded(&bytes, format, self.limit(), source.available_len())?;
        debug!(
            "Container v{}: {} slots, {} examined, {} occupied",
            header.version,
            header.capacity,
            table.examined(),
            table.occupied_count()
        );

        Ok(ContainerView { header, table })
    }

    /// Recover every occupied slot within the limit, encoding each with `codec`
    /// and handing it to `sink`.
    pub fn extract(
        &self,
        source: &mut dyn ByteSource,
        codec: &dyn AudioCodec,
        sink: &mut dyn SampleSink,
    ) -> Result<ExtractReport, ExtractError> {
        let view = self.read_table(source)?;
        Ok(extract_entries(&view.table, source, codec, sink))
    }
}

/// Read, encode and write every occupied entry of `table`, in slot order.
pub(crate) fn extract_entries(
    table: &SlotTable,
    source: &mut dyn ByteSource,
    codec: &dyn AudioCodec,
    sink: &mut dyn SampleSink,
) -> ExtractReport {
    let mut report = ExtractReport {
        examined: table.examined(),
        ..Default::default()
    };
    let mut used_names = HashSet::new();

    for (slot, entry) in table.entries().iter().enumerate() {
        let descriptor = match entry {
            SlotEntry::Empty => continue,
            SlotEntry::Invalid(fault) => {
                warn!("Slot {}: skipping invalid descriptor ({})", slot, fault);
                report
                    .failures
                    .push(SlotError::new(slot, SlotErrorKind::InvalidDescriptor(*fault)));
                continue;
            }
            SlotEntry::Occupied(descriptor) => descriptor,
        };

        match extract_slot(slot, descriptor, source, codec, sink, &mut used_names) {
            Ok(file_name) => {
                debug!("Slot {}: wrote {}", slot, file_name);
                report.extracted.push(ExtractedSlot {
                    slot,
                    file_name,
                    descriptor: *descriptor,
                });
            }
            Err(kind) => {
                let error = SlotError::new(slot, kind);
                warn!("{}", error);
                report.failures.push(error);
            }
        }
    }

    report
}

fn extract_slot(
    slot: usize,
    descriptor: &SampleDescriptor,
    source: &mut dyn ByteSource,
    codec: &dyn AudioCodec,
    sink: &mut dyn SampleSink,
    used_names: &mut HashSet<String>,
) -> Result<String, SlotErrorKind> {
    let offset = descriptor.data_offset as u64;
    let end = descriptor.data_end();
    if let Some(available) = source.available_len() {
        if end > available {
            return Err(SlotErrorKind::OutOfRange {
                offset,
                end,
                available,
            });
        }
    }

    let mut pcm = vec![0u8; descriptor.data_length as usize];
    let got = source.read_at(offset, &mut pcm).map_err(SlotErrorKind::Read)?;
    if got < pcm.len() {
        return Err(SlotErrorKind::ShortRead {
            expected: pcm.len(),
            got,
        });
    }

    let audio = DecodedAudio {
        pcm,
        sample_rate: descriptor.sample_rate,
        bit_depth: descriptor.bit_depth,
        channel_count: descriptor.channel_count,
        frame_count: descriptor.frame_count,
    };
    let encoded = codec.encode(&audio).map_err(SlotErrorKind::Encode)?;

    let file_name = output_file_name(&descriptor.name(), slot, codec.extension(), used_names);
    sink.write_sample(&file_name, &encoded)
        .map_err(SlotErrorKind::Write)?;
    Ok(file_name)
}
