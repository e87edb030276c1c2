//! Sampler slot-container codec
//!
//! Packs decoded audio into a fixed-layout container a sampler can read straight
//! off its storage medium, and recovers sample files from such a container or
//! from the raw medium itself.
//!
//! # Modules
//!
//! - [`layout`] - byte geometry and block alignment
//! - [`formats`] - header and slot descriptor records
//! - [`table`] - slot table parsing and serialization
//! - [`packer`] - builds container images
//! - [`extract`] - recovers samples, slot by slot
//! - [`bank`] - legacy WTPA2 fixed-slot bank
//! - [`audio`] - decoded audio and the codec seam
//! - [`names`] - slot names and output file names

pub mod audio;
pub mod bank;
pub mod error;
pub mod extract;
pub mod formats;
pub mod layout;
pub mod names;
pub mod packer;
pub mod table;

pub use audio::{AudioCodec, DecodedAudio};
pub use bank::{extract_bank, pack_bank, read_bank_table};
pub use error::{
    AudioFormatError, CapacityError, DescriptorFault, ExtractError, FormatError, PackError,
    SlotError, SlotErrorKind,
};
pub use extract::{
    ByteSource, ContainerKind, ContainerView, DirectorySink, ExtractReport, ExtractedSlot,
    Extractor, FileSource, SampleSink, SliceSource, detect_kind,
};
pub use formats::{ContainerHeader, SampleDescriptor};
pub use layout::Layout;
pub use names::{DuplicateNames, NameOverflow, NamePolicy};
pub use packer::{Container, PackItem, Packer};
pub use table::{SlotEntry, SlotTable};

pub use slotpack_shared::{BankFormat, ContainerFormat, SLOTPACK_FORMAT, WTPA2_BANK_FORMAT};
