//! Binary record formats for slot containers
//!
//! Fixed-size, big-endian records with explicit byte serialization. Format
//! constants (magic bytes, capacity, block size) are defined in
//! `slotpack_shared::ContainerFormat`.
//!
//! All records implement the [`BinarySerializable`] trait.

pub mod descriptor;
pub mod header;
mod serialization;

pub use descriptor::{DescriptorBounds, NAME_WIDTH, SampleDescriptor, decode_name, encode_name};
pub use header::ContainerHeader;
pub use serialization::BinarySerializable;

// Re-export format descriptions from shared for convenience
pub use slotpack_shared::{ContainerFormat, SLOTPACK_FORMAT};
