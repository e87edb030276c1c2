//! Shared types for the slotpack sampler container tools.
//!
//! Format descriptions live here so every crate agrees on the same constants:
//! - [`ContainerFormat`] / [`SLOTPACK_FORMAT`] for slot-table containers
//! - [`BankFormat`] / [`WTPA2_BANK_FORMAT`] for the legacy fixed-slot bank

pub mod format;
pub mod fs;

pub use format::{BankFormat, ContainerFormat, SLOTPACK_FORMAT, WTPA2_BANK_FORMAT};
pub use fs::{MAX_SOURCE_BYTES, read_file_with_limit};
