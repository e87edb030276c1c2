//! Binary serialization trait for fixed-size container records.
//!
//! The container header and slot descriptors implement `BinarySerializable` so the
//! layout code can size the table generically. Each record still keeps its
//! type-specific `to_bytes()` returning a fixed-size array.

/// Trait for fixed-size big-endian records.
///
/// The trait uses `Vec<u8>` for the return type because associated const generics
/// in return types (`[u8; Self::SIZE]`) are not yet stable in Rust.
///
/// # Example
///
/// ```
/// use slotpack_container::formats::{BinarySerializable, SampleDescriptor};
///
/// let descriptor = SampleDescriptor::EMPTY;
/// let bytes = descriptor.serialize();
/// assert_eq!(bytes.len(), <SampleDescriptor as BinarySerializable>::SIZE);
/// let parsed = SampleDescriptor::deserialize(&bytes).unwrap();
/// assert!(parsed.is_empty_sentinel());
/// ```
pub trait BinarySerializable: Sized {
    /// Size of the serialized record in bytes.
    const SIZE: usize;

    /// Serialize to bytes.
    fn serialize(&self) -> Vec<u8>;

    /// Deserialize from bytes.
    ///
    /// Returns `None` if the byte slice is too short.
    fn deserialize(bytes: &[u8]) -> Option<Self>;
}

impl BinarySerializable for super::ContainerHeader {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}

impl BinarySerializable for super::SampleDescriptor {
    const SIZE: usize = Self::SIZE;

    fn serialize(&self) -> Vec<u8> {
        self.to_bytes().to_vec()
    }

    fn deserialize(bytes: &[u8]) -> Option<Self> {
        Self::from_bytes(bytes)
    }
}
