//! Fixed-size record tables
//!
//! Glyph and interval sections are flat arrays of equally sized records.
//! [`BinarySerializable`] lets the writer in `asset` and the reader in `view`
//! handle both tables (and the header) with one code path.

/// A record with a fixed little-endian encoding of `SIZE` bytes
pub trait BinarySerializable: Sized {
    const SIZE: usize;

    fn serialize(&self) -> Vec<u8>;

    /// `None` on short input or an invalid field
    fn deserialize(bytes: &[u8]) -> Option<Self>;

    /// Record `index` of a packed table
    fn read_at(table: &[u8], index: usize) -> Option<Self> {
        let start = index.checked_mul(Self::SIZE)?;
        let end = start.checked_add(Self::SIZE)?;
        Self::deserialize(table.get(start..end)?)
    }
}

macro_rules! impl_record {
    ($($ty:ty),+) => {$(
        impl BinarySerializable for $ty {
            const SIZE: usize = <$ty>::SIZE;

            fn serialize(&self) -> Vec<u8> {
                self.to_bytes().to_vec()
            }

            fn deserialize(bytes: &[u8]) -> Option<Self> {
                Self::from_bytes(bytes)
            }
        }
    )+};
}

impl_record!(super::EpdFontHeader, super::EpdGlyph, super::EpdUnicodeInterval);
