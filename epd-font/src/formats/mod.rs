//! EPD font binary format
//!
//! POD (Plain Old Data) records for the `.epd_fb` blob. No magic bytes - the
//! format is determined by context (the device loads it as a font).
//!
//! All records implement the [`BinarySerializable`] trait for consistent
//! serialization/deserialization.

mod font;
mod serialization;

pub use font::*;
pub use serialization::BinarySerializable;
