//! Shared types for the EPD bitmap font format
//!
//! This crate is used by:
//! - `epd-fontconvert` (asset pipeline, writes `.epd_fb` files)
//! - device-side tooling and tests that need to read them back
//!
//! # Modules
//!
//! - [`formats`] - Binary records and the `.epd_fb` layout
//! - [`asset`] - Owned [`FontAsset`] root with encode/decode and invariant checks
//! - [`view`] - Zero-copy [`FontView`] reader with glyph lookup and text measurement
//! - [`family`] - [`EpdFontFamily`], regular/bold/italic faces with fallback to regular

pub mod asset;
mod error;
pub mod family;
pub mod formats;
pub mod view;

pub use asset::FontAsset;
pub use error::FormatError;
pub use family::{EpdFontFamily, Style};
pub use formats::{
    BinarySerializable, BitDepth, EPD_FONT_EXT, EpdFontHeader, EpdGlyph, EpdUnicodeInterval,
    SECTION_ALIGN,
};
pub use view::{FontView, TextBounds};
