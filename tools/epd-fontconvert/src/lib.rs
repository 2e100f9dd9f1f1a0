//! epd-fontconvert library
//!
//! Converts a prioritized stack of outline fonts into a packed `.epd_fb`
//! bitmap font. The stages are usable on their own (e.g. with an in-memory
//! glyph source in tests):
//!
//! 1. [`intervals`] - merge declared code point ranges, split by coverage
//! 2. [`glyph_source`] - font stack lookup and rasterization
//! 3. [`packing`] - 8-bit coverage to 1-bit / 2-bit packed pixels
//! 4. [`encoder`] - glyph/interval tables and the verified blob

pub mod convert;
pub mod encoder;
mod error;
pub mod glyph_source;
pub mod intervals;
pub mod manifest;
pub mod packing;

#[cfg(test)]
mod test_support;

pub use convert::{ConvertOptions, ConvertSummary, ConvertedFont, build_font, convert_font};
pub use encoder::{FontAssetBuilder, GlyphProps, encode_verified};
pub use error::ConvertError;
pub use glyph_source::{
    FaceMetrics, Fixed26_6, FontFace, FontStack, GlyphSource, RawBitmap, RenderedGlyph,
};
pub use intervals::{CodePointRange, DEFAULT_INTERVALS, merge_ranges, resolve_intervals};
pub use packing::pack_glyph;

// Re-export the format crate so callers can read back what they wrote
pub use epd_font;
