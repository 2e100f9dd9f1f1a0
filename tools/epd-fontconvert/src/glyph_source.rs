//! Glyph sources and the prioritized font stack
//!
//! A [`GlyphSource`] answers coverage queries and renders anti-aliased
//! 8-bit bitmaps. [`FontStack`] queries an ordered list of sources and uses
//! the first one that has a glyph for a code point.

use std::path::Path;

use crate::error::ConvertError;

/// All fonts are rendered as if at this resolution
pub const RENDER_DPI: u32 = 150;

const POINTS_PER_INCH: f32 = 72.0;

/// Rendered last to fix the face-wide metrics (reliable descender)
pub const FACE_METRICS_CODE_POINT: u32 = '|' as u32;

/// Pixel size for a point size at [`RENDER_DPI`]
pub fn pixel_size(size: u32) -> f32 {
    size as f32 * RENDER_DPI as f32 / POINTS_PER_INCH
}

/// 26.6 fixed point value (6 fractional bits)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Fixed26_6(pub i32);

impl Fixed26_6 {
    const ONE: i32 = 1 << 6;

    pub fn from_pixels(pixels: f32) -> Self {
        Self((pixels * Self::ONE as f32).round() as i32)
    }

    /// Whole pixels, rounded toward positive infinity
    pub fn ceil_px(self) -> i32 {
        self.0.div_euclid(Self::ONE) + i32::from(self.0.rem_euclid(Self::ONE) != 0)
    }

    /// Whole pixels, rounded toward negative infinity
    pub fn floor_px(self) -> i32 {
        self.0.div_euclid(Self::ONE)
    }
}

/// 8-bit coverage bitmap, row-major, `pitch` bytes per row
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawBitmap {
    width: usize,
    height: usize,
    pitch: usize,
    pixels: Vec<u8>,
}

impl RawBitmap {
    /// Returns `None` if `pixels` is too short for the given geometry
    pub fn new(width: usize, height: usize, pitch: usize, pixels: Vec<u8>) -> Option<Self> {
        if pitch < width {
            return None;
        }
        let needed = match height {
            0 => 0,
            h => (h - 1) * pitch + width,
        };
        if pixels.len() < needed {
            return None;
        }
        Some(Self {
            width,
            height,
            pitch,
            pixels,
        })
    }

    /// Tightly packed bitmap (`pitch == width`)
    pub fn from_rows(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        Self::new(width, height, width, pixels)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row(&self, y: usize) -> &[u8] {
        let start = y * self.pitch;
        &self.pixels[start..start + self.width]
    }
}

/// One rendered glyph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedGlyph {
    pub bitmap: RawBitmap,
    pub advance_x: Fixed26_6,
    /// Pen position to left edge, pixels
    pub left: i32,
    /// Baseline to top row, pixels
    pub top: i32,
}

/// Face-wide metrics at the render size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FaceMetrics {
    /// Line height
    pub height: Fixed26_6,
    pub ascender: Fixed26_6,
    /// Usually negative (below the baseline)
    pub descender: Fixed26_6,
}

/// A font the stack can draw glyphs from.
pub trait GlyphSource {
    fn has_glyph(&self, code_point: u32) -> bool;

    /// Render at `pixel_size`; `None` if the glyph is missing
    fn render(&self, code_point: u32, pixel_size: f32) -> Option<RenderedGlyph>;

    fn face_metrics(&self, pixel_size: f32) -> Option<FaceMetrics>;
}

/// Outline font loaded from disk, rasterized with fontdue
pub struct FontFace {
    name: String,
    font: fontdue::Font,
}

impl FontFace {
    pub fn load(path: &Path) -> Result<Self, ConvertError> {
        let bytes = std::fs::read(path).map_err(|source| ConvertError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path.display().to_string(), bytes)
    }

    pub fn from_bytes(name: String, bytes: Vec<u8>) -> Result<Self, ConvertError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(
            |message| ConvertError::FontParse {
                name: name.clone(),
                message: message.to_string(),
            },
        )?;
        tracing::debug!("Loaded font {}", name);
        Ok(Self { name, font })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn glyph_index(&self, code_point: u32) -> Option<u16> {
        let ch = char::from_u32(code_point)?;
        match self.font.lookup_glyph_index(ch) {
            0 => None,
            index => Some(index),
        }
    }
}

impl GlyphSource for FontFace {
    fn has_glyph(&self, code_point: u32) -> bool {
        self.glyph_index(code_point).is_some()
    }

    fn render(&self, code_point: u32, pixel_size: f32) -> Option<RenderedGlyph> {
        let index = self.glyph_index(code_point)?;
        let (metrics, pixels) = self.font.rasterize_indexed(index, pixel_size);
        let bitmap = RawBitmap::from_rows(metrics.width, metrics.height, pixels)?;
        Some(RenderedGlyph {
            bitmap,
            advance_x: Fixed26_6::from_pixels(metrics.advance_width),
            left: metrics.xmin,
            top: metrics.ymin + metrics.height as i32,
        })
    }

    fn face_metrics(&self, pixel_size: f32) -> Option<FaceMetrics> {
        let line = self.font.horizontal_line_metrics(pixel_size)?;
        Some(FaceMetrics {
            height: Fixed26_6::from_pixels(line.new_line_size),
            ascender: Fixed26_6::from_pixels(line.ascent),
            descender: Fixed26_6::from_pixels(line.descent),
        })
    }
}

/// Ordered glyph sources, highest priority first
pub struct FontStack<S> {
    sources: Vec<S>,
    pixel_size: f32,
    last_used: Option<usize>,
}

impl<S: GlyphSource> FontStack<S> {
    /// `size` is in points and converted at [`RENDER_DPI`]
    pub fn new(sources: Vec<S>, size: u32) -> Result<Self, ConvertError> {
        if sources.is_empty() {
            return Err(ConvertError::EmptyFontStack);
        }
        Ok(Self {
            sources,
            pixel_size: pixel_size(size),
            last_used: None,
        })
    }

    pub fn pixel_size(&self) -> f32 {
        self.pixel_size
    }

    pub fn sources(&self) -> &[S] {
        &self.sources
    }

    /// Index of the first source containing `code_point`
    pub fn source_for(&self, code_point: u32) -> Option<usize> {
        self.sources.iter().position(|s| s.has_glyph(code_point))
    }

    pub fn covers(&self, code_point: u32) -> bool {
        self.source_for(code_point).is_some()
    }

    /// Render with the first source that has the glyph
    pub fn rasterize(&mut self, code_point: u32) -> Option<RenderedGlyph> {
        let index = self.source_for(code_point)?;
        let glyph = self.sources[index].render(code_point, self.pixel_size)?;
        self.last_used = Some(index);
        Some(glyph)
    }

    /// Metrics of the face that rendered most recently
    pub fn face_metrics(&self) -> Option<FaceMetrics> {
        self.sources
            .get(self.last_used?)?
            .face_metrics(self.pixel_size)
    }
}
