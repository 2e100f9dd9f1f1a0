//! In-memory glyph source for pipeline tests

use std::collections::BTreeMap;

use crate::glyph_source::{FaceMetrics, Fixed26_6, GlyphSource, RawBitmap, RenderedGlyph};

/// Glyphs are solid `width × height` blocks of one coverage value
#[derive(Debug, Clone, Default)]
pub(crate) struct FakeSource {
    glyphs: BTreeMap<u32, RenderedGlyph>,
    metrics: FaceMetrics,
}

impl FakeSource {
    /// Face metrics in whole pixels
    pub(crate) fn new(ascender: i32, descender: i32, height: i32) -> Self {
        Self {
            glyphs: BTreeMap::new(),
            metrics: FaceMetrics {
                height: Fixed26_6(height * 64),
                ascender: Fixed26_6(ascender * 64),
                descender: Fixed26_6(descender * 64),
            },
        }
    }

    pub(crate) fn with_glyph(self, code_point: u32, width: usize, height: usize, fill: u8) -> Self {
        let pixels = vec![fill; width * height];
        let bitmap = RawBitmap::from_rows(width, height, pixels).unwrap_or_default();
        self.with_rendered(
            code_point,
            RenderedGlyph {
                bitmap,
                advance_x: Fixed26_6((width as i32 + 1) * 64),
                left: 0,
                top: height as i32,
            },
        )
    }

    pub(crate) fn with_rendered(mut self, code_point: u32, glyph: RenderedGlyph) -> Self {
        self.glyphs.insert(code_point, glyph);
        self
    }

    /// Adds '|' plus a solid glyph for every code point in `range`
    pub(crate) fn with_range(mut self, range: std::ops::RangeInclusive<u32>) -> Self {
        for code_point in range {
            self = self.with_glyph(code_point, 3, 4, 0xC0);
        }
        self.with_glyph('|' as u32, 1, 6, 0xFF)
    }
}

impl GlyphSource for FakeSource {
    fn has_glyph(&self, code_point: u32) -> bool {
        self.glyphs.contains_key(&code_point)
    }

    fn render(&self, code_point: u32, _pixel_size: f32) -> Option<RenderedGlyph> {
        self.glyphs.get(&code_point).cloned()
    }

    fn face_metrics(&self, _pixel_size: f32) -> Option<FaceMetrics> {
        Some(self.metrics)
    }
}
