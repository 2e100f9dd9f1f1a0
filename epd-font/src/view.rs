//! Zero-copy reader for `.epd_fb` blobs
//!
//! Mirrors what the device does: parse the header once, then look glyphs up
//! by binary search over the code point intervals without copying any table.

use crate::asset::FontAsset;
use crate::error::FormatError;
use crate::formats::{BinarySerializable, BitDepth, EpdFontHeader, EpdGlyph, EpdUnicodeInterval};

/// Substituted for code points the font does not cover
const FALLBACK_CODE_POINT: u32 = '?' as u32;

/// Borrowed view over an encoded font.
#[derive(Debug, Clone, Copy)]
pub struct FontView<'a> {
    header: EpdFontHeader,
    bitmap: &'a [u8],
    glyphs: &'a [u8],
    intervals: &'a [u8],
}

/// Bounding box of a run of text, y pointing up from the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBounds {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TextBounds {
    pub fn width(&self) -> i32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> i32 {
        self.max_y - self.min_y
    }
}

impl<'a> FontView<'a> {
    /// Parse and bounds-check a blob
    pub fn parse(buf: &'a [u8]) -> Result<Self, FormatError> {
        let header_bytes = section(buf, 0, EpdFontHeader::SIZE, "header")?;
        let header = EpdFontHeader::from_bytes(header_bytes)
            .ok_or(FormatError::InvalidBool(header_bytes[EpdFontHeader::IS_2BIT_POS]))?;

        let bitmap = vector(buf, header.bitmap_offset, 1, "bitmap")?;
        let glyphs = vector(buf, header.glyphs_offset, EpdGlyph::SIZE, "glyphs")?;
        let intervals = vector(
            buf,
            header.intervals_offset,
            EpdUnicodeInterval::SIZE,
            "intervals",
        )?;

        Ok(Self {
            header,
            bitmap,
            glyphs,
            intervals,
        })
    }

    pub fn header(&self) -> &EpdFontHeader {
        &self.header
    }

    pub fn advance_y(&self) -> u8 {
        self.header.advance_y
    }

    pub fn ascender(&self) -> i32 {
        self.header.ascender
    }

    pub fn descender(&self) -> i32 {
        self.header.descender
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.header.bit_depth()
    }

    /// All packed glyph bytes
    pub fn bitmap(&self) -> &'a [u8] {
        self.bitmap
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len() / EpdGlyph::SIZE
    }

    pub fn interval_count(&self) -> usize {
        self.intervals.len() / EpdUnicodeInterval::SIZE
    }

    pub fn glyph(&self, index: usize) -> Option<EpdGlyph> {
        EpdGlyph::read_at(self.glyphs, index)
    }

    pub fn interval(&self, index: usize) -> Option<EpdUnicodeInterval> {
        EpdUnicodeInterval::read_at(self.intervals, index)
    }

    pub fn glyphs(&self) -> impl Iterator<Item = EpdGlyph> + 'a {
        self.glyphs
            .chunks_exact(EpdGlyph::SIZE)
            .filter_map(EpdGlyph::from_bytes)
    }

    pub fn intervals(&self) -> impl Iterator<Item = EpdUnicodeInterval> + 'a {
        self.intervals
            .chunks_exact(EpdUnicodeInterval::SIZE)
            .filter_map(EpdUnicodeInterval::from_bytes)
    }

    /// Look up the glyph for a code point (binary search over intervals)
    pub fn find_glyph(&self, code_point: u32) -> Option<EpdGlyph> {
        let mut lo = 0;
        let mut hi = self.interval_count();
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            let interval = self.interval(mid)?;
            if code_point < interval.first {
                hi = mid;
            } else if code_point > interval.last {
                lo = mid + 1;
            } else {
                let index = interval.offset as usize + (code_point - interval.first) as usize;
                return self.glyph(index);
            }
        }
        None
    }

    /// Packed pixel data of a glyph
    pub fn glyph_bitmap(&self, glyph: &EpdGlyph) -> Option<&'a [u8]> {
        self.bitmap
            .get(glyph.data_offset as usize..glyph.data_end())
    }

    /// Decode one pixel: 0/1 in 1-bit mode, 0..=3 (white..black) in 2-bit mode
    pub fn glyph_pixel(&self, glyph: &EpdGlyph, x: u8, y: u8) -> Option<u8> {
        if x >= glyph.width || y >= glyph.height {
            return None;
        }
        let index = y as usize * glyph.width as usize + x as usize;
        self.bit_depth()
            .unpack_pixel(self.glyph_bitmap(glyph)?, index)
    }

    /// Bounds of `text` drawn with the pen starting at (`x`, `y`)
    ///
    /// Unknown code points fall back to `'?'`; if that is missing too the
    /// character is skipped.
    pub fn text_bounds(&self, text: &str, x: i32, y: i32) -> TextBounds {
        let mut bounds = TextBounds {
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        };

        let mut cursor_x = x;
        for ch in text.chars() {
            let Some(glyph) = self
                .find_glyph(ch as u32)
                .or_else(|| self.find_glyph(FALLBACK_CODE_POINT))
            else {
                continue;
            };

            let left = cursor_x + i32::from(glyph.left);
            let top = y + i32::from(glyph.top);
            bounds.min_x = bounds.min_x.min(left);
            bounds.max_x = bounds.max_x.max(left + i32::from(glyph.width));
            bounds.min_y = bounds.min_y.min(top - i32::from(glyph.height));
            bounds.max_y = bounds.max_y.max(top);
            cursor_x += i32::from(glyph.advance_x);
        }

        bounds
    }

    /// Width and height of `text`
    pub fn text_dimensions(&self, text: &str) -> (i32, i32) {
        let bounds = self.text_bounds(text, 0, 0);
        (bounds.width(), bounds.height())
    }

    /// Whether drawing `text` would put any ink on screen
    pub fn has_printable_chars(&self, text: &str) -> bool {
        let (w, h) = self.text_dimensions(text);
        w > 0 || h > 0
    }

    /// Copy everything into an owned [`FontAsset`]
    pub fn to_asset(&self) -> FontAsset {
        FontAsset {
            bitmap: self.bitmap.to_vec(),
            glyphs: self.glyphs().collect(),
            intervals: self.intervals().collect(),
            advance_y: self.header.advance_y,
            ascender: self.header.ascender,
            descender: self.header.descender,
            is_2bit: self.header.is_2bit,
        }
    }
}

fn section<'a>(
    buf: &'a [u8],
    offset: usize,
    len: usize,
    name: &'static str,
) -> Result<&'a [u8], FormatError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(FormatError::Truncated {
            section: name,
            offset,
            needed: len,
            available: buf.len().saturating_sub(offset),
        })
}

/// Elements of a count-prefixed vector section
fn vector<'a>(
    buf: &'a [u8],
    offset: u32,
    element_size: usize,
    name: &'static str,
) -> Result<&'a [u8], FormatError> {
    let offset = offset as usize;
    let count = section(buf, offset, 4, name)?;
    let count = u32::from_le_bytes([count[0], count[1], count[2], count[3]]) as usize;
    let len = count
        .checked_mul(element_size)
        .ok_or(FormatError::Truncated {
            section: name,
            offset: offset + 4,
            needed: usize::MAX,
            available: buf.len().saturating_sub(offset + 4),
        })?;
    section(buf, offset + 4, len, name)
}
