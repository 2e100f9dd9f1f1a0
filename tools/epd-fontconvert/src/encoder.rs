//! Binary encoder
//!
//! Accumulates packed glyphs in code point order, then builds the interval
//! table and face metrics into a [`FontAsset`]. [`encode_verified`] writes the
//! blob and reads it straight back; a mismatch is a bug and fails the run.

use std::fmt::Display;

use epd_font::{BitDepth, EpdGlyph, EpdUnicodeInterval, FontAsset};

use crate::error::ConvertError;
use crate::glyph_source::{FaceMetrics, RenderedGlyph};
use crate::intervals::CodePointRange;
use crate::packing::pack_glyph;

/// Glyph record plus the code point it was rendered for (not persisted)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlyphProps {
    pub glyph: EpdGlyph,
    pub code_point: u32,
}

/// Running state for the bitmap blob and glyph table
#[derive(Debug, Clone)]
pub struct FontAssetBuilder {
    depth: BitDepth,
    bitmap: Vec<u8>,
    glyphs: Vec<GlyphProps>,
}

impl FontAssetBuilder {
    pub fn new(depth: BitDepth) -> Self {
        Self {
            depth,
            bitmap: Vec::new(),
            glyphs: Vec::new(),
        }
    }

    pub fn bit_depth(&self) -> BitDepth {
        self.depth
    }

    /// Pack `rendered` and append it after the previous glyph
    pub fn push_glyph(
        &mut self,
        code_point: u32,
        rendered: &RenderedGlyph,
    ) -> Result<GlyphProps, ConvertError> {
        let packed = pack_glyph(&rendered.bitmap, self.depth);
        let cp = code_point;

        let glyph = EpdGlyph {
            width: narrow_glyph_field(cp, "width", rendered.bitmap.width() as i64)?,
            height: narrow_glyph_field(cp, "height", rendered.bitmap.height() as i64)?,
            advance_x: narrow_glyph_field(
                cp,
                "advance_x",
                i64::from(rendered.advance_x.ceil_px()),
            )?,
            left: narrow_glyph_field(cp, "left", i64::from(rendered.left))?,
            top: narrow_glyph_field(cp, "top", i64::from(rendered.top))?,
            data_length: narrow_glyph_field(cp, "data_length", packed.len() as i64)?,
            data_offset: narrow_glyph_field(cp, "data_offset", self.bitmap.len() as i64)?,
        };

        self.bitmap.extend_from_slice(&packed);
        let props = GlyphProps { glyph, code_point };
        self.glyphs.push(props);
        Ok(props)
    }

    /// Packed pixels already appended for `props`
    pub fn glyph_data(&self, props: &GlyphProps) -> &[u8] {
        let start = props.glyph.data_offset as usize;
        self.bitmap
            .get(start..props.glyph.data_end())
            .unwrap_or_default()
    }

    /// Attach intervals and face metrics.
    ///
    /// The glyphs pushed so far must be exactly the code points of
    /// `intervals`, walked in order.
    pub fn finish(
        self,
        intervals: &[CodePointRange],
        face: &FaceMetrics,
    ) -> Result<(FontAsset, Vec<GlyphProps>), ConvertError> {
        let walked = intervals.iter().flat_map(CodePointRange::code_points);
        if !walked.eq(self.glyphs.iter().map(|g| g.code_point)) {
            return Err(ConvertError::invariant(format!(
                "{} glyphs do not match the code points of {} intervals",
                self.glyphs.len(),
                intervals.len()
            )));
        }

        let asset = FontAsset {
            bitmap: self.bitmap,
            glyphs: self.glyphs.iter().map(|g| g.glyph).collect(),
            intervals: interval_records(intervals),
            advance_y: narrow_face_field("advance_y", face.height.ceil_px())?,
            ascender: face.ascender.ceil_px(),
            descender: face.descender.floor_px(),
            is_2bit: self.depth.is_2bit(),
        };
        Ok((asset, self.glyphs))
    }
}

/// Interval records with running code point offsets
pub fn interval_records(intervals: &[CodePointRange]) -> Vec<EpdUnicodeInterval> {
    intervals
        .iter()
        .scan(0u32, |offset, interval| {
            let record = EpdUnicodeInterval::new(interval.first, interval.last, *offset);
            *offset += interval.len();
            Some(record)
        })
        .collect()
}

fn narrow_glyph_field<T: TryFrom<i64>>(
    code_point: u32,
    field: &'static str,
    value: i64,
) -> Result<T, ConvertError> {
    T::try_from(value).map_err(|_| ConvertError::FieldOverflow {
        code_point,
        field,
        value: value.to_string(),
    })
}

fn narrow_face_field<T, V>(field: &'static str, value: V) -> Result<T, ConvertError>
where
    V: Copy + Display + TryInto<T>,
{
    value
        .try_into()
        .map_err(|_| ConvertError::FaceMetricOverflow {
            field,
            value: value.to_string(),
        })
}

/// Validate, encode, and re-decode; the decoded asset must equal `asset`.
pub fn encode_verified(asset: &FontAsset) -> Result<Vec<u8>, ConvertError> {
    asset.validate()?;

    let bytes = asset.encode();
    let decoded = FontAsset::decode(&bytes)?;
    if let Some(difference) = first_difference(asset, &decoded) {
        return Err(ConvertError::invariant(format!(
            "round-trip mismatch: {difference}"
        )));
    }

    Ok(bytes)
}

fn first_difference(expected: &FontAsset, actual: &FontAsset) -> Option<String> {
    if expected.bitmap != actual.bitmap {
        return Some(format!(
            "bitmap ({} bytes written, {} read)",
            expected.bitmap.len(),
            actual.bitmap.len()
        ));
    }
    if expected.glyphs.len() != actual.glyphs.len() {
        return Some(format!(
            "glyph count ({} written, {} read)",
            expected.glyphs.len(),
            actual.glyphs.len()
        ));
    }
    if let Some(i) = (0..expected.glyphs.len()).find(|&i| expected.glyphs[i] != actual.glyphs[i]) {
        return Some(format!("glyph {i}"));
    }
    if expected.intervals != actual.intervals {
        return Some("intervals".to_string());
    }
    if (expected.advance_y, expected.ascender, expected.descender, expected.is_2bit)
        != (actual.advance_y, actual.ascender, actual.descender, actual.is_2bit)
    {
        return Some("face metrics".to_string());
    }
    None
}
