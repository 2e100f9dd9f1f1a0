//! Owned font asset (the root of a `.epd_fb` file)

use crate::error::FormatError;
use crate::formats::{
    BinarySerializable, BitDepth, EpdFontHeader, EpdGlyph, EpdUnicodeInterval, align_section,
};
use crate::view::FontView;

/// Fully built font: packed bitmap blob, glyph records, coverage intervals
/// and face metrics.
///
/// Glyphs are stored in ascending code point order. The glyph at index `i`
/// belongs to the `i`-th code point when the intervals are walked in order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FontAsset {
    /// Concatenated packed glyph bitmaps
    pub bitmap: Vec<u8>,
    pub glyphs: Vec<EpdGlyph>,
    pub intervals: Vec<EpdUnicodeInterval>,
    /// Line height in pixels
    pub advance_y: u8,
    pub ascender: i32,
    pub descender: i32,
    pub is_2bit: bool,
}

impl FontAsset {
    pub fn bit_depth(&self) -> BitDepth {
        BitDepth::from_is_2bit(self.is_2bit)
    }

    /// Size of the encoded blob in bytes
    pub fn encoded_len(&self) -> usize {
        let (_, _, intervals_offset) = self.section_offsets();
        intervals_offset + vector_len(self.intervals.len(), EpdUnicodeInterval::SIZE)
    }

    fn section_offsets(&self) -> (usize, usize, usize) {
        let bitmap_offset = align_section(EpdFontHeader::SIZE);
        let glyphs_offset = bitmap_offset + vector_len(self.bitmap.len(), 1);
        let intervals_offset = glyphs_offset + vector_len(self.glyphs.len(), EpdGlyph::SIZE);
        (bitmap_offset, glyphs_offset, intervals_offset)
    }

    /// Encode to the `.epd_fb` byte layout
    pub fn encode(&self) -> Vec<u8> {
        let (bitmap_offset, glyphs_offset, intervals_offset) = self.section_offsets();
        let header = EpdFontHeader {
            bitmap_offset: bitmap_offset as u32,
            glyphs_offset: glyphs_offset as u32,
            intervals_offset: intervals_offset as u32,
            advance_y: self.advance_y,
            ascender: self.ascender,
            descender: self.descender,
            is_2bit: self.is_2bit,
        };

        let mut out = Vec::with_capacity(self.encoded_len());
        out.extend_from_slice(&header.to_bytes());
        pad_section(&mut out);

        out.extend_from_slice(&(self.bitmap.len() as u32).to_le_bytes());
        out.extend_from_slice(&self.bitmap);
        pad_section(&mut out);

        write_records(&mut out, &self.glyphs);
        write_records(&mut out, &self.intervals);
        out
    }

    /// Decode an owned asset from a blob
    pub fn decode(bytes: &[u8]) -> Result<Self, FormatError> {
        FontView::parse(bytes).map(|view| view.to_asset())
    }

    /// Check the cross-table invariants an embedded reader relies on:
    ///
    /// - each glyph's `data_length` matches its packed size for the bit depth
    /// - glyph data is contiguous from offset 0 and covers the whole bitmap
    /// - intervals are non-empty, strictly ascending and non-overlapping
    /// - interval offsets are running code point counts
    /// - one glyph per covered code point
    pub fn validate(&self) -> Result<(), FormatError> {
        let depth = self.bit_depth();
        let mut expected_offset = 0usize;
        for (i, glyph) in self.glyphs.iter().enumerate() {
            let packed = depth.packed_len(glyph.width as usize, glyph.height as usize);
            if glyph.data_length as usize != packed {
                return Err(FormatError::Invariant(format!(
                    "glyph {} is {}x{} ({}) but declares {} bytes, expected {}",
                    i, glyph.width, glyph.height, depth, glyph.data_length, packed
                )));
            }
            if glyph.data_offset as usize != expected_offset {
                return Err(FormatError::Invariant(format!(
                    "glyph {} data offset {} does not follow previous glyph (expected {})",
                    i, glyph.data_offset, expected_offset
                )));
            }
            expected_offset = glyph.data_end();
        }
        if expected_offset != self.bitmap.len() {
            return Err(FormatError::Invariant(format!(
                "glyph data covers {} bytes but bitmap holds {}",
                expected_offset,
                self.bitmap.len()
            )));
        }

        let mut covered = 0u64;
        let mut previous: Option<&EpdUnicodeInterval> = None;
        for (i, interval) in self.intervals.iter().enumerate() {
            if interval.first > interval.last {
                return Err(FormatError::Invariant(format!(
                    "interval {} is inverted ({:#x} > {:#x})",
                    i, interval.first, interval.last
                )));
            }
            if let Some(prev) = previous {
                if interval.first <= prev.last {
                    return Err(FormatError::Invariant(format!(
                        "interval {} starts at {:#x}, not after previous end {:#x}",
                        i, interval.first, prev.last
                    )));
                }
            }
            if u64::from(interval.offset) != covered {
                return Err(FormatError::Invariant(format!(
                    "interval {} offset {} != preceding code point count {}",
                    i, interval.offset, covered
                )));
            }
            covered += u64::from(interval.len());
            previous = Some(interval);
        }
        if covered != self.glyphs.len() as u64 {
            return Err(FormatError::Invariant(format!(
                "intervals cover {} code points but there are {} glyphs",
                covered,
                self.glyphs.len()
            )));
        }

        Ok(())
    }
}

/// Encoded size of a vector section (count prefix, elements, padding)
fn vector_len(count: usize, element_size: usize) -> usize {
    align_section(4 + count * element_size)
}

fn pad_section(out: &mut Vec<u8>) {
    out.resize(align_section(out.len()), 0);
}

fn write_records<T: BinarySerializable>(out: &mut Vec<u8>, records: &[T]) {
    out.extend_from_slice(&(records.len() as u32).to_le_bytes());
    for record in records {
        out.extend_from_slice(&record.serialize());
    }
    pad_section(out);
}
