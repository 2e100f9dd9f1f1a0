//! EpdFont binary format (.epd_fb)
//!
//! Packed bitmap font for e-paper panels. Little-endian, POD format - no magic bytes.
//!
//! # Layout
//! ```text
//! 0x00: bitmap_offset u32     (byte offset of the bitmap vector)
//! 0x04: glyphs_offset u32     (byte offset of the glyph vector)
//! 0x08: intervals_offset u32  (byte offset of the interval vector)
//! 0x0C: advance_y u8          (+3 reserved)
//! 0x10: ascender i32
//! 0x14: descender i32
//! 0x18: is_2bit u8            (0 or 1, +3 reserved)
//! 0x1C: sections
//! ```
//!
//! Every section is a vector: `count u32` followed by `count` elements, then
//! zero padding up to the next 4-byte boundary. Sections appear in the order
//! bitmap (u8), glyphs (16 bytes each), intervals (12 bytes each).

/// File extension for packed fonts
pub const EPD_FONT_EXT: &str = "epd_fb";

/// Every section in the blob starts on this boundary
pub const SECTION_ALIGN: usize = 4;

/// Round `len` up to the next section boundary
pub const fn align_section(len: usize) -> usize {
    len.next_multiple_of(SECTION_ALIGN)
}

/// Pixel bit depth of the packed bitmap, chosen once for the whole font.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BitDepth {
    /// Black and white, 8 pixels per byte
    #[default]
    One,
    /// Four grey levels, 4 pixels per byte
    Two,
}

impl BitDepth {
    pub fn from_is_2bit(is_2bit: bool) -> Self {
        if is_2bit { Self::Two } else { Self::One }
    }

    pub fn is_2bit(self) -> bool {
        self == Self::Two
    }

    pub fn bits_per_pixel(self) -> u32 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    pub fn pixels_per_byte(self) -> usize {
        8 / self.bits_per_pixel() as usize
    }

    /// Packed byte count for a `width × height` bitmap (no row padding)
    pub fn packed_len(self, width: usize, height: usize) -> usize {
        (width * height).div_ceil(self.pixels_per_byte())
    }

    /// Read the pixel at raster `index` out of packed data, MSB first
    pub fn unpack_pixel(self, packed: &[u8], index: usize) -> Option<u8> {
        let per_byte = self.pixels_per_byte();
        let bits = self.bits_per_pixel();
        let byte = *packed.get(index / per_byte)?;
        let shift = (per_byte - 1 - index % per_byte) as u32 * bits;
        Some((byte >> shift) & ((1 << bits) - 1))
    }
}

impl std::fmt::Display for BitDepth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::One => f.write_str("1-bit"),
            Self::Two => f.write_str("2-bit"),
        }
    }
}

/// Root header (28 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct EpdFontHeader {
    pub bitmap_offset: u32,
    pub glyphs_offset: u32,
    pub intervals_offset: u32,
    /// Line height in pixels
    pub advance_y: u8,
    pub ascender: i32,
    pub descender: i32,
    pub is_2bit: bool,
}

impl EpdFontHeader {
    pub const SIZE: usize = 28;

    /// Position of the `is_2bit` byte within the header
    pub const IS_2BIT_POS: usize = 0x18;

    /// Write header to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.bitmap_offset.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.glyphs_offset.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.intervals_offset.to_le_bytes());
        bytes[12] = self.advance_y;
        bytes[16..20].copy_from_slice(&self.ascender.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.descender.to_le_bytes());
        bytes[Self::IS_2BIT_POS] = u8::from(self.is_2bit);
        bytes
    }

    /// Read header from bytes
    ///
    /// Returns `None` if the slice is short or `is_2bit` is not 0/1.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        let is_2bit = match bytes[Self::IS_2BIT_POS] {
            0 => false,
            1 => true,
            _ => return None,
        };
        Some(Self {
            bitmap_offset: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            glyphs_offset: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            intervals_offset: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            advance_y: bytes[12],
            ascender: i32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            descender: i32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
            is_2bit,
        })
    }

    pub fn bit_depth(&self) -> BitDepth {
        BitDepth::from_is_2bit(self.is_2bit)
    }
}

/// Per-glyph metrics record (16 bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(C)]
pub struct EpdGlyph {
    /// Bitmap width in pixels
    pub width: u8,
    /// Bitmap height in pixels
    pub height: u8,
    /// Horizontal advance in pixels
    pub advance_x: u8,
    /// Offset from the pen position to the left edge of the bitmap
    pub left: i16,
    /// Offset from the baseline to the top row of the bitmap
    pub top: i16,
    /// Packed byte count
    pub data_length: u16,
    /// Byte offset into the bitmap vector
    pub data_offset: u32,
}

impl EpdGlyph {
    pub const SIZE: usize = 16;

    /// Write record to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0] = self.width;
        bytes[1] = self.height;
        bytes[2] = self.advance_x;
        bytes[4..6].copy_from_slice(&self.left.to_le_bytes());
        bytes[6..8].copy_from_slice(&self.top.to_le_bytes());
        bytes[8..10].copy_from_slice(&self.data_length.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.data_offset.to_le_bytes());
        bytes
    }

    /// Read record from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            width: bytes[0],
            height: bytes[1],
            advance_x: bytes[2],
            left: i16::from_le_bytes([bytes[4], bytes[5]]),
            top: i16::from_le_bytes([bytes[6], bytes[7]]),
            data_length: u16::from_le_bytes([bytes[8], bytes[9]]),
            data_offset: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
        })
    }

    /// One past the last bitmap byte of this glyph
    pub fn data_end(&self) -> usize {
        self.data_offset as usize + self.data_length as usize
    }
}

/// Inclusive code point interval (12 bytes)
///
/// `offset` is the index of the glyph for `first` in the glyph vector, i.e.
/// the number of code points covered by all preceding intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct EpdUnicodeInterval {
    pub first: u32,
    pub last: u32,
    pub offset: u32,
}

impl EpdUnicodeInterval {
    pub const SIZE: usize = 12;

    pub fn new(first: u32, last: u32, offset: u32) -> Self {
        Self {
            first,
            last,
            offset,
        }
    }

    /// Number of code points covered
    pub fn len(&self) -> u32 {
        self.last - self.first + 1
    }

    pub fn contains(&self, code_point: u32) -> bool {
        (self.first..=self.last).contains(&code_point)
    }

    /// Write record to bytes
    pub fn to_bytes(&self) -> [u8; Self::SIZE] {
        let mut bytes = [0u8; Self::SIZE];
        bytes[0..4].copy_from_slice(&self.first.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.last.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.offset.to_le_bytes());
        bytes
    }

    /// Read record from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < Self::SIZE {
            return None;
        }
        Some(Self {
            first: u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
            last: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            offset: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_sizes() {
        assert_eq!(EpdFontHeader::SIZE, 28);
        assert_eq!(EpdGlyph::SIZE, 16);
        assert_eq!(EpdUnicodeInterval::SIZE, 12);
        assert_eq!(align_section(EpdFontHeader::SIZE), EpdFontHeader::SIZE);
    }

    #[test]
    fn test_header_layout() {
        let header = EpdFontHeader {
            bitmap_offset: 28,
            glyphs_offset: 0x40,
            intervals_offset: 0x1234,
            advance_y: 31,
            ascender: 24,
            descender: -7,
            is_2bit: true,
        };
        let bytes = header.to_bytes();
        assert_eq!(&bytes[0..4], &[28, 0, 0, 0]);
        assert_eq!(&bytes[8..12], &[0x34, 0x12, 0, 0]);
        assert_eq!(bytes[12], 31);
        assert_eq!(&bytes[13..16], &[0, 0, 0]);
        assert_eq!(&bytes[20..24], &(-7i32).to_le_bytes());
        assert_eq!(bytes[0x18], 1);

        assert_eq!(EpdFontHeader::from_bytes(&bytes), Some(header));
    }

    #[test]
    fn test_header_rejects_bad_bool() {
        let mut bytes = EpdFontHeader {
            bitmap_offset: 28,
            glyphs_offset: 32,
            intervals_offset: 36,
            advance_y: 0,
            ascender: 0,
            descender: 0,
            is_2bit: false,
        }
        .to_bytes();
        bytes[EpdFontHeader::IS_2BIT_POS] = 2;
        assert!(EpdFontHeader::from_bytes(&bytes).is_none());
        assert!(EpdFontHeader::from_bytes(&bytes[..27]).is_none());
    }

    #[test]
    fn test_glyph_negative_bearings() {
        let glyph = EpdGlyph {
            width: 9,
            height: 14,
            advance_x: 10,
            left: -1,
            top: -3,
            data_length: 16,
            data_offset: 70000,
        };
        let bytes = glyph.to_bytes();
        assert_eq!(&bytes[4..6], &[0xFF, 0xFF]);
        assert_eq!(bytes[3], 0);
        assert_eq!(EpdGlyph::from_bytes(&bytes), Some(glyph));
        assert_eq!(glyph.data_end(), 70016);
    }

    #[test]
    fn test_interval_len_and_contains() {
        let interval = EpdUnicodeInterval::new(0x41, 0x5A, 3);
        assert_eq!(interval.len(), 26);
        assert!(interval.contains(0x41));
        assert!(interval.contains(0x5A));
        assert!(!interval.contains(0x5B));
        assert!(EpdUnicodeInterval::from_bytes(&[0; 11]).is_none());
    }

    #[test]
    fn test_bit_depth_packed_len() {
        assert_eq!(BitDepth::One.packed_len(3, 1), 1);
        assert_eq!(BitDepth::One.packed_len(8, 2), 2);
        assert_eq!(BitDepth::One.packed_len(9, 1), 2);
        assert_eq!(BitDepth::Two.packed_len(3, 3), 3);
        assert_eq!(BitDepth::Two.packed_len(0, 5), 0);
    }

    #[test]
    fn test_unpack_pixel_msb_first() {
        assert_eq!(BitDepth::One.unpack_pixel(&[0x80], 0), Some(1));
        assert_eq!(BitDepth::One.unpack_pixel(&[0x80], 1), Some(0));
        assert_eq!(BitDepth::One.unpack_pixel(&[0x80], 8), None);
        // 0b11_10_01_00
        let packed = [0xE4];
        assert_eq!(BitDepth::Two.unpack_pixel(&packed, 0), Some(3));
        assert_eq!(BitDepth::Two.unpack_pixel(&packed, 1), Some(2));
        assert_eq!(BitDepth::Two.unpack_pixel(&packed, 2), Some(1));
        assert_eq!(BitDepth::Two.unpack_pixel(&packed, 3), Some(0));
    }
}
