//! Bit-depth packing
//!
//! 8-bit coverage is first reduced to a 4-bit intermediate (two pixels per
//! byte, rows padded to a byte), then thresholded to 1-bit or quantized to
//! 2-bit and packed MSB-first across the whole bitmap with no row padding.

use epd_font::BitDepth;

use crate::glyph_source::RawBitmap;

/// 4-bit greyscale bitmap. Low nibble holds even x, high nibble odd x; each
/// row occupies `ceil(width / 2)` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nibbles {
    width: usize,
    height: usize,
    pitch: usize,
    data: Vec<u8>,
}

impl Nibbles {
    pub fn from_bitmap(bitmap: &RawBitmap) -> Self {
        let width = bitmap.width();
        let height = bitmap.height();
        let pitch = width.div_ceil(2);
        let mut data = Vec::with_capacity(pitch * height);

        for y in 0..height {
            for pair in bitmap.row(y).chunks(2) {
                let low = pair[0] >> 4;
                let high = pair.get(1).map_or(0, |v| v >> 4);
                data.push(low | (high << 4));
            }
        }

        Self {
            width,
            height,
            pitch,
            data,
        }
    }

    pub fn pitch(&self) -> usize {
        self.pitch
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// 4-bit value at (`x`, `y`)
    pub fn get(&self, x: usize, y: usize) -> u8 {
        let byte = self.data[y * self.pitch + x / 2];
        (byte >> ((x % 2) * 4)) & 0xF
    }
}

/// 1-bit threshold: any nibble value of 2 or more is black
pub fn threshold_1bit(nibble: u8) -> u8 {
    u8::from(nibble & 0xE != 0)
}

/// 2-bit quantization: 0-3 white, 4-7 light grey, 8-11 dark grey, 12-15 black
pub fn quantize_2bit(nibble: u8) -> u8 {
    match nibble {
        12.. => 3,
        8.. => 2,
        4.. => 1,
        _ => 0,
    }
}

/// MSB-first bit accumulator that flushes a byte every 8 bits
struct BitPacker {
    bits_per_pixel: u32,
    acc: u8,
    filled: u32,
    out: Vec<u8>,
}

impl BitPacker {
    fn new(depth: BitDepth, pixel_count: usize) -> Self {
        Self {
            bits_per_pixel: depth.bits_per_pixel(),
            acc: 0,
            filled: 0,
            out: Vec::with_capacity(pixel_count.div_ceil(depth.pixels_per_byte())),
        }
    }

    fn push(&mut self, value: u8) {
        self.acc = (self.acc << self.bits_per_pixel) | value;
        self.filled += self.bits_per_pixel;
        if self.filled == 8 {
            self.out.push(self.acc);
            self.acc = 0;
            self.filled = 0;
        }
    }

    /// Flush a trailing partial byte, remaining low bits zero
    fn finish(mut self) -> Vec<u8> {
        if self.filled > 0 {
            self.out.push(self.acc << (8 - self.filled));
        }
        self.out
    }
}

/// Pack one glyph bitmap; returns exactly `depth.packed_len(w, h)` bytes
pub fn pack_glyph(bitmap: &RawBitmap, depth: BitDepth) -> Vec<u8> {
    let nibbles = Nibbles::from_bitmap(bitmap);
    let mut packer = BitPacker::new(depth, bitmap.width() * bitmap.height());

    for y in 0..nibbles.height {
        for x in 0..nibbles.width {
            let nibble = nibbles.get(x, y);
            packer.push(match depth {
                BitDepth::One => threshold_1bit(nibble),
                BitDepth::Two => quantize_2bit(nibble),
            });
        }
    }

    packer.finish()
}

/// Text rendering of packed pixels, `#` for ink and `.` for paper
pub fn ascii_preview(packed: &[u8], width: usize, height: usize, depth: BitDepth) -> Vec<String> {
    (0..height)
        .map(|y| {
            (0..width)
                .map(|x| match depth.unpack_pixel(packed, y * width + x) {
                    Some(v) if v > 0 => '#',
                    _ => '.',
                })
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bitmap(width: usize, height: usize, pixels: &[u8]) -> RawBitmap {
        RawBitmap::from_rows(width, height, pixels.to_vec()).unwrap()
    }

    #[test]
    fn test_nibbles_odd_width_rows_padded() {
        // 3x2: each row takes 2 bytes, the second holding only a low nibble
        let nibbles = Nibbles::from_bitmap(&bitmap(3, 2, &[0xF0, 0x10, 0xA5, 0x00, 0x20, 0x3F]));
        assert_eq!(nibbles.pitch(), 2);
        assert_eq!(nibbles.data(), &[0x1F, 0x0A, 0x20, 0x03]);
        assert_eq!(nibbles.get(0, 0), 0xF);
        assert_eq!(nibbles.get(1, 0), 0x1);
        assert_eq!(nibbles.get(2, 0), 0xA);
        assert_eq!(nibbles.get(2, 1), 0x3);
    }

    #[test]
    fn test_nibbles_ignore_source_pitch_padding() {
        let padded = RawBitmap::new(2, 2, 4, vec![0xFF, 0x00, 0xAA, 0xAA, 0x00, 0xFF, 0xAA, 0xAA])
            .unwrap();
        let nibbles = Nibbles::from_bitmap(&padded);
        assert_eq!(nibbles.data(), &[0x0F, 0xF0]);
    }

    #[test]
    fn test_1bit_example() {
        // nibbles F,0,F -> black, white, black -> 0b101 << 5
        let packed = pack_glyph(&bitmap(3, 1, &[0xF0, 0x00, 0xFF]), BitDepth::One);
        assert_eq!(packed, vec![0xA0]);

        let packed = pack_glyph(&bitmap(3, 1, &[0xF0, 0x00, 0x00]), BitDepth::One);
        assert_eq!(packed, vec![0x80]);
    }

    #[test]
    fn test_1bit_threshold_boundary() {
        assert_eq!(threshold_1bit(0), 0);
        assert_eq!(threshold_1bit(1), 0);
        assert_eq!(threshold_1bit(2), 1);
        assert_eq!(threshold_1bit(3), 1);
        assert_eq!(threshold_1bit(4), 1);
        assert_eq!(threshold_1bit(15), 1);
        // raw 0x1F -> nibble 1 (white), raw 0x20 -> nibble 2 (black)
        assert_eq!(pack_glyph(&bitmap(2, 1, &[0x1F, 0x20]), BitDepth::One), vec![0x40]);
    }

    #[test]
    fn test_2bit_threshold_boundaries() {
        assert_eq!(quantize_2bit(3), 0);
        assert_eq!(quantize_2bit(4), 1);
        assert_eq!(quantize_2bit(7), 1);
        assert_eq!(quantize_2bit(8), 2);
        assert_eq!(quantize_2bit(11), 2);
        assert_eq!(quantize_2bit(12), 3);
        assert_eq!(quantize_2bit(15), 3);
    }

    #[test]
    fn test_nibble_four_is_light_grey_and_black() {
        let four = bitmap(1, 1, &[0x40]);
        assert_eq!(pack_glyph(&four, BitDepth::Two), vec![0b01_00_00_00]);
        assert_eq!(pack_glyph(&four, BitDepth::One), vec![0x80]);

        let three = bitmap(1, 1, &[0x3F]);
        assert_eq!(pack_glyph(&three, BitDepth::Two), vec![0]);
        // nibble 3 has bit 1 set, so it still inks in 1-bit mode
        assert_eq!(pack_glyph(&three, BitDepth::One), vec![0x80]);
    }

    #[test]
    fn test_2bit_packs_msb_pair_first() {
        let packed = pack_glyph(&bitmap(4, 1, &[0xFF, 0x80, 0x40, 0x00]), BitDepth::Two);
        assert_eq!(packed, vec![0b11_10_01_00]);
    }

    #[test]
    fn test_rows_pack_contiguously() {
        // 3x3 all black: 9 bits -> 0xFF then 0x80, no per-row padding
        let packed = pack_glyph(&bitmap(3, 3, &[0xFF; 9]), BitDepth::One);
        assert_eq!(packed, vec![0xFF, 0x80]);

        // 3x2 at 2-bit: 6 pixels -> 12 bits
        let packed = pack_glyph(&bitmap(3, 2, &[0xFF; 6]), BitDepth::Two);
        assert_eq!(packed, vec![0xFF, 0xF0]);
    }

    #[test]
    fn test_packed_size_law() {
        for width in 0..12 {
            for height in 0..6 {
                let pixels = vec![0x9C; width * height];
                let raw = bitmap(width, height, &pixels);
                assert_eq!(
                    pack_glyph(&raw, BitDepth::One).len(),
                    (width * height).div_ceil(8),
                    "1-bit {width}x{height}"
                );
                assert_eq!(
                    pack_glyph(&raw, BitDepth::Two).len(),
                    (width * height).div_ceil(4),
                    "2-bit {width}x{height}"
                );
            }
        }
    }

    #[test]
    fn test_packed_pixels_decode_back() {
        let raw = bitmap(5, 3, &[
            0x00, 0x40, 0x80, 0xC0, 0xFF, //
            0x10, 0x3F, 0x7F, 0xBF, 0xF0, //
            0xFF, 0x00, 0xFF, 0x00, 0xFF,
        ]);
        let packed = pack_glyph(&raw, BitDepth::Two);
        let decoded: Vec<u8> = (0..15)
            .map(|i| BitDepth::Two.unpack_pixel(&packed, i).unwrap())
            .collect();
        assert_eq!(decoded, vec![0, 1, 2, 3, 3, 0, 0, 1, 2, 3, 3, 0, 3, 0, 3]);
    }

    #[test]
    fn test_ascii_preview() {
        let packed = pack_glyph(&bitmap(3, 2, &[0xFF, 0x00, 0xFF, 0x00, 0xFF, 0x00]), BitDepth::One);
        assert_eq!(ascii_preview(&packed, 3, 2, BitDepth::One), vec!["#.#", ".#."]);
    }
}
