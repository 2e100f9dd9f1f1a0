//! Style families of `.epd_fb` fonts
//!
//! Groups up to four faces of one typeface. Only the regular face is
//! required; a style without its own face renders with the regular one.

use crate::formats::{BitDepth, EpdGlyph};
use crate::view::FontView;

/// Face selector within a [`EpdFontFamily`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum Style {
    #[default]
    Regular = 0,
    Bold = 1,
    Italic = 2,
    BoldItalic = 3,
}

impl Style {
    pub const ALL: [Style; 4] = [Style::Regular, Style::Bold, Style::Italic, Style::BoldItalic];

    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }
}

/// Regular face plus optional bold, italic and bold-italic faces.
#[derive(Debug, Clone, Copy)]
pub struct EpdFontFamily<'a> {
    regular: FontView<'a>,
    bold: Option<FontView<'a>>,
    italic: Option<FontView<'a>>,
    bold_italic: Option<FontView<'a>>,
}

impl<'a> EpdFontFamily<'a> {
    pub fn new(regular: FontView<'a>) -> Self {
        Self {
            regular,
            bold: None,
            italic: None,
            bold_italic: None,
        }
    }

    pub fn with_bold(mut self, font: FontView<'a>) -> Self {
        self.bold = Some(font);
        self
    }

    pub fn with_italic(mut self, font: FontView<'a>) -> Self {
        self.italic = Some(font);
        self
    }

    pub fn with_bold_italic(mut self, font: FontView<'a>) -> Self {
        self.bold_italic = Some(font);
        self
    }

    /// Whether `style` has a face of its own
    pub fn has_style(&self, style: Style) -> bool {
        match style {
            Style::Regular => true,
            Style::Bold => self.bold.is_some(),
            Style::Italic => self.italic.is_some(),
            Style::BoldItalic => self.bold_italic.is_some(),
        }
    }

    /// Face used for `style`, the regular face if it has none
    pub fn font(&self, style: Style) -> &FontView<'a> {
        let face = match style {
            Style::Regular => None,
            Style::Bold => self.bold.as_ref(),
            Style::Italic => self.italic.as_ref(),
            Style::BoldItalic => self.bold_italic.as_ref(),
        };
        face.unwrap_or(&self.regular)
    }

    pub fn ascender(&self, style: Style) -> i32 {
        self.font(style).ascender()
    }

    pub fn descender(&self, style: Style) -> i32 {
        self.font(style).descender()
    }

    pub fn line_height(&self, style: Style) -> u8 {
        self.font(style).advance_y()
    }

    pub fn bit_depth(&self, style: Style) -> BitDepth {
        self.font(style).bit_depth()
    }

    pub fn bitmap(&self, style: Style) -> &'a [u8] {
        self.font(style).bitmap()
    }

    pub fn find_glyph(&self, code_point: u32, style: Style) -> Option<EpdGlyph> {
        self.font(style).find_glyph(code_point)
    }

    pub fn text_dimensions(&self, text: &str, style: Style) -> (i32, i32) {
        self.font(style).text_dimensions(text)
    }

    pub fn has_printable_chars(&self, text: &str, style: Style) -> bool {
        self.font(style).has_printable_chars(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::FontAsset;
    use crate::formats::EpdUnicodeInterval;

    /// One solid glyph for 'A', `width` pixels wide, with distinct metrics
    fn face(width: u8, line_height: u8, is_2bit: bool) -> Vec<u8> {
        let depth = BitDepth::from_is_2bit(is_2bit);
        let len = depth.packed_len(usize::from(width), 2);
        FontAsset {
            bitmap: vec![0xFF; len],
            glyphs: vec![EpdGlyph {
                width,
                height: 2,
                advance_x: width + 1,
                left: 0,
                top: 2,
                data_length: len as u16,
                data_offset: 0,
            }],
            intervals: vec![EpdUnicodeInterval::new('A' as u32, 'A' as u32, 0)],
            advance_y: line_height,
            ascender: i32::from(line_height) - 2,
            descender: -2,
            is_2bit,
        }
        .encode()
    }

    #[test]
    fn test_missing_styles_fall_back_to_regular() {
        let regular = face(3, 10, false);
        let family = EpdFontFamily::new(FontView::parse(&regular).unwrap());

        for style in Style::ALL {
            assert_eq!(family.has_style(style), style == Style::Regular);
            assert_eq!(family.line_height(style), 10);
            assert_eq!(family.ascender(style), 8);
            assert_eq!(family.descender(style), -2);
            assert_eq!(family.bit_depth(style), BitDepth::One);
            assert_eq!(family.find_glyph('A' as u32, style).unwrap().width, 3);
            assert_eq!(family.text_dimensions("A", style), (3, 2));
        }
    }

    #[test]
    fn test_styles_use_their_own_face() {
        let regular = face(3, 10, false);
        let bold = face(5, 12, true);
        let italic = face(4, 11, false);
        let family = EpdFontFamily::new(FontView::parse(&regular).unwrap())
            .with_bold(FontView::parse(&bold).unwrap())
            .with_italic(FontView::parse(&italic).unwrap());

        assert_eq!(family.line_height(Style::Bold), 12);
        assert_eq!(family.bit_depth(Style::Bold), BitDepth::Two);
        assert_eq!(family.find_glyph('A' as u32, Style::Bold).unwrap().width, 5);
        assert_eq!(family.bitmap(Style::Bold).len(), 3);
        assert_eq!(family.text_dimensions("A", Style::Italic), (4, 2));

        // no bold-italic face
        assert!(!family.has_style(Style::BoldItalic));
        assert_eq!(family.line_height(Style::BoldItalic), 10);
        assert_eq!(family.bit_depth(Style::BoldItalic), BitDepth::One);
    }

    #[test]
    fn test_missing_glyph_in_styled_face() {
        let regular = face(3, 10, false);
        let family = EpdFontFamily::new(FontView::parse(&regular).unwrap());
        assert!(family.find_glyph('B' as u32, Style::Italic).is_none());
        assert!(family.has_printable_chars("A", Style::BoldItalic));
        assert!(!family.has_printable_chars("B", Style::Bold));
    }

    #[test]
    fn test_style_from_u8() {
        assert_eq!(Style::from_u8(0), Some(Style::Regular));
        assert_eq!(Style::from_u8(3), Some(Style::BoldItalic));
        assert_eq!(Style::from_u8(4), None);
        assert_eq!(Style::default(), Style::Regular);
    }
}
