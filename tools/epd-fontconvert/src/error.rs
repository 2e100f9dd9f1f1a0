//! Conversion errors
//!
//! Missing glyphs are not errors: they are logged and excluded from the
//! interval being built. Everything here aborts the run.

use std::path::PathBuf;

use epd_font::FormatError;

#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    /// Malformed `first,last` argument
    #[error("invalid interval '{input}': {reason}")]
    InvalidInterval { input: String, reason: String },

    #[error("code point {0:#x} is outside the Unicode range (max 0x10ffff)")]
    CodePointOutOfRange(u32),

    #[error("font stack is empty")]
    EmptyFontStack,

    /// No font renders '|', which fixes the face-wide metrics
    #[error("no font in the stack contains '|' (U+007C), needed for face metrics")]
    MissingFaceMetrics,

    #[error("failed to access {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font {name}: {message}")]
    FontParse { name: String, message: String },

    /// A glyph metric does not fit its record field (e.g. width > 255)
    #[error("glyph {code_point:#x}: {field} = {value} does not fit the glyph record")]
    FieldOverflow {
        code_point: u32,
        field: &'static str,
        value: String,
    },

    #[error("face metric {field} = {value} does not fit the font header")]
    FaceMetricOverflow { field: &'static str, value: String },

    /// Packed data or tables are inconsistent (a bug, never user input)
    #[error(transparent)]
    Invariant(#[from] FormatError),
}

impl ConvertError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::Invariant(FormatError::Invariant(message.into()))
    }
}
