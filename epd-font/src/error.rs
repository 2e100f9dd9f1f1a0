//! Errors raised while decoding or validating a font blob.

/// Error type for `.epd_fb` decoding and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// A section runs past the end of the buffer
    #[error("{section} at offset {offset} needs {needed} bytes, only {available} available")]
    Truncated {
        section: &'static str,
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// The `is_2bit` header byte is neither 0 nor 1
    #[error("invalid is_2bit byte {0:#04x} (must be 0 or 1)")]
    InvalidBool(u8),

    /// Glyph/interval/bitmap tables disagree with each other
    #[error("encoding invariant violated: {0}")]
    Invariant(String),
}
