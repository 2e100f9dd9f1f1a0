//! Font conversion pipeline
//!
//! Resolves intervals against the font stack, rasterizes and packs every
//! covered code point, then encodes and writes the verified blob.

use std::io::Write;
use std::path::{Path, PathBuf};

use epd_font::{BitDepth, EPD_FONT_EXT, FontAsset};

use crate::encoder::{FontAssetBuilder, GlyphProps, encode_verified};
use crate::error::ConvertError;
use crate::glyph_source::{FACE_METRICS_CODE_POINT, FontFace, FontStack, GlyphSource};
use crate::intervals::{CodePointRange, DEFAULT_INTERVALS, resolve_intervals};
use crate::packing::ascii_preview;

/// Resolved settings for one output font
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertOptions {
    /// Output base name
    pub name: String,
    /// Point size, rendered at 150 DPI
    pub size: u32,
    /// Font files, highest priority first
    pub font_stack: Vec<PathBuf>,
    /// Defaults to `<name>.epd_fb` in the working directory
    pub output: Option<PathBuf>,
    pub bit_depth: BitDepth,
    pub additional_intervals: Vec<CodePointRange>,
    /// Log an ASCII rendering of each glyph at debug level
    pub preview: bool,
}

impl ConvertOptions {
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.{}", self.name, EPD_FONT_EXT)))
    }

    /// Default ranges followed by the additional ones
    pub fn declared_intervals(&self) -> Vec<CodePointRange> {
        DEFAULT_INTERVALS
            .iter()
            .chain(&self.additional_intervals)
            .copied()
            .collect()
    }
}

/// Built font with its encoded bytes
#[derive(Debug, Clone)]
pub struct ConvertedFont {
    pub asset: FontAsset,
    /// Glyph records with their code points, in output order
    pub glyphs: Vec<GlyphProps>,
    pub intervals: Vec<CodePointRange>,
    pub bytes: Vec<u8>,
}

/// What was written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertSummary {
    pub output: PathBuf,
    pub glyph_count: usize,
    pub interval_count: usize,
    pub bitmap_bytes: usize,
    pub total_bytes: usize,
    pub bit_depth: BitDepth,
    pub advance_y: u8,
    pub ascender: i32,
    pub descender: i32,
}

/// Rasterize and encode `declared` from `stack`.
///
/// Fails with [`ConvertError::MissingFaceMetrics`] before rendering anything
/// if no source contains '|'.
pub fn build_font<S: GlyphSource>(
    stack: &mut FontStack<S>,
    declared: &[CodePointRange],
    depth: BitDepth,
    preview: bool,
) -> Result<ConvertedFont, ConvertError> {
    if !stack.covers(FACE_METRICS_CODE_POINT) {
        return Err(ConvertError::MissingFaceMetrics);
    }

    let intervals = resolve_intervals(declared, |cp| stack.covers(cp));
    let mut builder = FontAssetBuilder::new(depth);

    for code_point in intervals.iter().flat_map(CodePointRange::code_points) {
        let rendered = stack.rasterize(code_point).ok_or_else(|| {
            ConvertError::invariant(format!(
                "code point {code_point:#x} is covered but failed to render"
            ))
        })?;
        let props = builder.push_glyph(code_point, &rendered)?;

        if preview {
            let (width, height) = (rendered.bitmap.width(), rendered.bitmap.height());
            for line in ascii_preview(builder.glyph_data(&props), width, height, depth) {
                tracing::debug!("{:#06x} |{}|", code_point, line);
            }
        }
    }

    // Render '|' last so the face metrics come from a face with a reliable descender
    stack
        .rasterize(FACE_METRICS_CODE_POINT)
        .ok_or(ConvertError::MissingFaceMetrics)?;
    let face = stack
        .face_metrics()
        .ok_or(ConvertError::MissingFaceMetrics)?;

    let (asset, glyphs) = builder.finish(&intervals, &face)?;
    let bytes = encode_verified(&asset)?;

    Ok(ConvertedFont {
        asset,
        glyphs,
        intervals,
        bytes,
    })
}

/// Load the font stack from disk, build the font and write it
pub fn convert_font(options: &ConvertOptions) -> Result<ConvertSummary, ConvertError> {
    let faces = options
        .font_stack
        .iter()
        .map(|path| FontFace::load(path))
        .collect::<Result<Vec<_>, _>>()?;
    let mut stack = FontStack::new(faces, options.size)?;

    tracing::info!(
        "Rendering {} at {}pt ({:.1}px, {}) from {} font(s)",
        options.name,
        options.size,
        stack.pixel_size(),
        options.bit_depth,
        stack.sources().len()
    );

    let converted = build_font(
        &mut stack,
        &options.declared_intervals(),
        options.bit_depth,
        options.preview,
    )?;
    log_tables(&converted);

    let output = options.output_path();
    write_output(&output, &converted.bytes)?;

    let summary = ConvertSummary {
        output,
        glyph_count: converted.asset.glyphs.len(),
        interval_count: converted.asset.intervals.len(),
        bitmap_bytes: converted.asset.bitmap.len(),
        total_bytes: converted.bytes.len(),
        bit_depth: converted.asset.bit_depth(),
        advance_y: converted.asset.advance_y,
        ascender: converted.asset.ascender,
        descender: converted.asset.descender,
    };
    log_summary(&summary);
    Ok(summary)
}

fn log_tables(converted: &ConvertedFont) {
    for props in &converted.glyphs {
        let g = &props.glyph;
        tracing::info!(
            "glyph {:#06x}: {}x{} advance={} left={} top={} len={} offset={}",
            props.code_point,
            g.width,
            g.height,
            g.advance_x,
            g.left,
            g.top,
            g.data_length,
            g.data_offset
        );
    }
    for interval in &converted.asset.intervals {
        tracing::info!(
            "interval {:#06x}..={:#06x} offset={}",
            interval.first,
            interval.last,
            interval.offset
        );
    }
}

fn log_summary(summary: &ConvertSummary) {
    tracing::info!(
        "Wrote {}: {} glyphs, {} intervals, {} bitmap bytes, {} bytes total",
        summary.output.display(),
        summary.glyph_count,
        summary.interval_count,
        summary.bitmap_bytes,
        summary.total_bytes
    );
    tracing::info!(
        "  {}, advance_y={} ascender={} descender={}",
        summary.bit_depth,
        summary.advance_y,
        summary.ascender,
        summary.descender
    );
}

/// Write `bytes` to `path` through a temp file in the same directory.
///
/// `path` is only replaced once every byte has been written.
pub fn write_output(path: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let io_err = |source| ConvertError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
    file.write_all(bytes).map_err(io_err)?;
    file.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
