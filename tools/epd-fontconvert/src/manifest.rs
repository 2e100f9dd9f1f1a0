//! Batch manifest parsing and build orchestration
//!
//! Parses a fonts.toml with one `[[font]]` table per output file:
//!
//! ```toml
//! output_dir = "build/fonts"
//!
//! [[font]]
//! name = "Bookerly_12"
//! size = 12
//! font_stack = ["Bookerly-Regular.ttf", "NotoSans-Regular.ttf"]
//! two_bit = true
//! additional_intervals = ["0x2010,0x2027"]
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use epd_font::BitDepth;

use crate::convert::{ConvertOptions, ConvertSummary, convert_font};
use crate::intervals::CodePointRange;

/// Root manifest structure
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Where outputs go, relative to the manifest
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default, rename = "font")]
    pub fonts: Vec<FontEntry>,
    /// Directory relative paths are resolved against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

#[derive(Debug, Deserialize)]
pub struct FontEntry {
    pub name: String,
    pub size: u32,
    pub font_stack: Vec<PathBuf>,
    /// Output file, relative to `output_dir` (default `<name>.epd_fb`)
    #[serde(default)]
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub two_bit: bool,
    /// `"first,last"` strings
    #[serde(default)]
    pub additional_intervals: Vec<String>,
}

/// Load and parse a manifest file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest: {:?}", path))?;
    let mut manifest =
        parse(&content).with_context(|| format!("Failed to parse manifest: {:?}", path))?;
    manifest.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(manifest)
}

/// Parse manifest text; relative paths resolve against the working directory
pub fn parse(content: &str) -> Result<Manifest> {
    let manifest: Manifest = toml::from_str(content)?;
    Ok(manifest)
}

impl Manifest {
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir.join(&self.output_dir)
    }

    /// Resolve one entry into conversion options
    pub fn to_options(&self, entry: &FontEntry, preview: bool) -> Result<ConvertOptions> {
        let additional_intervals = entry
            .additional_intervals
            .iter()
            .map(|s| s.parse::<CodePointRange>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Font '{}' has an invalid interval", entry.name))?;

        if entry.font_stack.is_empty() {
            anyhow::bail!("Font '{}' has an empty font_stack", entry.name);
        }

        let output_dir = self.output_dir();
        let output = match &entry.output {
            Some(path) => output_dir.join(path),
            None => output_dir.join(format!("{}.{}", entry.name, epd_font::EPD_FONT_EXT)),
        };

        Ok(ConvertOptions {
            name: entry.name.clone(),
            size: entry.size,
            font_stack: entry
                .font_stack
                .iter()
                .map(|p| self.base_dir.join(p))
                .collect(),
            output: Some(output),
            bit_depth: BitDepth::from_is_2bit(entry.two_bit),
            additional_intervals,
            preview,
        })
    }
}

/// Check every entry resolves and its fonts exist, without rendering
pub fn validate(manifest: &Manifest) -> Result<()> {
    for entry in &manifest.fonts {
        let options = manifest.to_options(entry, false)?;
        for path in &options.font_stack {
            if !path.exists() {
                anyhow::bail!("Font '{}' source not found: {:?}", entry.name, path);
            }
        }
    }
    Ok(())
}

/// Build every font in the manifest
pub fn build_all(manifest: &Manifest, preview: bool) -> Result<Vec<ConvertSummary>> {
    // Resolve everything up front so a bad entry fails before any rendering
    let all_options = manifest
        .fonts
        .iter()
        .map(|entry| manifest.to_options(entry, preview))
        .collect::<Result<Vec<_>>>()?;

    let output_dir = manifest.output_dir();
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let mut summaries = Vec::with_capacity(all_options.len());
    for options in &all_options {
        tracing::info!("Converting font: {} -> {:?}", options.name, options.output_path());
        let summary = convert_font(options)
            .with_context(|| format!("Failed to convert font '{}'", options.name))?;
        summaries.push(summary);
    }
    Ok(summaries)
}
