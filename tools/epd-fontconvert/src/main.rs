//! epd-fontconvert - EPD bitmap font export tool
//!
//! Renders a prioritized stack of TTF/OTF fonts into a packed 1-bit or 2-bit
//! `.epd_fb` font for e-paper displays.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use epd_fontconvert::epd_font::BitDepth;
use epd_fontconvert::{CodePointRange, ConvertOptions, convert_font, manifest};

#[derive(Parser)]
#[command(name = "epd-fontconvert")]
#[command(about = "Convert a font stack to a packed EPD bitmap font")]
#[command(version)]
struct Cli {
    /// Output base name
    #[arg(required_unless_present = "manifest")]
    name: Option<String>,

    /// Font size in points (rendered at 150 DPI)
    #[arg(required_unless_present = "manifest")]
    size: Option<u32>,

    /// Font files, highest priority first
    #[arg(required_unless_present = "manifest", num_args = 1..)]
    fontstack: Vec<PathBuf>,

    /// Output file (default: <name>.epd_fb)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Pack 2 bits per pixel (4 grey levels) instead of 1
    #[arg(long = "2bit")]
    two_bit: bool,

    /// Extra code point range to export, e.g. 0x2010,0x2027 (repeatable)
    #[arg(long, value_name = "FIRST,LAST")]
    additional_intervals: Vec<CodePointRange>,

    /// Log an ASCII preview of every glyph
    #[arg(long)]
    preview: bool,

    /// Build every [[font]] in a TOML manifest instead
    #[arg(
        long,
        conflicts_with_all = ["name", "size", "fontstack", "output", "two_bit", "additional_intervals"]
    )]
    manifest: Option<PathBuf>,

    /// Validate the manifest and its font paths without rendering
    #[arg(long, requires = "manifest")]
    check: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.preview {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()),
        )
        .init();

    if let Some(path) = &cli.manifest {
        if cli.check {
            tracing::info!("Checking manifest {:?}", path);
            let config = manifest::load_manifest(path)?;
            manifest::validate(&config)?;
            tracing::info!("Manifest is valid! {} font(s)", config.fonts.len());
            return Ok(());
        }

        tracing::info!("Building fonts from {:?}", path);
        let config = manifest::load_manifest(path)?;
        let summaries = manifest::build_all(&config, cli.preview)?;
        tracing::info!("Build complete! {} font(s) written", summaries.len());
        return Ok(());
    }

    let options = ConvertOptions {
        name: cli.name.context("missing font name")?,
        size: cli.size.context("missing font size")?,
        font_stack: cli.fontstack,
        output: cli.output,
        bit_depth: BitDepth::from_is_2bit(cli.two_bit),
        additional_intervals: cli.additional_intervals,
        preview: cli.preview,
    };
    convert_font(&options).with_context(|| format!("Failed to convert font '{}'", options.name))?;
    tracing::info!("Done!");

    Ok(())
}
