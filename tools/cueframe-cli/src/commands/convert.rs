//! Convert a subtitle file into a ZIP of frames.

use std::path::{Path, PathBuf};

use cueframe_common::AppConfig;
use cueframe_render_engine::convert_document;

use super::{build_context, RenderArgs};

pub fn run(
    config: AppConfig,
    input: PathBuf,
    output: Option<PathBuf>,
    render: RenderArgs,
) -> anyhow::Result<()> {
    let ctx = build_context(config, &render)?;
    let format = ctx.config().format;

    println!("Converting: {}", input.display());

    let bytes = std::fs::read(&input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;
    let file_name = input.file_name().and_then(|n| n.to_str());
    tracing::debug!(bytes = bytes.len(), font = %ctx.font_source(), "Loaded input");

    let conversion = convert_document(&bytes, file_name, &ctx)
        .map_err(|e| anyhow::anyhow!("Conversion failed: {e}"))?;

    let output_path = output.unwrap_or_else(|| default_output(&input, format.extension()));
    std::fs::write(&output_path, &conversion.archive)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output_path.display()))?;

    println!("  Font: {}", ctx.font_source());
    println!(
        "  Canvas: {}x{} ({})",
        ctx.config().width,
        ctx.config().height,
        format.extension()
    );
    println!(
        "  Cues: {} total, {} rendered, {} skipped",
        conversion.total,
        conversion.rendered.len(),
        conversion.skipped.len()
    );
    for failure in &conversion.skipped {
        println!("    skipped {failure}");
    }
    println!(
        "Archive written: {} ({} bytes)",
        output_path.display(),
        conversion.archive.len()
    );

    Ok(())
}

/// `subtitles_<ext>.zip` next to the input file.
fn default_output(input: &Path, extension: &str) -> PathBuf {
    input.with_file_name(format!("subtitles_{extension}.zip"))
}
