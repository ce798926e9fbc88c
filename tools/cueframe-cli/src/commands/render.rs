//! Render ad-hoc text to a single preview image.

use std::path::PathBuf;

use cueframe_common::AppConfig;
use cueframe_render_engine::canvas::encode_image;
use cueframe_render_engine::render_lines;

use super::{build_context, RenderArgs};

pub fn run(
    config: AppConfig,
    text: String,
    output: Option<PathBuf>,
    render: RenderArgs,
) -> anyhow::Result<()> {
    let ctx = build_context(config, &render)?;
    let format = ctx.config().format;

    let lines = split_preview_lines(&text);
    if lines.is_empty() {
        return Err(anyhow::anyhow!("Nothing to render: text has no visible lines"));
    }

    let image = render_lines(&lines, &ctx)?;
    let bytes = encode_image(&image, format)?;

    let output_path =
        output.unwrap_or_else(|| PathBuf::from(format!("preview.{}", format.extension())));
    std::fs::write(&output_path, bytes)
        .map_err(|e| anyhow::anyhow!("Failed to write {}: {e}", output_path.display()))?;

    println!(
        "Rendered {} line(s) with {} to {}",
        lines.len(),
        ctx.font_source(),
        output_path.display()
    );
    Ok(())
}

/// Split on real newlines and on a typed `\n`, dropping blank lines.
fn split_preview_lines(text: &str) -> Vec<&str> {
    text.lines()
        .flat_map(|line| line.split("\\n"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect()
}
