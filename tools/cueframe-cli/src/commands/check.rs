//! Report the resolved font and the effective configuration.

use std::path::PathBuf;

use cueframe_common::{config_file_path, AppConfig};
use cueframe_render_engine::font::FONT_ENV_VAR;
use cueframe_render_engine::shaping::Shaper;
use cueframe_render_engine::{render_lines, FontSource, RenderContext};

const SAMPLE_LINES: [&str; 2] = ["Hello, world", "مرحبا بالعالم"];

pub fn run(config: AppConfig, explicit: Option<PathBuf>) -> anyhow::Result<()> {
    println!("Cueframe Check");
    println!("{}", "=".repeat(50));

    let config_path = explicit.unwrap_or_else(config_file_path);
    if config_path.exists() {
        println!("[OK] Config file: {}", config_path.display());
    } else {
        println!("[--] Config file: {} (not found, using defaults)", config_path.display());
    }

    if let Some(preferred) = std::env::var_os(FONT_ENV_VAR) {
        println!("[--] {FONT_ENV_VAR}: {}", PathBuf::from(preferred).display());
    }

    let ctx = match RenderContext::from_app_config(&config) {
        Ok(ctx) => ctx,
        Err(e) => {
            println!("[FAIL] Font: {e}");
            return Err(anyhow::anyhow!("Rendering is not available"));
        }
    };

    let face = ctx.face();
    if *ctx.font_source() == FontSource::Builtin {
        println!("[WARN] Font: built-in box face (install one of the candidates below)");
        for candidate in &config.font.candidates {
            println!("       {}", candidate.display());
        }
    } else {
        println!("[OK] Font: {} ({})", face.name(), ctx.font_source());
        // Check the shaped text: Arabic is drawn from presentation forms.
        let shaper = Shaper::new(config.render.direction);
        let mut missing: Vec<char> = Vec::new();
        for line in SAMPLE_LINES {
            let shaped = shaper.shape(line)?;
            missing.extend(
                shaped
                    .visual
                    .chars()
                    .filter(|c| !c.is_whitespace() && !face.covers(*c)),
            );
        }
        if missing.is_empty() {
            println!("[OK] Latin and Arabic glyphs are covered");
        } else {
            println!("[WARN] Missing glyphs: {missing:?}");
        }
    }

    match render_lines(&SAMPLE_LINES, &ctx) {
        Ok(image) => println!("[OK] Sample render: {}x{}", image.width(), image.height()),
        Err(e) => println!("[FAIL] Sample render: {e}"),
    }

    println!();
    println!("Effective configuration:");
    println!("{}", serde_json::to_string_pretty(&config)?);

    Ok(())
}
