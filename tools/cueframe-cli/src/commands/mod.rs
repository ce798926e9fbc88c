pub mod check;
pub mod convert;
pub mod inspect;
pub mod render;

use std::path::PathBuf;

use clap::Args;
use cueframe_common::{AppConfig, BaseDirection, HorizontalAlign, OutputFormat, VerticalAnchor};
use cueframe_render_engine::font::{resolve_font, resolve_font_with};
use cueframe_render_engine::RenderContext;

/// Render settings that override the config file for one invocation.
#[derive(Args, Debug, Default, Clone)]
pub struct RenderArgs {
    /// Artifact format: tiff|png
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Vertical anchor: bottom|center
    #[arg(long)]
    pub anchor: Option<VerticalAnchor>,

    /// Horizontal alignment: per_line|shared_block
    #[arg(long)]
    pub align: Option<HorizontalAlign>,

    /// Paragraph direction: auto|ltr|rtl
    #[arg(long)]
    pub direction: Option<BaseDirection>,

    /// Keep at most this many lines per cue
    #[arg(long)]
    pub max_lines: Option<usize>,

    /// Canvas width
    #[arg(long)]
    pub width: Option<u32>,

    /// Canvas height
    #[arg(long)]
    pub height: Option<u32>,

    /// Font size in pixels
    #[arg(long)]
    pub font_size: Option<f32>,

    /// Font file tried before every configured candidate
    #[arg(long)]
    pub font: Option<PathBuf>,
}

impl RenderArgs {
    /// Fold the overrides into `config`.
    pub fn apply(&self, config: &mut AppConfig) {
        let render = &mut config.render;
        if let Some(format) = self.format {
            render.format = format;
        }
        if let Some(anchor) = self.anchor {
            render.anchor = anchor;
        }
        if let Some(align) = self.align {
            render.align = align;
        }
        if let Some(direction) = self.direction {
            render.direction = direction;
        }
        if self.max_lines.is_some() {
            render.max_lines = self.max_lines;
        }
        if let Some(width) = self.width {
            render.width = width;
        }
        if let Some(height) = self.height {
            render.height = height;
        }
        if let Some(size) = self.font_size {
            render.font_size = size;
        }
    }
}

/// Apply overrides, resolve the font, and build the render context.
pub fn build_context(mut config: AppConfig, args: &RenderArgs) -> anyhow::Result<RenderContext> {
    args.apply(&mut config);
    config
        .validate()
        .map_err(|e| anyhow::anyhow!("Invalid render settings: {e}"))?;

    let size = config.render.font_size;
    let font = match &args.font {
        Some(path) => resolve_font_with(&config.font, size, Some(path.as_path()))?,
        None => resolve_font(&config.font, size)?,
    };
    if font.is_builtin() {
        eprintln!("warning: no usable font found, text will render as boxes (see `cueframe check`)");
    }

    Ok(RenderContext::new(config.render, font)?)
}
