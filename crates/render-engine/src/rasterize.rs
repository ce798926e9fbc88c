//! Rendering one cue into one encoded frame.
//!
//! Failures here are scoped to a single cue. The pipeline records them and
//! moves on to the next cue.

use std::fmt;

use cueframe_common::{AppConfig, CueframeResult, RenderConfig};
use cueframe_subtitle_model::Cue;
use image::RgbImage;

use crate::canvas::{encode_image, Canvas};
use crate::font::{resolve_font, DrawError, FontSource, GlyphFace, MeasureError, ResolvedFont};
use crate::layout::{layout_block, select_lines};
use crate::shaping::{Shaper, ShapingError};

/// Everything needed to render cues, built once at startup.
pub struct RenderContext {
    config: RenderConfig,
    font: ResolvedFont,
    shaper: Shaper,
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("config", &self.config)
            .field("font", &self.font.source)
            .finish()
    }
}

impl RenderContext {
    pub fn new(config: RenderConfig, font: ResolvedFont) -> CueframeResult<Self> {
        config.validate()?;
        let shaper = Shaper::new(config.direction);
        Ok(Self {
            config,
            font,
            shaper,
        })
    }

    /// Resolve the font from `config.font` and build the context.
    pub fn from_app_config(config: &AppConfig) -> CueframeResult<Self> {
        config.render.validate()?;
        let font = resolve_font(&config.font, config.render.font_size)?;
        Self::new(config.render.clone(), font)
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn face(&self) -> &dyn GlyphFace {
        self.font.face.as_ref()
    }

    pub fn font_source(&self) -> &FontSource {
        &self.font.source
    }
}

/// One encoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterArtifact {
    pub cue_index: usize,
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Why a cue produced no frame.
#[derive(Debug, thiserror::Error)]
pub enum RasterFailureKind {
    #[error("no renderable text")]
    NoRenderableContent,

    #[error("shaping line {line} failed: {source}")]
    Shaping { line: usize, source: ShapingError },

    #[error("measuring line {line} failed: {source}")]
    Measurement { line: usize, source: MeasureError },

    #[error("drawing line {line} failed: {source}")]
    Draw { line: usize, source: DrawError },

    #[error("encoding failed: {message}")]
    Encode { message: String },

    #[error("naming failed: {message}")]
    Naming { message: String },
}

#[derive(Debug, thiserror::Error)]
#[error("cue {cue_index}: {kind}")]
pub struct RasterFailure {
    pub cue_index: usize,
    pub kind: RasterFailureKind,
}

impl RasterFailure {
    /// True when the cue was skipped for having no text rather than failing.
    pub fn is_empty_cue(&self) -> bool {
        matches!(self.kind, RasterFailureKind::NoRenderableContent)
    }
}

/// Shape, lay out and draw `lines` onto a fresh canvas.
///
/// `lines` must already be non-blank; an empty slice renders nothing and
/// reports [`RasterFailureKind::NoRenderableContent`].
pub fn render_lines(lines: &[&str], ctx: &RenderContext) -> Result<RgbImage, RasterFailureKind> {
    if lines.is_empty() {
        return Err(RasterFailureKind::NoRenderableContent);
    }

    let shaped = lines
        .iter()
        .enumerate()
        .map(|(line, text)| {
            ctx.shaper
                .shape(text)
                .map_err(|source| RasterFailureKind::Shaping { line, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let config = ctx.config();
    let instructions = layout_block(&shaped, ctx.face(), config)
        .map_err(|(line, source)| RasterFailureKind::Measurement { line, source })?;

    let mut canvas = Canvas::new(
        config.width,
        config.height,
        config.background,
        config.foreground,
    );
    for (line, instruction) in instructions.iter().enumerate() {
        canvas
            .draw_line(ctx.face(), instruction)
            .map_err(|source| RasterFailureKind::Draw { line, source })?;
    }
    Ok(canvas.into_image())
}

/// Render a single cue into an encoded artifact named after its index.
pub fn rasterize_cue(cue: &Cue, ctx: &RenderContext) -> Result<RasterArtifact, RasterFailure> {
    let fail = |kind| RasterFailure {
        cue_index: cue.index,
        kind,
    };

    let config = ctx.config();
    let lines = select_lines(cue, config.max_lines);
    let image = render_lines(&lines, ctx).map_err(fail)?;

    let filename = config.artifact_name(cue.index).map_err(|e| {
        fail(RasterFailureKind::Naming {
            message: e.to_string(),
        })
    })?;
    let bytes = encode_image(&image, config.format).map_err(|e| {
        fail(RasterFailureKind::Encode {
            message: e.to_string(),
        })
    })?;

    tracing::trace!(cue = cue.index, %filename, bytes = bytes.len(), "Rasterized cue");
    Ok(RasterArtifact {
        cue_index: cue.index,
        filename,
        bytes,
    })
}
