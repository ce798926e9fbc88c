//! Font faces and startup-time font resolution.
//!
//! One face at one pixel size is resolved when the process starts and used
//! for every cue afterwards. Measuring and drawing both go through the same
//! [`GlyphFace`] so layout never drifts from what ends up on the canvas.

use std::fmt;
use std::path::{Path, PathBuf};

use cueframe_common::{CueframeError, CueframeResult, FontConfig};
use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use rusttype::{point, Font, Scale, VMetrics};

/// Environment variable naming a font file to try before the configured candidates.
pub const FONT_ENV_VAR: &str = "CUEFRAME_FONT";

/// Horizontal extent of a laid-out string, relative to its pen origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TextExtent {
    /// Pen advance after the last glyph.
    pub advance: f32,
    /// Left edge of the inked pixels.
    pub ink_left: f32,
    /// Right edge (exclusive) of the inked pixels.
    pub ink_right: f32,
}

impl TextExtent {
    pub fn ink_width(&self) -> f32 {
        (self.ink_right - self.ink_left).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MeasureError {
    #[error("face {face:?} has no glyph for {ch:?}")]
    MissingGlyph { ch: char, face: String },

    #[error("extent of {text:?} is not finite")]
    NonFinite { text: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrawError {
    #[error("draw origin ({x}, {y}) is not finite")]
    NonFiniteOrigin { x: f32, y: f32 },
}

/// A font face fixed at one pixel size.
pub trait GlyphFace: Send + Sync + fmt::Debug {
    /// Human-readable face name.
    fn name(&self) -> &str;

    /// Distance from the top of a line box to the baseline.
    fn ascent(&self) -> f32;

    /// Whether the face has a real glyph for `ch`.
    fn covers(&self, ch: char) -> bool;

    /// Measure `text` laid out from a pen origin of `(0, 0)`.
    fn measure(&self, text: &str) -> Result<TextExtent, MeasureError>;

    /// Draw `text` with the pen at `x` and the line box top at `y`.
    fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        x: f32,
        y: f32,
        color: Rgb<u8>,
    ) -> Result<(), DrawError>;
}

/// Characters that take no space and are never drawn.
pub fn is_invisible(ch: char) -> bool {
    matches!(
        ch,
        '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2069}' | '\u{FEFF}'
    )
}

/// TrueType/OpenType outline face rendered with anti-aliasing.
pub struct OutlineFace {
    name: String,
    font: Font<'static>,
    scale: Scale,
    v_metrics: VMetrics,
}

impl fmt::Debug for OutlineFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineFace")
            .field("name", &self.name)
            .field("size", &self.scale.y)
            .finish()
    }
}

impl OutlineFace {
    /// Parse font bytes. Returns `None` if they are not a usable font.
    pub fn from_bytes(name: impl Into<String>, bytes: Vec<u8>, size_px: f32) -> Option<Self> {
        let font = Font::try_from_vec(bytes)?;
        let scale = Scale::uniform(size_px);
        let v_metrics = font.v_metrics(scale);
        Some(Self {
            name: name.into(),
            font,
            scale,
            v_metrics,
        })
    }
}

impl GlyphFace for OutlineFace {
    fn name(&self) -> &str {
        &self.name
    }

    fn ascent(&self) -> f32 {
        self.v_metrics.ascent
    }

    fn covers(&self, ch: char) -> bool {
        self.font.glyph(ch).id().0 != 0
    }

    fn measure(&self, text: &str) -> Result<TextExtent, MeasureError> {
        let glyphs: Vec<_> = self.font.layout(text, self.scale, point(0.0, 0.0)).collect();

        let advance = glyphs
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0);

        let mut ink_left = f32::INFINITY;
        let mut ink_right = f32::NEG_INFINITY;
        for bb in glyphs.iter().filter_map(|g| g.pixel_bounding_box()) {
            ink_left = ink_left.min(bb.min.x as f32);
            ink_right = ink_right.max(bb.max.x as f32);
        }
        if ink_left > ink_right {
            // Nothing inked: fall back to the pen box.
            ink_left = 0.0;
            ink_right = advance;
        }

        if !(advance.is_finite() && ink_left.is_finite() && ink_right.is_finite()) {
            return Err(MeasureError::NonFinite {
                text: text.to_string(),
            });
        }
        Ok(TextExtent {
            advance,
            ink_left,
            ink_right,
        })
    }

    fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        x: f32,
        y: f32,
        color: Rgb<u8>,
    ) -> Result<(), DrawError> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(DrawError::NonFiniteOrigin { x, y });
        }

        let (width, height) = canvas.dimensions();
        let baseline = y + self.v_metrics.ascent;

        for glyph in self.font.layout(text, self.scale, point(x, baseline)) {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            glyph.draw(|gx, gy, coverage| {
                let px = gx as i32 + bb.min.x;
                let py = gy as i32 + bb.min.y;
                if px < 0 || py < 0 || px as u32 >= width || py as u32 >= height {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                blend(pixel, color, coverage);
            });
        }
        Ok(())
    }
}

fn blend(dst: &mut Rgb<u8>, src: Rgb<u8>, coverage: f32) {
    let a = coverage.clamp(0.0, 1.0);
    for (d, s) in dst.0.iter_mut().zip(src.0) {
        *d = (*d as f32 * (1.0 - a) + s as f32 * a).round() as u8;
    }
}

/// Built-in face of hollow boxes, one per visible character.
///
/// Used when no outline font can be loaded. The output is legible only as
/// layout, which is why resolving to it logs a warning.
#[derive(Debug, Clone)]
pub struct TofuFace {
    size: f32,
    advance: u32,
    box_height: u32,
}

impl TofuFace {
    pub fn new(size_px: f32) -> Self {
        Self {
            size: size_px,
            advance: ((size_px * 0.6).round() as u32).max(3),
            box_height: ((size_px * 0.7).round() as u32).max(1),
        }
    }

    fn char_advance(&self, ch: char) -> u32 {
        if is_invisible(ch) {
            0
        } else {
            self.advance
        }
    }
}

impl GlyphFace for TofuFace {
    fn name(&self) -> &str {
        "builtin-tofu"
    }

    fn ascent(&self) -> f32 {
        (self.size * 0.8).round()
    }

    fn covers(&self, ch: char) -> bool {
        !ch.is_control()
    }

    fn measure(&self, text: &str) -> Result<TextExtent, MeasureError> {
        let mut pen = 0u32;
        let mut ink: Option<(u32, u32)> = None;
        for ch in text.chars() {
            let advance = self.char_advance(ch);
            if advance > 0 && !ch.is_whitespace() {
                let left = pen + 1;
                let right = pen + advance - 1;
                ink = Some(match ink {
                    Some((l, _)) => (l, right),
                    None => (left, right),
                });
            }
            pen += advance;
        }

        let (ink_left, ink_right) = ink.unwrap_or((0, pen));
        Ok(TextExtent {
            advance: pen as f32,
            ink_left: ink_left as f32,
            ink_right: ink_right as f32,
        })
    }

    fn draw(
        &self,
        canvas: &mut RgbImage,
        text: &str,
        x: f32,
        y: f32,
        color: Rgb<u8>,
    ) -> Result<(), DrawError> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(DrawError::NonFiniteOrigin { x, y });
        }

        let top = (y + self.ascent()).round() as i32 - self.box_height as i32;
        let mut pen = x.round() as i32;
        for ch in text.chars() {
            let advance = self.char_advance(ch);
            if advance > 0 && !ch.is_whitespace() {
                let rect = Rect::at(pen + 1, top).of_size(advance - 2, self.box_height);
                draw_hollow_rect_mut(canvas, rect, color);
            }
            pen += advance as i32;
        }
        Ok(())
    }
}

/// Where the resolved face came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSource {
    File(PathBuf),
    Builtin,
}

impl fmt::Display for FontSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Builtin => write!(f, "built-in fallback"),
        }
    }
}

/// The face used for every cue for the lifetime of the process.
#[derive(Debug)]
pub struct ResolvedFont {
    pub face: Box<dyn GlyphFace>,
    pub source: FontSource,
}

impl ResolvedFont {
    /// The built-in box face.
    pub fn builtin(size_px: f32) -> Self {
        Self {
            face: Box::new(TofuFace::new(size_px)),
            source: FontSource::Builtin,
        }
    }

    pub fn is_builtin(&self) -> bool {
        self.source == FontSource::Builtin
    }
}

/// Resolve the face, honouring the `CUEFRAME_FONT` override.
pub fn resolve_font(config: &FontConfig, size_px: f32) -> CueframeResult<ResolvedFont> {
    let preferred = std::env::var_os(FONT_ENV_VAR).map(PathBuf::from);
    resolve_font_with(config, size_px, preferred.as_deref())
}

/// Resolve the face from an explicit preferred path plus the configured candidates.
pub fn resolve_font_with(
    config: &FontConfig,
    size_px: f32,
    preferred: Option<&Path>,
) -> CueframeResult<ResolvedFont> {
    let candidates = preferred
        .into_iter()
        .chain(config.candidates.iter().map(PathBuf::as_path));

    let mut tried = Vec::new();
    for candidate in candidates {
        for path in candidate_locations(candidate, &config.search_dirs) {
            tried.push(path.display().to_string());
            if let Some(face) = load_outline_face(&path, size_px) {
                tracing::info!(font = %path.display(), size = size_px, "Resolved font");
                return Ok(ResolvedFont {
                    face: Box::new(face),
                    source: FontSource::File(path),
                });
            }
        }
    }

    if config.builtin_fallback {
        tracing::warn!(
            tried = tried.len(),
            "No font candidate could be loaded; using the built-in box face, rendered text will not be legible"
        );
        return Ok(ResolvedFont::builtin(size_px));
    }

    Err(CueframeError::font_load(format!(
        "none of {} font location(s) could be loaded: {}",
        tried.len(),
        tried.join(", ")
    )))
}

/// Bare names are looked up in the working directory, then each search dir.
fn candidate_locations(candidate: &Path, search_dirs: &[PathBuf]) -> Vec<PathBuf> {
    let is_bare = !candidate.is_absolute() && candidate.components().count() == 1;
    let mut locations = vec![candidate.to_path_buf()];
    if is_bare {
        locations.extend(search_dirs.iter().map(|dir| dir.join(candidate)));
    }
    locations
}

fn load_outline_face(path: &Path, size_px: f32) -> Option<OutlineFace> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::trace!(font = %path.display(), error = %e, "Font candidate not readable");
            return None;
        }
    };

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("font")
        .to_string();
    let face = OutlineFace::from_bytes(name, bytes, size_px);
    if face.is_none() {
        tracing::debug!(font = %path.display(), "Font candidate is not a usable font file");
    }
    face
}
