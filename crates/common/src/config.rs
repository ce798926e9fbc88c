//! Application configuration.
//!
//! Configuration is a plain value: it is loaded once at process start,
//! validated, and then passed by reference to whatever needs it.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CueframeError, CueframeResult};

/// An opaque RGB colour.
pub type RgbColor = [u8; 3];

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Per-cue rendering policy.
    pub render: RenderConfig,

    /// Font candidates and fallback behavior.
    pub font: FontConfig,

    /// HTTP service settings.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Where the text block sits vertically on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerticalAnchor {
    /// Block bottom sits `bottom_margin` pixels above the canvas bottom.
    #[default]
    Bottom,
    /// Block is vertically centered.
    Center,
}

/// How lines are centered horizontally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HorizontalAlign {
    /// Every line is centered on its own.
    #[default]
    PerLine,
    /// All lines share the left edge of the centered widest line.
    SharedBlock,
}

/// Paragraph base direction used for bidi resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseDirection {
    /// Taken from the first strong character of each line.
    #[default]
    Auto,
    Ltr,
    Rtl,
}

/// What to do with characters the resolved face has no glyph for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingGlyphPolicy {
    /// Draw the face's fallback glyph.
    #[default]
    Render,
    /// Treat the line as unmeasurable and skip the cue.
    Fail,
}

/// Lossless raster container used for artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// TIFF, RGB8, LZW compressed.
    #[default]
    Tiff,
    /// PNG, deflate compressed.
    Png,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Tiff => "tiff",
            Self::Png => "png",
        }
    }
}

macro_rules! impl_from_str {
    ($ty:ty, $what:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(format!(
                        concat!("unknown ", $what, " {:?} (expected one of: {})"),
                        other,
                        [$($name),+].join(", ")
                    )),
                }
            }
        }
    };
}

impl_from_str!(VerticalAnchor, "anchor", {
    "bottom" => VerticalAnchor::Bottom,
    "center" => VerticalAnchor::Center,
});

impl_from_str!(HorizontalAlign, "alignment", {
    "per_line" => HorizontalAlign::PerLine,
    "shared_block" => HorizontalAlign::SharedBlock,
});

impl_from_str!(BaseDirection, "direction", {
    "auto" => BaseDirection::Auto,
    "ltr" => BaseDirection::Ltr,
    "rtl" => BaseDirection::Rtl,
});

impl_from_str!(OutputFormat, "format", {
    "tiff" => OutputFormat::Tiff,
    "png" => OutputFormat::Png,
});

/// Per-cue rendering policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Canvas width in pixels.
    pub width: u32,
    /// Canvas height in pixels.
    pub height: u32,

    /// Canvas fill colour.
    pub background: RgbColor,
    /// Text colour.
    pub foreground: RgbColor,

    /// Font size in pixels; also the glyph height used for block layout.
    pub font_size: f32,
    /// Extra pixels between consecutive lines.
    pub line_spacing: f32,
    /// Gap below the block, only used with [`VerticalAnchor::Bottom`].
    pub bottom_margin: f32,

    pub anchor: VerticalAnchor,
    pub align: HorizontalAlign,

    /// Keep at most this many non-blank lines per cue. `None` keeps all.
    pub max_lines: Option<usize>,

    pub direction: BaseDirection,
    pub missing_glyphs: MissingGlyphPolicy,

    pub format: OutputFormat,

    /// Artifact name stem; `%d` or `%0Nd` is replaced by the cue index.
    pub filename_pattern: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 480,
            background: [0, 0, 255],
            foreground: [255, 255, 255],
            font_size: 26.0,
            line_spacing: 8.0,
            bottom_margin: 20.0,
            anchor: VerticalAnchor::Bottom,
            align: HorizontalAlign::PerLine,
            max_lines: None,
            direction: BaseDirection::Auto,
            missing_glyphs: MissingGlyphPolicy::Render,
            format: OutputFormat::Tiff,
            filename_pattern: "subtitle_%04d".to_string(),
        }
    }
}

/// Largest canvas edge accepted by [`RenderConfig::validate`].
pub const MAX_CANVAS_EDGE: u32 = 16_384;

/// Widest index field a filename pattern may ask for.
pub const MAX_INDEX_WIDTH: usize = 32;

impl RenderConfig {
    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> CueframeResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(CueframeError::config(format!(
                "canvas must not be empty (got {}x{})",
                self.width, self.height
            )));
        }
        if self.width > MAX_CANVAS_EDGE || self.height > MAX_CANVAS_EDGE {
            return Err(CueframeError::config(format!(
                "canvas {}x{} exceeds the {MAX_CANVAS_EDGE}px limit",
                self.width, self.height
            )));
        }
        if !(self.font_size.is_finite() && self.font_size > 0.0) {
            return Err(CueframeError::config(format!(
                "font_size must be a positive number (got {})",
                self.font_size
            )));
        }
        for (name, value) in [
            ("line_spacing", self.line_spacing),
            ("bottom_margin", self.bottom_margin),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(CueframeError::config(format!(
                    "{name} must be a non-negative number (got {value})"
                )));
            }
        }
        if self.max_lines == Some(0) {
            return Err(CueframeError::config(
                "max_lines must be at least 1 (omit it to keep every line)",
            ));
        }
        format_artifact_stem(&self.filename_pattern, 1)?;
        Ok(())
    }

    /// Full artifact file name for a cue, including the extension.
    pub fn artifact_name(&self, cue_index: usize) -> CueframeResult<String> {
        let stem = format_artifact_stem(&self.filename_pattern, cue_index)?;
        Ok(format!("{stem}.{}", self.format.extension()))
    }

    /// Pixel height taken by one line including the spacing after it.
    pub fn line_height(&self) -> f32 {
        self.font_size + self.line_spacing
    }
}

/// Substitute the cue index into a printf-style pattern.
///
/// Exactly one `%d` / `%Nd` / `%0Nd` placeholder is allowed; `%%` is a
/// literal percent sign. Path separators are rejected since the result
/// becomes an archive entry name.
pub fn format_artifact_stem(pattern: &str, index: usize) -> CueframeResult<String> {
    if pattern.contains(['/', '\\']) {
        return Err(CueframeError::config(format!(
            "filename pattern {pattern:?} must not contain path separators"
        )));
    }

    let mut out = String::with_capacity(pattern.len() + 8);
    let mut placeholders = 0;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        if chars.peek() == Some(&'%') {
            chars.next();
            out.push('%');
            continue;
        }

        let zero_pad = chars.next_if_eq(&'0').is_some();
        let mut digits = String::new();
        while let Some(d) = chars.next_if(char::is_ascii_digit) {
            digits.push(d);
        }
        if chars.next() != Some('d') {
            return Err(CueframeError::config(format!(
                "unsupported placeholder in filename pattern {pattern:?} (use %d or %0Nd)"
            )));
        }
        let width: usize = if digits.is_empty() {
            0
        } else {
            digits.parse().map_err(|_| {
                CueframeError::config(format!("invalid width in filename pattern {pattern:?}"))
            })?
        };
        if width > MAX_INDEX_WIDTH {
            return Err(CueframeError::config(format!(
                "index width {width} in filename pattern {pattern:?} exceeds {MAX_INDEX_WIDTH}"
            )));
        }

        placeholders += 1;
        // Writing to a String cannot fail.
        let _ = if zero_pad {
            write!(out, "{index:0width$}")
        } else {
            write!(out, "{index:width$}")
        };
    }

    if placeholders != 1 {
        return Err(CueframeError::config(format!(
            "filename pattern {pattern:?} must contain exactly one index placeholder, found {placeholders}"
        )));
    }
    if out.trim().is_empty() {
        return Err(CueframeError::config("filename pattern produced an empty name"));
    }
    Ok(out)
}

/// Ordered font candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Tried in order. Bare file names are looked up in the working
    /// directory and then in `search_dirs`.
    pub candidates: Vec<PathBuf>,

    /// Directories searched for bare candidate names.
    pub search_dirs: Vec<PathBuf>,

    /// Fall back to the built-in box face when no candidate loads.
    pub builtin_fallback: bool,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                PathBuf::from("NotoSansArabic-Regular.ttf"),
                PathBuf::from("Arial.ttf"),
                PathBuf::from("DejaVuSans.ttf"),
            ],
            search_dirs: vec![
                PathBuf::from("fonts"),
                PathBuf::from("/usr/share/fonts/truetype/noto"),
                PathBuf::from("/usr/share/fonts/noto"),
                PathBuf::from("/usr/share/fonts/truetype/msttcorefonts"),
                PathBuf::from("/usr/share/fonts/truetype/dejavu"),
                PathBuf::from("/usr/share/fonts/TTF"),
                PathBuf::from("/Library/Fonts"),
                PathBuf::from("/System/Library/Fonts/Supplemental"),
                PathBuf::from("C:\\Windows\\Fonts"),
            ],
            builtin_fallback: true,
        }
    }
}

/// HTTP service settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,

    /// Bind port.
    pub port: u16,

    /// Largest accepted upload body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_upload_bytes: 8 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "cueframe_render_engine=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config.
    ///
    /// An explicit path must exist and parse. Without one, the standard
    /// location is tried and defaults are used if it is missing or broken.
    /// Environment overrides are applied last.
    pub fn load(explicit: Option<&Path>) -> CueframeResult<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::load_standard(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn from_file(path: &Path) -> CueframeResult<Self> {
        if !path.exists() {
            return Err(CueframeError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    fn load_standard() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Apply `PORT`, `CUEFRAME_HOST` and `CUEFRAME_LOG` overrides.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> CueframeResult<()> {
        if let Some(port) = lookup("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| CueframeError::config(format!("invalid PORT value {port:?}")))?;
        }
        if let Some(host) = lookup("CUEFRAME_HOST") {
            self.server.host = host;
        }
        if let Some(level) = lookup("CUEFRAME_LOG") {
            self.logging.level = level;
        }
        Ok(())
    }

    pub fn validate(&self) -> CueframeResult<()> {
        self.render.validate()?;
        if self.server.max_upload_bytes == 0 {
            return Err(CueframeError::config("server.max_upload_bytes must be positive"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("cueframe").join("config.json")
}
