//! Format detection and the single parsing entry point.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use cueframe_common::CueframeResult;

use crate::ass::parse_ass;
use crate::cue::{Cue, ParseError};
use crate::decode::decode_document;
use crate::srt::parse_srt;

/// Supported subtitle formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtitleFormat {
    /// SubRip Text (.srt).
    Srt,
    /// SubStation Alpha / Advanced SubStation Alpha (.ssa / .ass).
    Ass,
}

impl fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Srt => write!(f, "srt"),
            Self::Ass => write!(f, "ass"),
        }
    }
}

impl FromStr for SubtitleFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "ass" | "ssa" => Ok(Self::Ass),
            other => Err(format!("unknown subtitle format {other:?} (expected srt or ass)")),
        }
    }
}

/// File extensions accepted for upload.
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["srt", "ass", "ssa"];

impl SubtitleFormat {
    /// Format implied by a file name's extension, if recognised.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = Path::new(name).extension()?.to_str()?;
        ext.parse().ok()
    }

    /// Pick a format from the file name, falling back to sniffing the text.
    pub fn detect(file_name: Option<&str>, text: &str) -> Self {
        if let Some(format) = file_name.and_then(Self::from_file_name) {
            return format;
        }
        let head = text.trim_start();
        if head.starts_with("[Script Info]") || head.starts_with("[Events]") {
            Self::Ass
        } else {
            Self::Srt
        }
    }
}

/// Parse decoded text in the given format.
pub fn parse_document(text: &str, format: SubtitleFormat) -> Result<Vec<Cue>, ParseError> {
    match format {
        SubtitleFormat::Srt => parse_srt(text),
        SubtitleFormat::Ass => parse_ass(text),
    }
}

/// Decode, detect and parse uploaded bytes in one step.
///
/// Decoding failures surface as `CueframeError::Encoding` before any parsing
/// is attempted; grammar failures as `CueframeError::Parse`.
pub fn load_cues(bytes: &[u8], file_name: Option<&str>) -> CueframeResult<Vec<Cue>> {
    let text = decode_document(bytes)?;
    let format = SubtitleFormat::detect(file_name, text);
    let cues = parse_document(text, format)?;
    tracing::debug!(%format, cues = cues.len(), "Parsed subtitle document");
    Ok(cues)
}
