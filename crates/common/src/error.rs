//! Error types shared across Cueframe crates.
//!
//! These are the request-level failures. Failures that only affect a single
//! cue live in the render engine and never escalate unless every cue fails.

use std::path::PathBuf;

/// Top-level error type for Cueframe operations.
#[derive(Debug, thiserror::Error)]
pub enum CueframeError {
    /// Input bytes are not valid UTF-8.
    #[error("Encoding error: {message}")]
    Encoding { message: String },

    /// The document does not follow the subtitle grammar.
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// No font candidate could be loaded.
    #[error("Font load error: {message}")]
    FontLoad { message: String },

    /// Every cue failed or was skipped, so there is nothing to archive.
    #[error("No renderable cues: all {attempted} cue(s) were skipped")]
    EmptyArchive { attempted: usize },

    #[error("Archive error: {message}")]
    Archive { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using CueframeError.
pub type CueframeResult<T> = Result<T, CueframeError>;

impl CueframeError {
    pub fn encoding(msg: impl Into<String>) -> Self {
        Self::Encoding {
            message: msg.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse {
            message: msg.into(),
        }
    }

    pub fn font_load(msg: impl Into<String>) -> Self {
        Self::FontLoad {
            message: msg.into(),
        }
    }

    pub fn archive(msg: impl Into<String>) -> Self {
        Self::Archive {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Whether the error was caused by the uploaded document rather than by
    /// the service itself.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Encoding { .. } | Self::Parse { .. } | Self::EmptyArchive { .. }
        )
    }
}
