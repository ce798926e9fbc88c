//! Document-to-archive conversion.

use std::time::Instant;

use cueframe_common::CueframeResult;
use cueframe_subtitle_model::{load_cues, Cue};

use crate::archive::ArchiveBuilder;
use crate::rasterize::{rasterize_cue, RasterFailure, RenderContext};

/// Result of converting one document.
#[derive(Debug)]
pub struct Conversion {
    /// ZIP bytes.
    pub archive: Vec<u8>,
    /// Entry names in archive order.
    pub rendered: Vec<String>,
    /// Cues that produced no frame.
    pub skipped: Vec<RasterFailure>,
    /// Number of cues in the document.
    pub total: usize,
}

/// Decode, parse, render every cue and package the frames.
pub fn convert_document(
    bytes: &[u8],
    file_name: Option<&str>,
    ctx: &RenderContext,
) -> CueframeResult<Conversion> {
    let cues = load_cues(bytes, file_name)?;
    convert_cues(&cues, ctx)
}

/// Render already-parsed cues in order. A cue that fails is recorded and
/// skipped; only an archive with no entries at all is an error.
pub fn convert_cues(cues: &[Cue], ctx: &RenderContext) -> CueframeResult<Conversion> {
    let started = Instant::now();
    let mut archive = ArchiveBuilder::new();
    let mut rendered = Vec::new();
    let mut skipped = Vec::new();

    for cue in cues {
        match rasterize_cue(cue, ctx) {
            Ok(artifact) => {
                archive.add(&artifact)?;
                rendered.push(artifact.filename);
            }
            Err(failure) => {
                if failure.is_empty_cue() {
                    tracing::debug!(cue = failure.cue_index, "Skipping cue without text");
                } else {
                    tracing::warn!(cue = failure.cue_index, error = %failure.kind, "Skipping cue");
                }
                skipped.push(failure);
            }
        }
    }

    let total = cues.len();
    let archive = archive.finish(total)?;

    tracing::info!(
        total,
        rendered = rendered.len(),
        skipped = skipped.len(),
        archive_bytes = archive.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Converted subtitles"
    );

    Ok(Conversion {
        archive,
        rendered,
        skipped,
        total,
    })
}
