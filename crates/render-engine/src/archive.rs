//! In-memory ZIP packaging of rendered frames.

use std::collections::HashSet;
use std::io::{Cursor, Write};

use cueframe_common::{CueframeError, CueframeResult};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::rasterize::RasterArtifact;

/// Accumulates artifacts into a DEFLATE-compressed ZIP held in memory.
pub struct ArchiveBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
    names: HashSet<String>,
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options: SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .unix_permissions(0o644),
            names: HashSet::new(),
        }
    }

    /// Add one artifact. Entry names must be unique.
    pub fn add(&mut self, artifact: &RasterArtifact) -> CueframeResult<()> {
        if !self.names.insert(artifact.filename.clone()) {
            return Err(CueframeError::archive(format!(
                "duplicate entry name {:?} (cue {})",
                artifact.filename, artifact.cue_index
            )));
        }
        self.writer
            .start_file(artifact.filename.as_str(), self.options)
            .map_err(|e| CueframeError::archive(format!("{}: {e}", artifact.filename)))?;
        self.writer.write_all(&artifact.bytes)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Finish the archive. `attempted` is the number of cues tried, used to
    /// report an archive that would otherwise be empty.
    pub fn finish(self, attempted: usize) -> CueframeResult<Vec<u8>> {
        if self.names.is_empty() {
            return Err(CueframeError::EmptyArchive { attempted });
        }
        let cursor = self
            .writer
            .finish()
            .map_err(|e| CueframeError::archive(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}

/// Package artifacts in the order given.
pub fn build_archive(artifacts: &[RasterArtifact]) -> CueframeResult<Vec<u8>> {
    let mut builder = ArchiveBuilder::new();
    for artifact in artifacts {
        builder.add(artifact)?;
    }
    builder.finish(artifacts.len())
}
