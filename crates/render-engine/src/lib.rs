//! Cueframe Render Engine
//!
//! Turns parsed cues into one encoded image per cue and packs them into a
//! ZIP archive.
//!
//! # Pipeline Architecture
//!
//! ```text
//! bytes ── decode ── parse ──┐
//!                            ▼
//!                  for each cue, in order:
//!                    select non-blank lines
//!                            │
//!                    reshape + bidi reorder
//!                            │
//!                    measure + place block
//!                            │
//!                    draw onto canvas
//!                            │
//!                    encode (TIFF/LZW or PNG)
//!                            │
//!                            ▼
//!                    ZIP entry  (or skip, recorded)
//! ```
//!
//! The font and the render settings are resolved once into a
//! [`RenderContext`] and shared read-only by every conversion.

pub mod archive;
pub mod canvas;
pub mod font;
pub mod layout;
pub mod pipeline;
pub mod rasterize;
pub mod shaping;

pub use archive::{build_archive, ArchiveBuilder};
pub use font::{resolve_font, FontSource, GlyphFace, ResolvedFont};
pub use pipeline::{convert_cues, convert_document, Conversion};
pub use rasterize::{
    rasterize_cue, render_lines, RasterArtifact, RasterFailure, RasterFailureKind, RenderContext,
};
