//! Cueframe Subtitle Model
//!
//! Turns uploaded subtitle bytes into an ordered list of [`Cue`]s:
//! - **Decoding:** UTF-8 with an optional byte-order mark
//! - **SRT:** SubRip blocks, with inline formatting tags stripped
//! - **ASS/SSA:** `Dialogue:` events, with override blocks stripped
//!
//! Timestamps are kept on each cue as identifiers only; nothing downstream
//! uses them for layout.

pub mod ass;
pub mod cue;
pub mod decode;
pub mod format;
pub mod srt;

pub use cue::*;
pub use decode::*;
pub use format::*;
