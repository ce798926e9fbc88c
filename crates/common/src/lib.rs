//! Cueframe Common Utilities
//!
//! Shared infrastructure for all Cueframe crates:
//! - Error taxonomy and result aliases
//! - Configuration loading (render policy, fonts, server, logging)
//! - Tracing/logging initialization

pub mod config;
pub mod error;
pub mod logging;

pub use config::*;
pub use error::*;
