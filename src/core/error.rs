//! Error types for the procedural geometry crate
//!
//! Sculpting, meshing and simulation never fail: bad coordinates and missing
//! data degrade to no-ops. Only I/O at the edges (field archives, JSON
//! configuration) reports errors.

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}
