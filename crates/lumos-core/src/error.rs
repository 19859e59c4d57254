//! Error types for lumos value types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the core value types
#[derive(Debug, Error)]
pub enum CoreError {
    /// Channel selector outside red/green/blue/alpha
    #[error("Unsupported channel: {0}")]
    UnsupportedChannel(String),

    /// Output buffer cannot hold the requested samples
    #[error("Buffer too small: need {needed} elements, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    /// Histograms with different bin counts cannot be added
    #[error("Addition of incompatible histograms: {left} bins vs {right} bins")]
    IncompatibleHistograms { left: usize, right: usize },

    /// Input file does not exist
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Malformed JSON input
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for CoreError {
    fn from(e: serde_json::Error) -> Self {
        CoreError::Parse(e.to_string())
    }
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
