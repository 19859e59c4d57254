//! Bus errors

use crate::serialization::CodecError;
use thiserror::Error;

/// Errors raised by publishers and subscribers
#[derive(Debug, Error)]
pub enum BusError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Connection closed")]
    Closed,

    #[error("Maximum subscribers reached: {0}")]
    MaxSubscribers(usize),
}

/// Result type for bus operations
pub type Result<T> = std::result::Result<T, BusError>;
