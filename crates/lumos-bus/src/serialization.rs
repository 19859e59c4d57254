//! Message encoding/decoding
//!
//! Messages are JSON encoded and framed with a big-endian length prefix
//! for the TCP stream.

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Largest frame payload accepted from the wire
pub const MAX_FRAME_LEN: usize = 64 * 1024 * 1024;

/// Serialization codec
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Codec {
    /// JSON encoding (human-readable)
    #[default]
    Json,
}

impl Codec {
    /// Encode a message
    pub fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::Json => serde_json::to_vec(value).map_err(|e| CodecError::Encode(e.to_string())),
        }
    }

    /// Decode a message
    pub fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        match self {
            Self::Json => {
                serde_json::from_slice(data).map_err(|e| CodecError::Decode(e.to_string()))
            }
        }
    }
}

/// Codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Encoding failed: {0}")]
    Encode(String),

    #[error("Decoding failed: {0}")]
    Decode(String),

    #[error("Frame of {0} bytes exceeds the {MAX_FRAME_LEN} byte limit")]
    FrameTooLarge(usize),
}

/// Message framing for streaming protocols
///
/// Format: [4 bytes length (big-endian)] [message data]
#[derive(Debug, Clone, Copy, Default)]
pub struct FramedCodec {
    codec: Codec,
}

impl FramedCodec {
    /// Create a new framed codec
    pub fn new(codec: Codec) -> Self {
        Self { codec }
    }

    /// Encode a message with framing
    pub fn encode_framed<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let data = self.codec.encode(value)?;
        if data.len() > MAX_FRAME_LEN {
            return Err(CodecError::FrameTooLarge(data.len()));
        }
        let len = data.len() as u32;

        let mut framed = Vec::with_capacity(4 + data.len());
        framed.extend_from_slice(&len.to_be_bytes());
        framed.extend(data);

        Ok(framed)
    }

    /// Decode a framed message
    ///
    /// Returns (decoded value, bytes consumed) or None if incomplete
    pub fn decode_framed<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<Option<(T, usize)>, CodecError> {
        if data.len() < 4 {
            return Ok(None);
        }

        let len = u32::from_be_bytes([data[0], data[1], data[2], data[3]]) as usize;
        if len > MAX_FRAME_LEN {
            return Err(CodecError::FrameTooLarge(len));
        }

        if data.len() < 4 + len {
            return Ok(None);
        }

        let value = self.codec.decode(&data[4..4 + len])?;
        Ok(Some((value, 4 + len)))
    }
}
