//! Error types for the Quill gateway

use thiserror::Error;

/// Result type alias for Quill operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in the Quill gateway
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Audio decode or playback error
    #[error("audio error: {0}")]
    Audio(String),

    /// Drawing surface error
    #[error("canvas error: {0}")]
    Canvas(String),

    /// Remote inference error (upstream status, missing result)
    #[error("gateway error: {0}")]
    Gateway(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Base64 payload error
    #[error("base64 error: {0}")]
    Base64(#[from] base64::DecodeError),
}
