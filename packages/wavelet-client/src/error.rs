//! Typed errors for the Wavelet Agent client.

use thiserror::Error;

/// Errors returned by [`WaveletClient`](crate::WaveletClient) calls.
#[derive(Debug, Error)]
pub enum WaveletError {
    /// Transport-level failure (connect, timeout, TLS, body read).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("Wavelet Agent returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Client construction failed (missing environment, bad base URL).
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, WaveletError>;
