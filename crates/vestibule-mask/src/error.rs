//! Masking errors.

use thiserror::Error;

/// Error raised while masking a buffer.
#[derive(Debug, Error)]
pub enum MaskError {
    /// The buffer is not valid JSON.
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The masked document could not be written back.
    #[error("failed to write masked JSON: {0}")]
    Write(#[source] serde_json::Error),
}
