//! Error types for whiteboard operations.

use thiserror::Error;

/// Result type for whiteboard operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors that can occur in the whiteboard engine.
#[derive(Debug, Error)]
pub enum BoardError {
    /// An encoded snapshot could not be decoded.
    #[error("Invalid snapshot data: {0}")]
    InvalidSnapshot(String),

    /// The surface could not be encoded as an image.
    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    /// An I/O error occurred in the local fallback cache.
    #[error("Cache I/O error: {0}")]
    Cache(#[from] std::io::Error),
}
