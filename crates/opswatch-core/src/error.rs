//! Error types for opswatch-core

use thiserror::Error;

/// Result type alias for opswatch-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in opswatch-core
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The reported build time cannot be represented as an instant.
    #[error("Build time out of range: {seconds}s since epoch")]
    BuildTimeOutOfRange {
        /// Raw epoch seconds from the wire
        seconds: i64,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
