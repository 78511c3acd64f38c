//! Error types for opswatch-cli

use thiserror::Error;

/// Result type alias for CLI commands
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can end a CLI command
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from the HTTP client, poller or configuration
    #[error(transparent)]
    Client(#[from] opswatch_client::Error),

    /// Login, logout or identity probe failed
    #[error("Identity error: {0}")]
    Auth(#[from] opswatch_auth::AuthError),

    /// Snapshot could not be rendered
    #[error(transparent)]
    Core(#[from] opswatch_core::Error),

    /// Output could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The status topic closed before enough snapshots arrived
    #[error("Status feed ended after {received} of {expected} snapshots")]
    FeedClosed {
        /// Snapshots printed
        received: usize,
        /// Snapshots requested
        expected: usize,
    },
}
