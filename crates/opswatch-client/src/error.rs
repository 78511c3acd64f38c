//! Error types for opswatch-client

use std::path::PathBuf;

use opswatch_auth::AuthError;
use thiserror::Error;

/// Result type alias for opswatch-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in opswatch-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from opswatch-core
    #[error("Core error: {0}")]
    Core(#[from] opswatch_core::Error),

    /// Error from the identity endpoints
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("{endpoint} returned HTTP {status}")]
    Status {
        /// Endpoint path that was requested
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// What configuration is problematic
        message: String,
    },

    /// Config file could not be read
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// File that was being read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config file could not be parsed
    #[error("Invalid config file: {0}")]
    Toml(#[from] toml::de::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns whether the failure is transient (worth waiting for the next
    /// poll) rather than a problem with configuration or payloads.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Http(e) => !e.is_decode(),
            Error::Status { status, .. } => *status >= 500,
            Error::Auth(e) => !e.is_client_error(),
            Error::Core(_) | Error::Config { .. } | Error::Io { .. } | Error::Toml(_) => false,
        }
    }
}

impl From<Error> for AuthError {
    fn from(error: Error) -> Self {
        match error {
            Error::Auth(e) => e,
            Error::Status { status, .. } if (400..500).contains(&status) => {
                AuthError::Rejected { status }
            }
            Error::Http(e) if e.is_decode() => AuthError::InvalidResponse(e.to_string()),
            other => AuthError::Transport(other.to_string()),
        }
    }
}
