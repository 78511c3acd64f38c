//! Auth-specific error types.

/// Errors that can occur talking to the identity endpoints.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AuthError {
    /// The request never produced a usable HTTP response.
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server refused the request.
    #[error("rejected by server (HTTP {status})")]
    Rejected {
        /// HTTP status code returned
        status: u16,
    },

    /// The response body could not be understood.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Login was requested but no credentials are configured.
    #[error("no credentials configured for login")]
    MissingCredentials,
}

impl AuthError {
    /// Whether the failure is down to the caller's credentials rather than
    /// the network or the server.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AuthError::Rejected { .. } | AuthError::MissingCredentials
        )
    }
}
