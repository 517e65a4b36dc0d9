//! Session error types.

use thiserror::Error;
use univent_client::RequestError;
use univent_store::CredentialError;

/// Errors surfaced by [`crate::SessionManager`] operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The underlying request failed
    #[error(transparent)]
    Request(#[from] RequestError),

    /// Credentials could not be persisted or read
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Server answered 2xx but reported `success: false`
    #[error("rejected by server: {message}")]
    Rejected {
        /// Server supplied reason
        message: String,
    },

    /// Response should have carried a user and did not
    #[error("response carried no user")]
    MissingUser,

    /// Auth response did not include both tokens
    #[error("response carried no credentials")]
    MissingCredentials,
}

impl SessionError {
    /// Whether the failure was an authorization failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_unauthorized())
    }
}
