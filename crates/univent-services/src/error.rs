//! Service error types.

use thiserror::Error;
use univent_client::RequestError;

/// Errors surfaced by the domain services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The underlying request failed
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The current user may not perform this operation; nothing was sent
    #[error("not permitted: {operation}")]
    NotPermitted {
        /// Operation that was refused
        operation: &'static str,
    },

    /// Server answered 2xx but reported `success: false`
    #[error("rejected by server: {message}")]
    Rejected {
        /// Server supplied reason
        message: String,
    },
}

impl ServiceError {
    /// Whether the failure was an authorization failure from the request
    /// layer.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_unauthorized())
    }
}
