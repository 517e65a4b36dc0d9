//! Credential store error types.
//!
//! - `Io`: the backing database or file could not be read or written
//! - `Unavailable`: the store cannot serve requests at all (poisoned lock,
//!   injected fault)

use thiserror::Error;

/// Errors that can occur during credential store operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// I/O error (file system, database, etc.)
    #[error("credential store I/O error: {0}")]
    Io(String),

    /// Store cannot serve the request.
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

impl From<std::io::Error> for CredentialError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
