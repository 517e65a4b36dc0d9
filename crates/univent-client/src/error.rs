//! Error types for the request layer.
//!
//! - [`RouterError`]: the routing table itself is malformed
//! - [`TransportError`]: no HTTP response was obtained
//! - [`RequestError`]: anything a single dispatched call can report

use thiserror::Error;
use univent_store::CredentialError;

/// Errors raised while building a [`crate::ServiceRouter`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Base address is not an absolute http(s) URL
    #[error("invalid base address for service {service}: {address}")]
    InvalidAddress {
        /// Service being registered
        service: String,
        /// Offending address
        address: String,
    },

    /// Same service name registered twice
    #[error("service {0} registered more than once")]
    DuplicateService(String),
}

/// Failures below HTTP: nothing came back from the server.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connection could not be established (refused, DNS, TLS)
    #[error("connect failed: {0}")]
    Connect(String),

    /// The exchange did not complete in time
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Any other I/O failure while sending or reading the response
    #[error("transport I/O error: {0}")]
    Io(String),
}

/// Uniform error of every dispatched request.
///
/// Status classification: 401 and 403 are [`RequestError::Unauthorized`],
/// any other non-2xx status is [`RequestError::Rejected`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// Service name is not in the routing table
    #[error("no base address configured for service {service}")]
    InvalidConfiguration {
        /// Name that failed to resolve
        service: String,
    },

    /// No credential stored locally (`status` is `None`), or the server
    /// refused the one that was sent
    #[error("unauthorized{}", .status.map(|s| format!(" (status {s})")).unwrap_or_default())]
    Unauthorized {
        /// HTTP status, when the server answered
        status: Option<u16>,
    },

    /// No response from the server
    #[error("network error: {0}")]
    Network(#[from] TransportError),

    /// Response body did not match the expected shape
    #[error("could not decode {payload_size} byte response: {reason}")]
    Decoding {
        /// Size of the body that failed to decode
        payload_size: usize,
        /// Decoder diagnostic (category and position only)
        reason: String,
    },

    /// Server answered with a non-2xx, non-auth status
    #[error("request rejected with status {status}: {message}")]
    Rejected {
        /// HTTP status
        status: u16,
        /// Server supplied reason, or the canonical status text
        message: String,
    },

    /// Request body could not be serialized
    #[error("could not encode request body: {0}")]
    Encoding(String),

    /// Reading the credential store failed
    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl RequestError {
    /// Whether repeating the same call could succeed.
    ///
    /// Only network failures qualify. Nothing in this crate retries on its
    /// own; the caller decides.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether the call failed because of missing or refused credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// HTTP status, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Unauthorized { status } => *status,
            Self::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_network_errors_are_transient() {
        assert!(RequestError::Network(TransportError::Timeout("slow".into())).is_transient());
        assert!(!RequestError::Unauthorized { status: Some(401) }.is_transient());
        assert!(
            !RequestError::Rejected { status: 503, message: "down".into() }.is_transient()
        );
        assert!(!RequestError::InvalidConfiguration { service: "billing".into() }.is_transient());
    }

    #[test]
    fn status_is_reported_when_server_answered() {
        assert_eq!(RequestError::Unauthorized { status: None }.status(), None);
        assert_eq!(RequestError::Unauthorized { status: Some(403) }.status(), Some(403));
        let rejected = RequestError::Rejected { status: 500, message: String::new() };
        assert_eq!(rejected.status(), Some(500));
        assert_eq!(RequestError::Encoding("bad".into()).status(), None);
    }

    #[test]
    fn unauthorized_display_mentions_status() {
        assert_eq!(RequestError::Unauthorized { status: None }.to_string(), "unauthorized");
        assert_eq!(
            RequestError::Unauthorized { status: Some(401) }.to_string(),
            "unauthorized (status 401)"
        );
    }
}
