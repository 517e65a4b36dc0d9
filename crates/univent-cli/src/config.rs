//! Client configuration.

use std::{path::PathBuf, time::Duration};

use univent_client::{RouterError, ServiceRouter};

/// Default location of the credential database.
pub const DEFAULT_STORE_PATH: &str = "univent-credentials.redb";

/// Runtime configuration of the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Credential database path
    pub store_path: PathBuf,
    /// Service routing table
    pub router: ServiceRouter,
    /// Per-request timeout. `None` keeps the HTTP client's default.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            router: ServiceRouter::default(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Point each named service at a new base address.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::InvalidAddress` for the first address that is
    /// not an absolute http(s) URL.
    pub fn with_overrides(
        mut self,
        overrides: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self, RouterError> {
        for (name, address) in overrides {
            self.router = self.router.with_service(name, address)?;
        }
        Ok(self)
    }
}

/// Parse a `name=url` service override.
///
/// # Errors
///
/// Returns a message if there is no `=` or either side is empty.
pub fn parse_service_override(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, address)) if !name.trim().is_empty() && !address.trim().is_empty() => {
            Ok((name.trim().to_string(), address.trim().to_string()))
        },
        _ => Err(format!("expected NAME=URL, got {raw:?}")),
    }
}
