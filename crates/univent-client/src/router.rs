//! Service name to base address resolution.

use std::collections::BTreeMap;

use reqwest::Url;

use crate::RouterError;

/// Names of the services the client talks to.
pub mod services {
    /// Authentication and profile endpoints
    pub const AUTH: &str = "auth";
    /// Event catalogue and registrations
    pub const EVENTS: &str = "events";
    /// Announcements feed
    pub const ANNOUNCEMENTS: &str = "announcements";
    /// Scores and rankings
    pub const LEADERBOARD: &str = "leaderboard";
    /// User administration (served by the auth backend)
    pub const ADMIN: &str = "admin";
}

/// Built-in routing table for a local deployment.
const DEFAULT_SERVICES: [(&str, &str); 5] = [
    (services::AUTH, "http://localhost:8001/api"),
    (services::EVENTS, "http://localhost:8002/api"),
    (services::ANNOUNCEMENTS, "http://localhost:8003/api"),
    (services::LEADERBOARD, "http://localhost:8004/api"),
    (services::ADMIN, "http://localhost:8001/api"),
];

/// One backend service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Logical name used in [`crate::RequestSpec::service`]
    pub name: String,
    /// Absolute URL every request path is appended to
    pub base_address: String,
}

impl ServiceDescriptor {
    /// Create a descriptor.
    pub fn new(name: impl Into<String>, base_address: impl Into<String>) -> Self {
        Self { name: name.into(), base_address: base_address.into() }
    }
}

/// Read-only table mapping service names to base addresses.
///
/// Two names may share an address (`admin` and `auth` do by default). A name
/// that is not in the table never falls back to another service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceRouter {
    services: BTreeMap<String, String>,
}

impl ServiceRouter {
    /// Build a router, validating every address.
    ///
    /// # Errors
    ///
    /// - `RouterError::InvalidAddress` if an address is not an absolute http
    ///   or https URL
    /// - `RouterError::DuplicateService` if a name appears twice
    pub fn new(
        descriptors: impl IntoIterator<Item = ServiceDescriptor>,
    ) -> Result<Self, RouterError> {
        let mut services = BTreeMap::new();

        for ServiceDescriptor { name, base_address } in descriptors {
            validate(&name, &base_address)?;
            if services.contains_key(&name) {
                return Err(RouterError::DuplicateService(name));
            }
            services.insert(name, base_address);
        }

        Ok(Self { services })
    }

    /// Base address of `service`, or `None` if it is not configured.
    pub fn resolve(&self, service: &str) -> Option<&str> {
        self.services.get(service).map(String::as_str)
    }

    /// Full URL for `path` on `service`.
    ///
    /// Plain concatenation: the base address's own path (`/api`) is kept and
    /// `path` is expected to start with `/`.
    pub fn url(&self, service: &str, path: &str) -> Option<String> {
        self.resolve(service).map(|base| format!("{base}{path}"))
    }

    /// Router with `name` pointing at `address`, replacing any existing entry.
    ///
    /// # Errors
    ///
    /// Returns `RouterError::InvalidAddress` if `address` is not an absolute
    /// http or https URL.
    pub fn with_service(
        mut self,
        name: impl Into<String>,
        address: impl Into<String>,
    ) -> Result<Self, RouterError> {
        let name = name.into();
        let address = address.into();
        validate(&name, &address)?;
        self.services.insert(name, address);
        Ok(self)
    }

    /// Configured services, ordered by name.
    pub fn descriptors(&self) -> impl Iterator<Item = ServiceDescriptor> + '_ {
        self.services.iter().map(|(name, address)| ServiceDescriptor::new(name, address))
    }
}

impl Default for ServiceRouter {
    fn default() -> Self {
        let services = DEFAULT_SERVICES
            .iter()
            .map(|(name, address)| ((*name).to_string(), (*address).to_string()))
            .collect();
        Self { services }
    }
}

fn validate(service: &str, address: &str) -> Result<(), RouterError> {
    let invalid = || RouterError::InvalidAddress {
        service: service.to_string(),
        address: address.to_string(),
    };

    let url = Url::parse(address).map_err(|_| invalid())?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(invalid());
    }
    Ok(())
}
