//! Per-call request description.

use std::fmt;

use serde::Serialize;

use crate::RequestError;

/// HTTP verbs used by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read
    Get,
    /// Create or trigger
    Post,
    /// Replace or partially update
    Put,
    /// Remove
    Delete,
}

impl Method {
    /// Upper-case wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What to send, consumed once by [`crate::Dispatcher`].
///
/// Requests require a bearer credential unless [`RequestSpec::public`] is
/// called.
///
/// ```
/// use univent_client::{Method, RequestSpec, services};
///
/// let spec = RequestSpec::get(services::LEADERBOARD, "/leaderboard/top")
///     .query([("limit", "10")])
///     .public();
///
/// assert_eq!(spec.method, Method::Get);
/// assert_eq!(spec.path, "/leaderboard/top?limit=10");
/// assert!(!spec.requires_auth);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct RequestSpec {
    /// Logical service name, resolved through the router
    pub service: String,
    /// Path appended to the service's base address
    pub path: String,
    /// HTTP verb
    pub method: Method,
    /// Serialized JSON body
    pub body: Option<Vec<u8>>,
    /// Attach `Authorization: Bearer <access token>`
    pub requires_auth: bool,
}

impl RequestSpec {
    /// Authorized, body-less request.
    pub fn new(service: impl Into<String>, method: Method, path: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            path: path.into(),
            method,
            body: None,
            requires_auth: true,
        }
    }

    /// `GET` request.
    pub fn get(service: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(service, Method::Get, path)
    }

    /// `POST` request.
    pub fn post(service: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(service, Method::Post, path)
    }

    /// `PUT` request.
    pub fn put(service: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(service, Method::Put, path)
    }

    /// `DELETE` request.
    pub fn delete(service: impl Into<String>, path: impl Into<String>) -> Self {
        Self::new(service, Method::Delete, path)
    }

    /// Send without a bearer credential.
    #[must_use]
    pub fn public(mut self) -> Self {
        self.requires_auth = false;
        self
    }

    /// Attach `body` serialized as JSON.
    ///
    /// # Errors
    ///
    /// Returns `RequestError::Encoding` if `body` cannot be serialized.
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, RequestError> {
        let bytes = serde_json::to_vec(body).map_err(|e| RequestError::Encoding(e.to_string()))?;
        self.body = Some(bytes);
        Ok(self)
    }

    /// Append percent-encoded query parameters to the path.
    #[must_use]
    pub fn query<K, V>(mut self, pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in pairs {
            let separator = if self.path.contains('?') { '&' } else { '?' };
            self.path.push(separator);
            self.path.push_str(&urlencoding::encode(key.as_ref()));
            self.path.push('=');
            self.path.push_str(&urlencoding::encode(value.as_ref()));
        }
        self
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Bodies carry passwords and profile data: only the size is shown.
        f.debug_struct("RequestSpec")
            .field("service", &self.service)
            .field("path", &self.path)
            .field("method", &self.method)
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .field("requires_auth", &self.requires_auth)
            .finish()
    }
}
