//! Transport trait for abstracting the HTTP exchange.
//!
//! The [`Transport`] trait decouples the dispatcher from a specific HTTP
//! client. Production uses [`ReqwestTransport`]; tests substitute a scripted
//! spy that records every request and never touches the network.

use std::{fmt, future::Future, time::Duration};

use univent_store::Secret;

use crate::{Method, TransportError};

/// Content type of every request body.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// A fully resolved request, ready to go on the wire.
///
/// `Debug` shows neither the bearer token nor the body.
#[derive(Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// HTTP verb
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Access token for the `Authorization` header
    pub bearer: Option<Secret>,
    /// JSON body
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Headers in the order they are sent.
    ///
    /// Always `Content-Type: application/json`, plus `Authorization: Bearer`
    /// when a token is attached.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![("Content-Type", JSON_CONTENT_TYPE.to_string())];
        if let Some(token) = &self.bearer {
            headers.push(("Authorization", format!("Bearer {}", token.expose())));
        }
        headers
    }

    /// Value of the header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<String> {
        self.headers()
            .into_iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value)
    }
}

impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("bearer", &self.bearer.as_ref().map(|_| "<redacted>"))
            .field("body_len", &self.body.as_ref().map(Vec::len))
            .finish()
    }
}

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }

    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Performs one HTTP exchange.
///
/// Implementations must not retry: one call is one request on the wire.
/// Clones share the underlying connection pool (or script, in tests).
pub trait Transport: Clone + Send + Sync + 'static {
    /// Send `request` and return whatever status the server answered with.
    ///
    /// # Errors
    ///
    /// Returns a `TransportError` only if no response was received.
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Production transport over `reqwest` with rustls.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Transport with reqwest's default timeouts.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Io` if the TLS backend cannot be initialized.
    pub fn new() -> Result<Self, TransportError> {
        Self::from_builder(reqwest::Client::builder())
    }

    /// Transport that gives up on a request after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Io` if the TLS backend cannot be initialized.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Self::from_builder(reqwest::Client::builder().timeout(timeout))
    }

    fn from_builder(builder: reqwest::ClientBuilder) -> Result<Self, TransportError> {
        let client = builder.build().map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in request.headers() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(classify)?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

fn classify(err: reqwest::Error) -> TransportError {
    // reqwest errors can embed the URL, never headers or bodies
    let err = err.without_url();
    if err.is_timeout() {
        TransportError::Timeout(err.to_string())
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Io(err.to_string())
    }
}
