//! Request dispatch: resolve, authorize, send once, classify, decode.
//!
//! Dispatch is split in two halves. [`Dispatcher::prepare`] does everything
//! that needs local state (routing table, credential store) and performs no
//! I/O. [`Dispatcher::send`] performs exactly one network exchange and turns
//! the response into a typed value or a [`RequestError`]. A prepared request
//! owns its credential, so it can be sent after the store has been cleared.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};
use univent_proto::ErrorResponse;
use univent_store::{ACCESS_TOKEN, CredentialStore};

use crate::{HttpRequest, HttpResponse, RequestError, RequestSpec, ServiceRouter, Transport};

/// A request with its URL resolved and credential attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    service: String,
    path: String,
    request: HttpRequest,
}

impl PreparedRequest {
    /// Service the request was resolved against.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// The wire request.
    pub fn request(&self) -> &HttpRequest {
        &self.request
    }
}

/// Executes [`RequestSpec`]s against the configured services.
///
/// Cheap to clone: the router is shared, the store and transport share their
/// own state. Calls are independent futures; nothing is queued, retried, or
/// cached.
pub struct Dispatcher<S: CredentialStore, T: Transport> {
    router: Arc<ServiceRouter>,
    store: S,
    transport: T,
}

impl<S: CredentialStore, T: Transport> Clone for Dispatcher<S, T> {
    fn clone(&self) -> Self {
        Self {
            router: Arc::clone(&self.router),
            store: self.store.clone(),
            transport: self.transport.clone(),
        }
    }
}

impl<S: CredentialStore, T: Transport> Dispatcher<S, T> {
    /// Create a dispatcher.
    pub fn new(router: ServiceRouter, store: S, transport: T) -> Self {
        Self { router: Arc::new(router), store, transport }
    }

    /// Routing table.
    pub fn router(&self) -> &ServiceRouter {
        &self.router
    }

    /// Credential store the access token is read from.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resolve the URL and attach credentials without touching the network.
    ///
    /// # Errors
    ///
    /// - `InvalidConfiguration` if the service is unknown (the store is not
    ///   consulted)
    /// - `Unauthorized { status: None }` if auth is required and no access
    ///   token is stored
    /// - `Credential` if the store cannot be read
    pub fn prepare(&self, spec: RequestSpec) -> Result<PreparedRequest, RequestError> {
        let RequestSpec { service, path, method, body, requires_auth } = spec;

        let Some(url) = self.router.url(&service, &path) else {
            error!(service = %service, path = %path, "no base address configured for service");
            return Err(RequestError::InvalidConfiguration { service });
        };

        let bearer = if requires_auth {
            match self.store.get(ACCESS_TOKEN)? {
                Some(token) => Some(token),
                None => {
                    debug!(service = %service, path = %path, "no access token stored");
                    return Err(RequestError::Unauthorized { status: None });
                },
            }
        } else {
            None
        };

        Ok(PreparedRequest { service, path, request: HttpRequest { method, url, bearer, body } })
    }

    /// Send a prepared request once and classify the status.
    ///
    /// The body of a 2xx response is returned undecoded.
    ///
    /// # Errors
    ///
    /// - `Network` if no response was received
    /// - `Unauthorized { status }` for 401 and 403
    /// - `Rejected` for any other non-2xx status
    pub async fn send_raw(&self, prepared: PreparedRequest) -> Result<HttpResponse, RequestError> {
        let PreparedRequest { service, path, request } = prepared;
        let method = request.method;

        debug!(service = %service, method = %method, path = %path, "dispatching request");

        let response = self.transport.send(request).await.map_err(|e| {
            debug!(service = %service, path = %path, error = %e, "transport failed");
            RequestError::Network(e)
        })?;

        classify(&response)?;
        Ok(response)
    }

    /// Send a prepared request once and decode the JSON body as `R`.
    ///
    /// # Errors
    ///
    /// Everything [`Self::send_raw`] reports, plus `Decoding` when the body
    /// does not match `R`.
    pub async fn send<R: DeserializeOwned>(
        &self,
        prepared: PreparedRequest,
    ) -> Result<R, RequestError> {
        let service = prepared.service.clone();
        let response = self.send_raw(prepared).await?;
        decode(&service, &response.body)
    }

    /// [`Self::prepare`] followed by [`Self::send`].
    ///
    /// # Errors
    ///
    /// See [`Self::prepare`] and [`Self::send`].
    pub async fn execute<R: DeserializeOwned>(&self, spec: RequestSpec) -> Result<R, RequestError> {
        let prepared = self.prepare(spec)?;
        self.send(prepared).await
    }
}

fn classify(response: &HttpResponse) -> Result<(), RequestError> {
    match response.status {
        _ if response.is_success() => Ok(()),
        401 | 403 => Err(RequestError::Unauthorized { status: Some(response.status) }),
        status => {
            let message = serde_json::from_slice::<ErrorResponse>(&response.body)
                .map(|body| body.message)
                .unwrap_or_else(|_| canonical_reason(status).to_string());
            Err(RequestError::Rejected { status, message })
        },
    }
}

fn canonical_reason(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("unknown status")
}

fn decode<R: DeserializeOwned>(service: &str, body: &[u8]) -> Result<R, RequestError> {
    serde_json::from_slice(body).map_err(|e| {
        // serde_json messages can quote input; keep only category and position
        let reason = format!("{:?} error at line {} column {}", e.classify(), e.line(), e.column());
        warn!(service, payload_size = body.len(), %reason, "response did not match expected shape");
        RequestError::Decoding { payload_size: body.len(), reason }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_success_range() {
        assert_eq!(classify(&HttpResponse::new(200, "{}")), Ok(()));
        assert_eq!(classify(&HttpResponse::new(201, "{}")), Ok(()));
    }

    #[test]
    fn classify_auth_statuses() {
        assert_eq!(
            classify(&HttpResponse::new(401, "")),
            Err(RequestError::Unauthorized { status: Some(401) })
        );
        assert_eq!(
            classify(&HttpResponse::new(403, "")),
            Err(RequestError::Unauthorized { status: Some(403) })
        );
    }

    #[test]
    fn classify_uses_server_message() {
        let body = r#"{"success":false,"message":"Event is full","error":"CAPACITY"}"#;
        assert_eq!(
            classify(&HttpResponse::new(409, body)),
            Err(RequestError::Rejected { status: 409, message: "Event is full".to_string() })
        );
    }

    #[test]
    fn classify_falls_back_to_reason_phrase() {
        assert_eq!(
            classify(&HttpResponse::new(502, "<html>bad gateway</html>")),
            Err(RequestError::Rejected { status: 502, message: "Bad Gateway".to_string() })
        );
    }

    #[test]
    fn decode_error_never_quotes_body() {
        let result: Result<u32, _> = decode("events", br#""t0ps3cret""#);
        let err = result.expect_err("string is not a u32");

        assert!(matches!(err, RequestError::Decoding { payload_size: 11, .. }));
        assert!(!err.to_string().contains("t0ps3cret"));
    }
}
