//! Scripted network spy.

#![allow(clippy::disallowed_types, reason = "Lock is never held across an await")]

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use univent_client::{HttpRequest, HttpResponse, Method, Transport, TransportError};

/// Transport that answers from a script and records every request.
///
/// Routes match on method and URL suffix (query string included). The most
/// recently added matching route wins, so a test can override a default
/// answer. Unmatched requests get a 404 with an error body. Clones share the
/// script and the request log.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    inner: Arc<Mutex<Script>>,
}

#[derive(Default)]
struct Script {
    routes: Vec<Route>,
    requests: Vec<HttpRequest>,
}

struct Route {
    method: Method,
    suffix: String,
    reply: Result<HttpResponse, TransportError>,
    gate: Option<watch::Receiver<bool>>,
}

impl Route {
    fn matches(&self, request: &HttpRequest) -> bool {
        self.method == request.method && request.url.ends_with(&self.suffix)
    }
}

/// Holds back a scripted response until opened.
///
/// Dropping the gate also releases it, so a test cannot hang on a gate it
/// forgot.
#[derive(Debug)]
pub struct Gate {
    tx: watch::Sender<bool>,
}

impl Gate {
    /// Release every request waiting on this gate, and all later ones.
    pub fn open(&self) {
        self.tx.send_replace(true);
    }
}

impl ScriptedTransport {
    /// Empty script: every request gets a 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method` requests whose URL ends with `suffix`.
    pub fn respond(&self, method: Method, suffix: &str, status: u16, body: impl Into<String>) {
        self.push(method, suffix, Ok(HttpResponse::new(status, body.into())), None);
    }

    /// Answer with a JSON value.
    pub fn respond_json(
        &self,
        method: Method,
        suffix: &str,
        status: u16,
        body: &serde_json::Value,
    ) {
        self.respond(method, suffix, status, body.to_string());
    }

    /// Fail matching requests as if the server were unreachable.
    pub fn fail(&self, method: Method, suffix: &str, error: TransportError) {
        self.push(method, suffix, Err(error), None);
    }

    /// Like [`Self::respond`], but hold each answer until the gate opens.
    ///
    /// The request is recorded as soon as it arrives, before the gate.
    #[must_use]
    pub fn respond_gated(
        &self,
        method: Method,
        suffix: &str,
        status: u16,
        body: impl Into<String>,
    ) -> Gate {
        let (tx, rx) = watch::channel(false);
        self.push(method, suffix, Ok(HttpResponse::new(status, body.into())), Some(rx));
        Gate { tx }
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.lock().requests.clone()
    }

    /// Number of requests received so far.
    pub fn request_count(&self) -> usize {
        self.lock().requests.len()
    }

    /// Requests whose URL ends with `suffix`.
    pub fn requests_to(&self, suffix: &str) -> Vec<HttpRequest> {
        self.lock().requests.iter().filter(|r| r.url.ends_with(suffix)).cloned().collect()
    }

    /// Most recent request, if any.
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.lock().requests.last().cloned()
    }

    fn push(
        &self,
        method: Method,
        suffix: &str,
        reply: Result<HttpResponse, TransportError>,
        gate: Option<watch::Receiver<bool>>,
    ) {
        self.lock().routes.push(Route { method, suffix: suffix.to_string(), reply, gate });
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let (reply, gate) = {
            let mut script = self.lock();
            let found = script
                .routes
                .iter()
                .rev()
                .find(|route| route.matches(&request))
                .map(|route| (route.reply.clone(), route.gate.clone()));
            tracing::trace!(
                method = %request.method,
                url = %request.url,
                matched = found.is_some(),
                "scripted request"
            );
            script.requests.push(request);
            found.unwrap_or_else(|| (Ok(not_found()), None))
        };

        if let Some(mut gate) = gate {
            // Err means the Gate was dropped, which also releases
            let _ = gate.wait_for(|open| *open).await;
        }

        reply
    }
}

fn not_found() -> HttpResponse {
    HttpResponse::new(404, r#"{"success":false,"message":"no scripted route"}"#)
}
