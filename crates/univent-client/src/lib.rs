//! Request layer for the Univent backend
//!
//! Resolves logical service names to base addresses, attaches bearer
//! credentials, performs one HTTP exchange per call and decodes the JSON
//! result. Every failure is reported through a single [`RequestError`].
//!
//! # Components
//!
//! - [`ServiceRouter`]: service name to base address table
//! - [`RequestSpec`]: what to send (service, path, method, body, auth)
//! - [`Dispatcher`]: prepare, send, classify, decode
//! - [`Transport`]: the network seam; [`ReqwestTransport`] in production
//!
//! # Example
//!
//! ```no_run
//! use univent_client::{Dispatcher, ReqwestTransport, RequestSpec, ServiceRouter, services};
//! use univent_proto::Envelope;
//! use univent_store::MemoryCredentialStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let dispatcher = Dispatcher::new(
//!     ServiceRouter::default(),
//!     MemoryCredentialStore::new(),
//!     ReqwestTransport::new()?,
//! );
//!
//! let me: Envelope = dispatcher.execute(RequestSpec::get(services::AUTH, "/auth/me")).await?;
//! # let _ = me;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod dispatcher;
mod error;
mod request;
mod router;
mod transport;

pub use dispatcher::{Dispatcher, PreparedRequest};
pub use error::{RequestError, RouterError, TransportError};
pub use request::{Method, RequestSpec};
pub use router::{ServiceDescriptor, ServiceRouter, services};
pub use transport::{HttpRequest, HttpResponse, JSON_CONTENT_TYPE, ReqwestTransport, Transport};
