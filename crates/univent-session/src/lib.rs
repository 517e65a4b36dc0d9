//! Session management for Univent clients
//!
//! [`SessionManager`] is the single owner of "who is logged in". It runs the
//! auth flows (login, registration, logout, profile updates, token refresh)
//! through a [`univent_client::Dispatcher`], persists credentials through the
//! dispatcher's [`univent_store::CredentialStore`], and publishes a
//! [`SessionState`] snapshot on every transition.
//!
//! # Invariant
//!
//! Whenever the published state is authenticated, an access token is
//! present in the store. Any authorization failure observed on a session
//! request clears both tokens and the state together.
//!
//! # Example
//!
//! ```no_run
//! use univent_client::{Dispatcher, ReqwestTransport, ServiceRouter};
//! use univent_session::SessionManager;
//! use univent_store::RedbCredentialStore;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedbCredentialStore::open("univent-credentials.redb")?;
//! let dispatcher = Dispatcher::new(ServiceRouter::default(), store, ReqwestTransport::new()?);
//! let session = SessionManager::new(dispatcher);
//!
//! let mut updates = session.subscribe();
//! let user = session.login("a@b.com", "secret1").await?;
//! assert!(updates.borrow_and_update().is_authenticated());
//! # let _ = user;
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

mod error;
mod manager;
mod state;

pub use error::SessionError;
pub use manager::SessionManager;
pub use state::{SessionState, SessionStatus};
