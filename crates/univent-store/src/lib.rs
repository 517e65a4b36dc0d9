//! Credential storage for Univent sessions
//!
//! Trait-based abstraction for persisting the bearer credentials of a
//! session. The trait is synchronous: every operation is a single small
//! read or write and callers never hold it across an await point.
//!
//! # Components
//!
//! - [`CredentialStore`]: set/get/delete contract keyed by name
//! - [`MemoryCredentialStore`]: process-lifetime store for tests and demos
//! - [`RedbCredentialStore`]: durable store that survives restarts
//! - [`ChaoticCredentialStore`]: fault-injecting wrapper for failure tests
//! - [`Secret`]: value wrapper that redacts itself and zeroes on drop

#![forbid(unsafe_code)]

mod chaotic;
mod error;
mod memory;
mod redb;
mod secret;

pub use chaotic::ChaoticCredentialStore;
pub use error::CredentialError;
pub use memory::MemoryCredentialStore;
pub use secret::Secret;

pub use self::redb::RedbCredentialStore;

/// Name under which the access token is stored.
pub const ACCESS_TOKEN: &str = "access_token";

/// Name under which the refresh token is stored.
pub const REFRESH_TOKEN: &str = "refresh_token";

/// Storage abstraction for named secrets.
///
/// Must be Clone (handed to the dispatcher and the session manager), Send +
/// Sync, and synchronous. Implementations share internal state via Arc, so
/// clones access the same underlying storage.
///
/// # Invariants
///
/// - `set` followed by `get` on the same name returns the value just set.
/// - `set` replaces any previous value as one atomic unit (delete, then
///   insert). A reader never observes a mix of old and new.
/// - `delete` on an absent name is a no-op.
/// - Each operation is atomic with respect to the others; concurrent writers
///   resolve last-writer-wins.
pub trait CredentialStore: Clone + Send + Sync + 'static {
    /// Store `value` under `name`, replacing any previous value.
    fn set(&self, name: &str, value: &str) -> Result<(), CredentialError>;

    /// Value stored under `name`. `None` if absent.
    fn get(&self, name: &str) -> Result<Option<Secret>, CredentialError>;

    /// Remove the value stored under `name`, if any.
    fn delete(&self, name: &str) -> Result<(), CredentialError>;

    /// Whether a value is stored under `name`.
    fn contains(&self, name: &str) -> Result<bool, CredentialError> {
        Ok(self.get(name)?.is_some())
    }
}
