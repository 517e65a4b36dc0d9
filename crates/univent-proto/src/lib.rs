//! Univent wire types
//!
//! JSON shapes exchanged with the Univent backend services. Field names follow
//! the backend's camelCase convention and every timestamp is ISO-8601.
//!
//! # Components
//!
//! - [`User`] / [`UserRole`]: the account value shared by every service
//! - [`envelope`]: response wrappers (`ApiResponse`, `AuthResponse`, ...)
//! - [`payloads`]: request bodies and per-service domain types

#![forbid(unsafe_code)]

pub mod envelope;
pub mod payloads;
mod user;

pub use envelope::{ApiResponse, AuthResponse, Envelope, ErrorResponse, TokenRefreshResponse};
pub use user::{User, UserRole};
