//! Command line client for the Univent backend.
//!
//! Library half of the `univent` binary: configuration, the command set, and
//! the code that runs a command against a session. Kept out of `main.rs` so
//! it can be driven by tests with a scripted transport.

#![forbid(unsafe_code)]

pub mod commands;
pub mod config;

pub use commands::{CliError, Command, Services};
pub use config::{ClientConfig, parse_service_override};
