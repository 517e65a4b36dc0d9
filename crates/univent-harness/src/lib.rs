//! Test harness for Univent clients.
//!
//! [`ScriptedTransport`] stands in for the network: it answers requests from
//! a script of canned responses, records every request it sees, and can hold
//! a response behind a [`Gate`] so tests observe in-flight state. Nothing
//! here opens a socket.
//!
//! [`fixtures`] holds JSON bodies in the backend's wire format and helpers to
//! build a dispatcher wired to the spy.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
mod scripted;

pub use scripted::{Gate, ScriptedTransport};
