//! onchat core: transport-agnostic protocol primitives, content codec, and
//! chat-history normalization.
//!
//! This crate defines the wire contract of the `onchat` WebSocket protocol
//! (outbound envelopes, event names, tolerant reply unwrapping) and the pure
//! functions that turn loosely-typed server payloads into typed chat
//! messages. It carries no socket or runtime dependencies so the decoding
//! rules can be tested and reused without a connection.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here. Decoding is total:
//! malformed payloads degrade to a literal string rather than an error.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod codec;
pub mod error;
pub mod history;
pub mod message;
pub mod protocol;

mod fields;

/// Shared result type.
pub use error::{ErrorKind, OnchatError, Result};
