//! Transport layer (WebSocket client).
//!
//! Owns the single socket, turns its lifecycle into bus events and
//! reconnects with capped exponential backoff.

pub mod backoff;
pub mod codec;
pub mod connection;

pub use backoff::Backoff;
pub use connection::{Connection, ConnectionState};
