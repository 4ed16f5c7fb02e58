//! onchat client runtime.
//!
//! Wires the event multiplexer, the reconnecting connection manager, the
//! request/response correlator and the chat API into one [`session::Session`].
//! Used by the `onchat` binary and by integration tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod api;
pub mod config;
pub mod events;
pub mod feed;
pub mod rpc;
pub mod session;
pub mod transport;

pub use api::{ChatApi, Requester};
pub use config::ClientConfig;
pub use events::{Channel, Event, EventBus, Subscription};
pub use feed::ChatFeed;
pub use rpc::Correlator;
pub use session::Session;
pub use transport::{Connection, ConnectionState};
