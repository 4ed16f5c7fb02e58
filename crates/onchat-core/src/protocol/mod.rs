//! Wire protocol of the `onchat` endpoint.
//!
//! Every request and every server push travels over one socket as a JSON
//! envelope tagged with an `event` name:
//! - Outbound: `{"action":"onchat","data":{"event":..,"data":..}}` ([`Request`]).
//! - Inbound: loosely nested frames, flattened once by [`unwrap_frame`] and
//!   then typed by [`ServerEvent::decode`].
//!
//! Nothing in here panics on hostile or malformed input.

pub mod directory;
pub mod envelope;
pub mod event;
pub mod push;
pub mod reply;
pub mod server;
pub mod target;

pub use directory::{Directory, Peer};
pub use envelope::{Request, ACTION};
pub use event::EventName;
pub use push::ChatPush;
pub use reply::{unwrap_frame, Reply, SUCCESS};
pub use server::{LoginGrant, RoomInfo, ServerEvent};
pub use target::{ChatTarget, Conversation};
