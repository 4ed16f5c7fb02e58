//! Typed publish/subscribe over the socket lifecycle.

pub mod bus;

use bytes::Bytes;
use serde_json::Value;

pub use bus::{EventBus, Handler, Subscription};

/// Independent delivery channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Open,
    Close,
    Error,
    Message,
    Json,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Open => "open",
            Channel::Close => "close",
            Channel::Error => "error",
            Channel::Message => "message",
            Channel::Json => "json",
        }
    }
}

/// Close code and reason as reported by the peer (or synthesized locally).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: Option<u16>,
    pub reason: String,
}

/// A frame exactly as it came off the socket.
#[derive(Debug, Clone, PartialEq)]
pub enum RawFrame {
    Text(String),
    Binary(Bytes),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Open,
    Close(CloseInfo),
    Error(String),
    Message(RawFrame),
    /// Successfully decoded JSON frame.
    Json(Value),
}

impl Event {
    pub fn channel(&self) -> Channel {
        match self {
            Event::Open => Channel::Open,
            Event::Close(_) => Channel::Close,
            Event::Error(_) => Channel::Error,
            Event::Message(_) => Channel::Message,
            Event::Json(_) => Channel::Json,
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Event::Json(v) => Some(v),
            _ => None,
        }
    }
}
