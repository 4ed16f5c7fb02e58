//! Conversation addressing: group rooms vs. one-to-one chats.

use serde_json::Value;

/// Kind of conversation a chat message belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChatTarget {
    Room,
    People,
}

impl ChatTarget {
    /// Wire spelling used in `SEND_CHAT`.
    pub fn as_str(self) -> &'static str {
        match self {
            ChatTarget::Room => "room",
            ChatTarget::People => "people",
        }
    }

    /// Servers send the type as `0`/`1`, `"0"`/`"1"`, or `"people"`/`"room"`.
    pub fn from_wire(v: &Value) -> Option<Self> {
        match v {
            Value::Number(n) => match n.as_i64() {
                Some(0) => Some(ChatTarget::People),
                Some(1) => Some(ChatTarget::Room),
                _ => None,
            },
            Value::String(s) => match s.as_str() {
                "0" | "people" => Some(ChatTarget::People),
                "1" | "room" => Some(ChatTarget::Room),
                _ => None,
            },
            _ => None,
        }
    }
}

/// An addressable conversation: a room name or a peer's username.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Conversation {
    pub target: ChatTarget,
    pub to: String,
}

impl Conversation {
    pub fn room(name: impl Into<String>) -> Self {
        Self { target: ChatTarget::Room, to: name.into() }
    }

    pub fn people(user: impl Into<String>) -> Self {
        Self { target: ChatTarget::People, to: user.into() }
    }
}
