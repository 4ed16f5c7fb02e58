//! `GET_USER_LIST` payload normalization.
//!
//! The server documents no schema for this reply. Observed shapes are a bare
//! array of usernames, or an array of objects where `type == 1` marks a room.

use serde_json::Value;

use crate::fields::{any_text, pick};

use super::target::ChatTarget;

/// One entry of the user directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Peer {
    pub target: ChatTarget,
    pub name: String,
}

/// Rooms and users visible to the logged-in account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    pub rooms: Vec<Peer>,
    pub users: Vec<Peer>,
}

impl Directory {
    /// Total: non-array payloads produce an empty directory.
    pub fn from_payload(payload: &Value) -> Self {
        let Some(list) = payload.as_array() else {
            return Self::default();
        };

        let typed = list
            .iter()
            .any(|x| x.as_object().is_some_and(|o| o.contains_key("type")));

        let mut dir = Self::default();
        for item in list {
            let name = entry_name(item);
            let is_room = typed && item.get("type").and_then(Value::as_f64) == Some(1.0);
            if is_room {
                dir.rooms.push(Peer { target: ChatTarget::Room, name });
            } else {
                dir.users.push(Peer { target: ChatTarget::People, name });
            }
        }
        dir
    }

    /// Users other than `me` (case-insensitive, trimmed).
    pub fn users_except<'a>(&'a self, me: &str) -> Vec<&'a Peer> {
        let me = me.trim().to_lowercase();
        self.users
            .iter()
            .filter(|u| me.is_empty() || u.name.to_lowercase() != me)
            .collect()
    }
}

fn entry_name(item: &Value) -> String {
    match item {
        Value::String(s) => s.clone(),
        Value::Object(_) => pick(item, &["name", "user", "id"])
            .map(any_text)
            .unwrap_or_else(|| item.to_string()),
        other => any_text(other),
    }
}
