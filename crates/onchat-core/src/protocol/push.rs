//! Unsolicited chat pushes.
//!
//! Any frame that is not a query reply and carries a non-empty `mes` is a
//! live chat message. Fields are read from `data.<key>` first, then from the
//! top level.

use serde_json::Value;

use crate::codec::classify;
use crate::fields::{pick_nested, scalar_text};
use crate::message::{display_time, is_same_user, ChatMessage, MessageIds, Side};

use super::reply::unwrap_frame;
use super::target::{ChatTarget, Conversation};

/// Conversation type declared by a push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclaredType {
    Known(ChatTarget),
    Unknown(String),
}

/// A decoded chat push, before content classification.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPush {
    pub event: Option<String>,
    pub declared: Option<DeclaredType>,
    pub to: Option<String>,
    pub from: Option<String>,
    pub mes: Value,
}

impl ChatPush {
    /// `None` for query replies and frames without a usable `mes`.
    pub fn from_frame(frame: &Value) -> Option<Self> {
        let reply = unwrap_frame(frame);
        if reply.event_name().is_some_and(|e| e.is_query_reply()) {
            return None;
        }

        let mes = pick_nested(frame, "mes").filter(|m| is_truthy(m))?.clone();

        let declared = pick_nested(frame, "type").and_then(|t| match ChatTarget::from_wire(t) {
            Some(k) => Some(DeclaredType::Known(k)),
            None => scalar_text(t)
                .filter(|s| !s.is_empty())
                .map(DeclaredType::Unknown),
        });

        let to = pick_nested(frame, "to")
            .or_else(|| frame.get("data").and_then(|d| d.get("room")).filter(|v| !v.is_null()))
            .and_then(scalar_text);

        let from = pick_nested(frame, "from")
            .or_else(|| pick_nested(frame, "user"))
            .or_else(|| frame.get("data").and_then(|d| d.get("name")).filter(|v| !v.is_null()))
            .and_then(scalar_text);

        Some(Self { event: reply.event, declared, to, from, mes })
    }

    /// Whether this push belongs to the conversation currently shown.
    pub fn belongs_to(&self, conv: &Conversation, local_user: Option<&str>) -> bool {
        if let Some(declared) = &self.declared {
            if *declared != DeclaredType::Known(conv.target) {
                return false;
            }
        }

        match conv.target {
            ChatTarget::Room => self.to.as_deref().map_or(true, |to| to == conv.to),
            ChatTarget::People => {
                let from = self.from.as_deref();
                from == Some(conv.to.as_str())
                    || self.to.as_deref() == Some(conv.to.as_str())
                    || (from.is_some() && local_user.is_some() && from == local_user)
            }
        }
    }

    /// Classify the payload into a displayable message.
    pub fn to_message(&self, ids: &MessageIds, local_user: Option<&str>) -> ChatMessage {
        let side = if is_same_user(self.from.as_deref(), local_user) {
            Side::Right
        } else {
            Side::Left
        };
        ChatMessage {
            id: ids.next(),
            side,
            author: Some(self.from.clone().unwrap_or_else(|| "Unknown".to_string())),
            content: classify(&self.mes),
            time: display_time(None),
        }
    }
}

fn is_truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => true,
    }
}
