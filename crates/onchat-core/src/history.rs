//! Chat-history normalization and ordering.
//!
//! History replies arrive as a bare array or nested under one of several
//! field names, and newest-first or oldest-first depending on the endpoint.
//! Output is always chronological (oldest first).

use serde_json::Value;

use crate::codec::classify_str;
use crate::fields::{any_text, pick, scalar_text};
use crate::message::{display_time, is_same_user, ChatMessage, MessageIds, Side};

/// Payload fields holding the record list, in priority order.
pub const LIST_FIELDS: [&str; 5] = ["data", "list", "messages", "mes", "chatData"];
/// Record fields holding the message body, in priority order.
pub const CONTENT_FIELDS: [&str; 5] = ["mes", "message", "content", "text", "msg"];
/// Record fields holding the sender, in priority order.
pub const AUTHOR_FIELDS: [&str; 6] = ["from", "user", "sender", "name", "username", "author"];
/// Record fields holding the display time, in priority order.
pub const TIME_FIELDS: [&str; 6] = ["time", "actionTime", "createTime", "createAt", "createdAt", "date"];

/// Raw history records, in server order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryBatch {
    pub records: Vec<Value>,
}

impl HistoryBatch {
    /// Total: an unrecognized payload yields an empty batch.
    pub fn from_payload(payload: &Value) -> Self {
        if let Some(list) = payload.as_array() {
            return Self { records: list.clone() };
        }
        let records = LIST_FIELDS
            .iter()
            .find_map(|f| payload.get(*f).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default();
        Self { records }
    }

    /// At least two records, numeric ids on both ends, first id > last id.
    pub fn is_newest_first(&self) -> bool {
        if self.records.len() < 2 {
            return false;
        }
        let id = |v: Option<&Value>| v.and_then(|r| r.get("id")).and_then(Value::as_f64);
        match (id(self.records.first()), id(self.records.last())) {
            (Some(first), Some(last)) => first > last,
            _ => false,
        }
    }

    /// Records oldest first.
    pub fn into_chronological(self) -> Vec<Value> {
        let newest_first = self.is_newest_first();
        let mut records = self.records;
        if newest_first {
            records.reverse();
        }
        records
    }

    /// Chronological, classified messages as seen by `local_user`.
    pub fn normalize(self, local_user: Option<&str>, ids: &MessageIds) -> Vec<ChatMessage> {
        self.into_chronological()
            .iter()
            .map(HistoryRecord::from_value)
            .map(|rec| rec.into_message(local_user, ids))
            .collect()
    }
}

/// One record after field-priority extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRecord {
    pub content: String,
    pub author: Option<String>,
    pub time: Option<String>,
}

impl HistoryRecord {
    pub fn from_value(item: &Value) -> Self {
        match item {
            Value::Null => Self { content: String::new(), author: None, time: None },
            Value::Object(_) => Self {
                content: pick(item, &CONTENT_FIELDS)
                    .map(any_text)
                    .unwrap_or_else(|| item.to_string()),
                author: pick(item, &AUTHOR_FIELDS).and_then(scalar_text),
                time: pick(item, &TIME_FIELDS)
                    .and_then(Value::as_str)
                    .map(str::to_string),
            },
            other => Self { content: any_text(other), author: None, time: None },
        }
    }

    pub fn into_message(self, local_user: Option<&str>, ids: &MessageIds) -> ChatMessage {
        let side = if is_same_user(self.author.as_deref(), local_user) {
            Side::Right
        } else {
            Side::Left
        };
        ChatMessage {
            id: ids.next(),
            side,
            content: classify_str(&self.content),
            time: display_time(self.time.as_deref()),
            author: self.author,
        }
    }
}
