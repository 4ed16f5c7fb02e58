//! Tolerant unwrapping of inbound frames.
//!
//! Server replies are not uniformly shaped: `event`, `status` and the
//! payload may sit at the top level or one level down inside `data`.
//! [`unwrap_frame`] is the only place that knows the fallback order:
//! - `event`: top-level, else `data.event`
//! - `status`: top-level, else `data.status`
//! - `mes` (server message text): top-level, else `data.mes`
//! - payload: `data.data`, else `data`, else the whole frame

use serde_json::Value;

use crate::error::{OnchatError, Result};
use crate::fields::scalar_text;

use super::event::EventName;

/// Status marker of a successful reply.
pub const SUCCESS: &str = "success";

/// A flattened inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub event: Option<String>,
    pub status: Option<String>,
    pub message: Option<String>,
    pub payload: Value,
}

/// Flatten a decoded frame. Total: any JSON value yields a `Reply`.
pub fn unwrap_frame(frame: &Value) -> Reply {
    let event = top_then_data(frame, "event").and_then(Value::as_str).map(str::to_string);
    let status = top_then_data(frame, "status").and_then(scalar_or_json);
    let message = top_then_data(frame, "mes").and_then(scalar_text);

    let data = frame.get("data").filter(|d| !d.is_null());
    let payload = data
        .and_then(|d| d.get("data"))
        .filter(|d| !d.is_null())
        .or(data)
        .unwrap_or(frame)
        .clone();

    Reply { event, status, message, payload }
}

fn top_then_data<'a>(frame: &'a Value, key: &str) -> Option<&'a Value> {
    frame
        .get(key)
        .filter(|v| !v.is_null())
        .or_else(|| frame.get("data").and_then(|d| d.get(key)).filter(|v| !v.is_null()))
}

fn scalar_or_json(v: &Value) -> Option<String> {
    scalar_text(v).or_else(|| Some(v.to_string()))
}

impl Reply {
    /// Typed event tag, if the frame carried one.
    pub fn event_name(&self) -> Option<EventName> {
        self.event.as_deref().map(EventName::from_wire)
    }

    /// Tag comparison only; the payload shape is never consulted.
    pub fn is_event(&self, expected: &EventName) -> bool {
        self.event.as_deref() == Some(expected.as_str())
    }

    /// A missing status counts as success; anything else must be `"success"`.
    pub fn is_success(&self) -> bool {
        match self.status.as_deref() {
            None => true,
            Some(s) => s == SUCCESS,
        }
    }

    /// Surface a non-success status as [`OnchatError::Status`].
    pub fn check(self) -> Result<Self> {
        if self.is_success() {
            return Ok(self);
        }
        let event = self.event.clone().unwrap_or_else(|| "UNKNOWN".to_string());
        let message = self
            .message
            .clone()
            .or_else(|| self.status.clone())
            .unwrap_or_default();
        Err(OnchatError::Status { event, message })
    }
}
