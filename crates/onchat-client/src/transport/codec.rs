//! Socket frame decoding.
//!
//! - Text frames => raw text plus a best-effort JSON value
//! - Binary frames => raw bytes
//! - Close frames => code and reason
//! - Ping/Pong are answered by tungstenite itself

use bytes::Bytes;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message;

use crate::events::CloseInfo;

#[derive(Debug)]
pub enum Inbound {
    /// `json` is `None` for non-JSON text (not an error).
    Text { raw: String, json: Option<Value> },
    Binary(Bytes),
    Close(CloseInfo),
    Control,
}

pub fn decode(msg: Message) -> Inbound {
    match msg {
        Message::Text(s) => {
            let raw = s.as_str().to_string();
            let json = serde_json::from_str::<Value>(&raw).ok();
            if json.is_none() {
                tracing::debug!(frame = %raw, "non-json frame");
            }
            Inbound::Text { raw, json }
        }
        Message::Binary(b) => Inbound::Binary(b),
        Message::Close(frame) => Inbound::Close(match frame {
            Some(f) => CloseInfo {
                code: Some(u16::from(f.code)),
                reason: f.reason.as_str().to_string(),
            },
            None => CloseInfo::default(),
        }),
        Message::Ping(_) | Message::Pong(_) | Message::Frame(_) => Inbound::Control,
    }
}
