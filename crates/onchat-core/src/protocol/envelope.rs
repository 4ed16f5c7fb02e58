//! Outbound envelope (JSON).
//!
//! Every request is `{"action":"onchat","data":{"event":<tag>,"data":<payload>}}`;
//! the inner `data` is omitted for events that take no arguments.

use serde_json::{json, Value};

use super::event::EventName;
use super::target::ChatTarget;

/// The only action the endpoint understands.
pub const ACTION: &str = "onchat";

/// One outbound request, carrying exactly one event tag.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    event: EventName,
    data: Option<Value>,
}

impl Request {
    pub fn new(event: EventName, data: Option<Value>) -> Self {
        Self { event, data }
    }

    pub fn event(&self) -> &EventName {
        &self.event
    }

    pub fn data(&self) -> Option<&Value> {
        self.data.as_ref()
    }

    /// Full wire envelope.
    pub fn to_value(&self) -> Value {
        let mut inner = json!({ "event": self.event });
        if let (Some(data), Some(obj)) = (&self.data, inner.as_object_mut()) {
            obj.insert("data".into(), data.clone());
        }
        json!({ "action": ACTION, "data": inner })
    }

    /// Serialized text frame.
    pub fn to_text(&self) -> String {
        self.to_value().to_string()
    }

    pub fn register(user: &str, pass: &str) -> Self {
        Self::new(EventName::Register, Some(json!({ "user": user, "pass": pass })))
    }

    pub fn login(user: &str, pass: &str) -> Self {
        Self::new(EventName::Login, Some(json!({ "user": user, "pass": pass })))
    }

    pub fn relogin(user: &str, code: &str) -> Self {
        Self::new(EventName::ReLogin, Some(json!({ "user": user, "code": code })))
    }

    pub fn logout() -> Self {
        Self::new(EventName::Logout, None)
    }

    pub fn create_room(name: &str) -> Self {
        Self::new(EventName::CreateRoom, Some(json!({ "name": name })))
    }

    pub fn join_room(name: &str) -> Self {
        Self::new(EventName::JoinRoom, Some(json!({ "name": name })))
    }

    pub fn room_history(name: &str, page: u32) -> Self {
        Self::new(EventName::GetRoomChatMes, Some(json!({ "name": name, "page": page })))
    }

    pub fn people_history(name: &str, page: u32) -> Self {
        Self::new(EventName::GetPeopleChatMes, Some(json!({ "name": name, "page": page })))
    }

    /// `mes` must already be in wire form (see `codec::encode_outbound`).
    pub fn send_chat(target: ChatTarget, to: &str, mes: &str) -> Self {
        Self::new(
            EventName::SendChat,
            Some(json!({ "type": target.as_str(), "to": to, "mes": mes })),
        )
    }

    pub fn check_user_online(user: &str) -> Self {
        Self::new(EventName::CheckUserOnline, Some(json!({ "user": user })))
    }

    pub fn check_user_exist(user: &str) -> Self {
        Self::new(EventName::CheckUserExist, Some(json!({ "user": user })))
    }

    pub fn user_list() -> Self {
        Self::new(EventName::GetUserList, None)
    }
}
