//! Typed server replies.
//!
//! [`ServerEvent::decode`] runs the single unwrap step and then maps the
//! event tag onto a variant, so callers never inspect optional fields
//! themselves.

use serde_json::Value;

use crate::fields::{pick, scalar_text};
use crate::history::HistoryBatch;

use super::directory::Directory;
use super::event::EventName;
use super::push::ChatPush;
use super::reply::{unwrap_frame, Reply};

/// Result of `LOGIN` / `RE_LOGIN`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginGrant {
    /// Code that lets a later session resume without the password.
    pub relogin_code: Option<String>,
    /// Username echoed by the server, when present.
    pub user: Option<String>,
}

impl LoginGrant {
    pub fn from_reply(reply: &Reply) -> Self {
        Self {
            relogin_code: reply.payload.get("RE_LOGIN_CODE").and_then(scalar_text),
            user: pick(&reply.payload, &["user", "username"]).and_then(scalar_text),
        }
    }
}

/// Room announced by `CREATE_ROOM` / `JOIN_ROOM`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub name: String,
    pub owner: Option<String>,
}

impl RoomInfo {
    pub fn from_reply(reply: &Reply) -> Option<Self> {
        let name = reply.payload.get("name").and_then(scalar_text)?;
        let owner = pick(&reply.payload, &["own", "owner"]).and_then(scalar_text);
        Some(Self { name, owner })
    }
}

/// Online flag: `status`, else `online`, else `isOnline`; only literal `true` counts.
pub fn parse_online(reply: &Reply) -> bool {
    pick(&reply.payload, &["status", "online", "isOnline"]) == Some(&Value::Bool(true))
}

/// Existence flag: payload `status == true`.
pub fn parse_exists(reply: &Reply) -> bool {
    reply.payload.get("status") == Some(&Value::Bool(true))
}

/// One inbound frame, typed by its event tag.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Login(LoginGrant),
    RoomCreated(RoomInfo),
    RoomJoined(RoomInfo),
    History(HistoryBatch),
    UserOnline(bool),
    UserExists(bool),
    UserList(Directory),
    Chat(ChatPush),
    Other(Reply),
}

impl ServerEvent {
    /// Total: every frame maps to some variant.
    pub fn decode(frame: &Value) -> Self {
        let reply = unwrap_frame(frame);
        match reply.event_name() {
            Some(EventName::Login | EventName::ReLogin) => {
                ServerEvent::Login(LoginGrant::from_reply(&reply))
            }
            Some(EventName::Register | EventName::Logout) => ServerEvent::Other(reply),
            Some(EventName::CreateRoom) => match RoomInfo::from_reply(&reply) {
                Some(room) => ServerEvent::RoomCreated(room),
                None => ServerEvent::Other(reply),
            },
            Some(EventName::JoinRoom) => match RoomInfo::from_reply(&reply) {
                Some(room) => ServerEvent::RoomJoined(room),
                None => ServerEvent::Other(reply),
            },
            Some(EventName::GetRoomChatMes | EventName::GetPeopleChatMes) => {
                ServerEvent::History(HistoryBatch::from_payload(&reply.payload))
            }
            Some(EventName::CheckUserOnline) => ServerEvent::UserOnline(parse_online(&reply)),
            Some(EventName::CheckUserExist) => ServerEvent::UserExists(parse_exists(&reply)),
            Some(EventName::GetUserList) => {
                ServerEvent::UserList(Directory::from_payload(&reply.payload))
            }
            _ => match ChatPush::from_frame(frame) {
                Some(push) => ServerEvent::Chat(push),
                None => ServerEvent::Other(reply),
            },
        }
    }
}
