//! Event tags carried by every envelope.

use std::fmt;

use serde::{Serialize, Serializer};

/// Known event names, plus a catch-all for tags this client does not model.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventName {
    Register,
    Login,
    ReLogin,
    Logout,
    CreateRoom,
    JoinRoom,
    GetRoomChatMes,
    GetPeopleChatMes,
    SendChat,
    CheckUserOnline,
    CheckUserExist,
    GetUserList,
    Other(String),
}

impl EventName {
    /// Wire spelling of the tag.
    pub fn as_str(&self) -> &str {
        match self {
            EventName::Register => "REGISTER",
            EventName::Login => "LOGIN",
            EventName::ReLogin => "RE_LOGIN",
            EventName::Logout => "LOGOUT",
            EventName::CreateRoom => "CREATE_ROOM",
            EventName::JoinRoom => "JOIN_ROOM",
            EventName::GetRoomChatMes => "GET_ROOM_CHAT_MES",
            EventName::GetPeopleChatMes => "GET_PEOPLE_CHAT_MES",
            EventName::SendChat => "SEND_CHAT",
            EventName::CheckUserOnline => "CHECK_USER_ONLINE",
            EventName::CheckUserExist => "CHECK_USER_EXIST",
            EventName::GetUserList => "GET_USER_LIST",
            EventName::Other(s) => s,
        }
    }

    /// Parse a wire tag. Unknown tags are preserved in [`EventName::Other`].
    pub fn from_wire(s: &str) -> Self {
        match s {
            "REGISTER" => EventName::Register,
            "LOGIN" => EventName::Login,
            "RE_LOGIN" => EventName::ReLogin,
            "LOGOUT" => EventName::Logout,
            "CREATE_ROOM" => EventName::CreateRoom,
            "JOIN_ROOM" => EventName::JoinRoom,
            "GET_ROOM_CHAT_MES" => EventName::GetRoomChatMes,
            "GET_PEOPLE_CHAT_MES" => EventName::GetPeopleChatMes,
            "SEND_CHAT" => EventName::SendChat,
            "CHECK_USER_ONLINE" => EventName::CheckUserOnline,
            "CHECK_USER_EXIST" => EventName::CheckUserExist,
            "GET_USER_LIST" => EventName::GetUserList,
            other => EventName::Other(other.to_string()),
        }
    }

    /// Events answered as request/response replies rather than chat pushes.
    pub fn is_query_reply(&self) -> bool {
        matches!(
            self,
            EventName::GetRoomChatMes
                | EventName::GetPeopleChatMes
                | EventName::GetUserList
                | EventName::CheckUserOnline
                | EventName::CheckUserExist
                | EventName::JoinRoom
        )
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for EventName {
    fn from(s: &str) -> Self {
        EventName::from_wire(s)
    }
}

impl Serialize for EventName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
