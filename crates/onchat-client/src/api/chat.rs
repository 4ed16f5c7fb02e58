use onchat_core::error::Result;
use onchat_core::history::HistoryBatch;
use onchat_core::protocol::server::{parse_exists, parse_online};
use onchat_core::protocol::{
    ChatTarget, Conversation, Directory, EventName, LoginGrant, Reply, Request, RoomInfo,
};

use crate::api::Requester;
use crate::config::RequestSection;

/// Typed request/response calls with per-call budgets from config.
pub struct ChatApi<R> {
    rq: R,
    timeouts: RequestSection,
}

impl<R: Requester> ChatApi<R> {
    pub fn new(rq: R, timeouts: RequestSection) -> Self {
        Self { rq, timeouts }
    }

    pub fn requester(&self) -> &R {
        &self.rq
    }

    pub async fn register(&self, user: &str, pass: &str) -> Result<Reply> {
        self.rq
            .call(
                Request::register(user, pass),
                EventName::Register,
                self.timeouts.default_timeout(),
            )
            .await?
            .check()
    }

    pub async fn login(&self, user: &str, pass: &str) -> Result<LoginGrant> {
        let reply = self
            .rq
            .call(
                Request::login(user, pass),
                EventName::Login,
                self.timeouts.login_timeout(),
            )
            .await?
            .check()?;
        tracing::info!(user, "logged in");
        Ok(LoginGrant::from_reply(&reply))
    }

    /// Resume with a code from an earlier [`LoginGrant`]. The server answers
    /// under either `RE_LOGIN` or `LOGIN`.
    pub async fn relogin(&self, user: &str, code: &str) -> Result<LoginGrant> {
        let reply = self
            .rq
            .call_any(
                Request::relogin(user, code),
                &[EventName::ReLogin, EventName::Login],
                self.timeouts.login_timeout(),
            )
            .await?
            .check()?;
        tracing::info!(user, "session resumed");
        Ok(LoginGrant::from_reply(&reply))
    }

    /// No reply is awaited. A socket that is not open is treated as already
    /// logged out.
    pub async fn logout(&self) -> Result<()> {
        if !self.rq.is_open() {
            tracing::warn!("logout skipped, socket not open");
            return Ok(());
        }
        self.rq.send(Request::logout()).await
    }

    pub async fn create_room(&self, name: &str) -> Result<RoomInfo> {
        let reply = self
            .rq
            .call(
                Request::create_room(name),
                EventName::CreateRoom,
                self.timeouts.default_timeout(),
            )
            .await?
            .check()?;
        Ok(room_or_requested(&reply, name))
    }

    pub async fn join_room(&self, name: &str) -> Result<RoomInfo> {
        let reply = self
            .rq
            .call(
                Request::join_room(name),
                EventName::JoinRoom,
                self.timeouts.join_timeout(),
            )
            .await?
            .check()?;
        Ok(room_or_requested(&reply, name))
    }

    pub async fn room_history(&self, name: &str, page: u32) -> Result<HistoryBatch> {
        let reply = self
            .rq
            .call(
                Request::room_history(name, page),
                EventName::GetRoomChatMes,
                self.timeouts.history_timeout(),
            )
            .await?
            .check()?;
        Ok(HistoryBatch::from_payload(&reply.payload))
    }

    pub async fn people_history(&self, name: &str, page: u32) -> Result<HistoryBatch> {
        let reply = self
            .rq
            .call(
                Request::people_history(name, page),
                EventName::GetPeopleChatMes,
                self.timeouts.history_timeout(),
            )
            .await?
            .check()?;
        Ok(HistoryBatch::from_payload(&reply.payload))
    }

    pub async fn history(&self, conv: &Conversation, page: u32) -> Result<HistoryBatch> {
        match conv.target {
            ChatTarget::Room => self.room_history(&conv.to, page).await,
            ChatTarget::People => self.people_history(&conv.to, page).await,
        }
    }

    /// `mes` goes out as given; encoding is the caller's job.
    pub async fn send_chat(&self, target: ChatTarget, to: &str, mes: &str) -> Result<()> {
        self.rq.send(Request::send_chat(target, to, mes)).await
    }

    pub async fn check_user_online(&self, user: &str) -> Result<bool> {
        let reply = self
            .rq
            .call(
                Request::check_user_online(user),
                EventName::CheckUserOnline,
                self.timeouts.presence_timeout(),
            )
            .await?;
        Ok(parse_online(&reply))
    }

    pub async fn check_user_exist(&self, user: &str) -> Result<bool> {
        let reply = self
            .rq
            .call(
                Request::check_user_exist(user),
                EventName::CheckUserExist,
                self.timeouts.lookup_timeout(),
            )
            .await?;
        Ok(parse_exists(&reply))
    }

    pub async fn user_list(&self) -> Result<Directory> {
        let reply = self
            .rq
            .call(
                Request::user_list(),
                EventName::GetUserList,
                self.timeouts.lookup_timeout(),
            )
            .await?
            .check()?;
        Ok(Directory::from_payload(&reply.payload))
    }
}

fn room_or_requested(reply: &Reply, requested: &str) -> RoomInfo {
    RoomInfo::from_reply(reply).unwrap_or_else(|| RoomInfo {
        name: requested.to_string(),
        owner: None,
    })
}
