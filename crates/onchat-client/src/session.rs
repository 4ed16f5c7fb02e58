//! Session: the one owner of bus, socket, correlator and API.
//!
//! Built explicitly with [`Session::start`] and torn down with
//! [`Session::shutdown`]; everything else borrows from it.

use std::sync::{Arc, PoisonError, RwLock};

use onchat_core::codec::{encode_outbound, Content, FileBlob};
use onchat_core::error::Result;
use onchat_core::message::{ChatMessage, MessageIds};
use onchat_core::protocol::{ChatTarget, Conversation, LoginGrant};

use crate::api::ChatApi;
use crate::config::ClientConfig;
use crate::events::EventBus;
use crate::feed::ChatFeed;
use crate::rpc::Correlator;
use crate::transport::Connection;

/// Logged-in username, shared with feeds for side derivation.
#[derive(Debug, Clone, Default)]
pub struct LocalUser(Arc<RwLock<Option<String>>>);

impl LocalUser {
    pub fn get(&self) -> Option<String> {
        self.0.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set(&self, user: Option<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = user;
    }
}

pub struct Session {
    cfg: ClientConfig,
    bus: EventBus,
    conn: Connection,
    api: ChatApi<Correlator>,
    ids: Arc<MessageIds>,
    me: LocalUser,
}

impl Session {
    /// Wire all parts and start connecting. Must run inside a tokio runtime.
    pub fn start(cfg: ClientConfig) -> Self {
        let bus = EventBus::new();
        let conn = Connection::new(cfg.connection.clone(), bus.clone());
        let api = ChatApi::new(Correlator::new(conn.clone()), cfg.requests.clone());
        conn.connect();

        Self {
            cfg,
            bus,
            conn,
            api,
            ids: Arc::new(MessageIds::new()),
            me: LocalUser::default(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.cfg
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn api(&self) -> &ChatApi<Correlator> {
        &self.api
    }

    pub fn local_user(&self) -> Option<String> {
        self.me.get()
    }

    pub async fn login(&self, user: &str, pass: &str) -> Result<LoginGrant> {
        let grant = self.api.login(user, pass).await?;
        self.me.set(Some(grant.user.clone().unwrap_or_else(|| user.to_string())));
        Ok(grant)
    }

    /// RE_LOGIN with a code from an earlier grant.
    pub async fn resume(&self, user: &str, code: &str) -> Result<LoginGrant> {
        let grant = self.api.relogin(user, code).await?;
        self.me.set(Some(grant.user.clone().unwrap_or_else(|| user.to_string())));
        Ok(grant)
    }

    pub async fn logout(&self) -> Result<()> {
        self.api.logout().await?;
        self.me.set(None);
        Ok(())
    }

    /// Live messages, restricted to `conversation` when given.
    pub fn feed(&self, conversation: Option<Conversation>) -> ChatFeed {
        ChatFeed::open(&self.bus, conversation, self.me.clone(), Arc::clone(&self.ids))
    }

    /// First history page, oldest first. Rooms are joined beforehand; a
    /// failed join does not stop the fetch.
    pub async fn load_history(&self, conv: &Conversation) -> Result<Vec<ChatMessage>> {
        if conv.target == ChatTarget::Room {
            self.join_quietly(&conv.to).await;
        }
        let batch = self.api.history(conv, 1).await?;
        let me = self.me.get();
        Ok(batch.normalize(me.as_deref(), &self.ids))
    }

    /// Returns the optimistic local message, or `None` for blank input.
    pub async fn send_text(&self, conv: &Conversation, text: &str) -> Result<Option<ChatMessage>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        if conv.target == ChatTarget::Room {
            self.join_quietly(&conv.to).await;
        }
        self.send_content(conv, Content::Text(text.to_string()))
            .await
            .map(Some)
    }

    pub async fn send_sticker(&self, conv: &Conversation, url: &str) -> Result<ChatMessage> {
        self.send_content(conv, Content::Sticker(url.to_string())).await
    }

    pub async fn send_image(&self, conv: &Conversation, url: &str) -> Result<ChatMessage> {
        self.send_content(conv, Content::Image(url.to_string())).await
    }

    pub async fn send_file(&self, conv: &Conversation, blob: FileBlob) -> Result<ChatMessage> {
        self.send_content(conv, Content::File(blob)).await
    }

    /// Encode and send without waiting for an echo.
    pub async fn send_content(&self, conv: &Conversation, content: Content) -> Result<ChatMessage> {
        let mes = encode_outbound(&content)?;
        self.api.send_chat(conv.target, &conv.to, &mes).await?;
        let me = self.me.get();
        Ok(ChatMessage::outgoing(&self.ids, me.as_deref(), content))
    }

    /// Manual close; no reconnect follows.
    pub fn shutdown(&self) {
        tracing::info!("session shutdown");
        self.conn.close();
    }

    async fn join_quietly(&self, room: &str) {
        if let Err(e) = self.api.join_room(room).await {
            tracing::debug!(room, error = %e, "join before room action failed, continuing");
        }
    }
}
