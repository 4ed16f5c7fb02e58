//! Live chat delivery.
//!
//! Decodes `json` pushes into [`ChatMessage`]s, filtered to one conversation
//! when given, and hands them out over a channel.

use std::sync::Arc;

use tokio::sync::mpsc;

use onchat_core::message::{ChatMessage, MessageIds};
use onchat_core::protocol::{Conversation, ServerEvent};

use crate::events::{Channel, EventBus, Subscription};
use crate::session::LocalUser;

pub struct ChatFeed {
    rx: mpsc::UnboundedReceiver<ChatMessage>,
    conversation: Option<Conversation>,
    _sub: Subscription,
}

impl ChatFeed {
    /// `conversation = None` delivers every chat push.
    pub fn open(
        bus: &EventBus,
        conversation: Option<Conversation>,
        me: LocalUser,
        ids: Arc<MessageIds>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let filter = conversation.clone();

        let sub = bus.subscribe(Channel::Json, move |ev| {
            let Some(frame) = ev.as_json() else { return };
            let ServerEvent::Chat(push) = ServerEvent::decode(frame) else {
                return;
            };
            let local = me.get();
            if let Some(conv) = filter.as_ref() {
                if !push.belongs_to(conv, local.as_deref()) {
                    tracing::trace!(event = ?push.event, "push for another conversation");
                    return;
                }
            }
            let _ = tx.send(push.to_message(&ids, local.as_deref()));
        });

        Self {
            rx,
            conversation,
            _sub: sub,
        }
    }

    pub fn conversation(&self) -> Option<&Conversation> {
        self.conversation.as_ref()
    }

    pub async fn recv(&mut self) -> Option<ChatMessage> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<ChatMessage> {
        self.rx.try_recv().ok()
    }
}
