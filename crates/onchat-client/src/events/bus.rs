//! Event multiplexer.
//!
//! - Handlers of one channel run in subscription order.
//! - `publish` iterates a snapshot: a handler added while a publication is in
//!   flight only sees the next one.
//! - A panicking handler is logged and skipped; siblings still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tokio::sync::mpsc;

use super::{Channel, Event};

pub type Handler = Arc<dyn Fn(&Event) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: AtomicU64,
    handlers: DashMap<Channel, Vec<(u64, Handler)>>,
}

impl BusInner {
    fn remove(&self, channel: Channel, id: u64) {
        if let Some(mut list) = self.handlers.get_mut(&channel) {
            list.retain(|(hid, _)| *hid != id);
        }
    }
}

/// Cheap to clone; all clones share the same handler table.
#[derive(Clone, Default)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `f` on `channel`. The handler stays registered until the
    /// returned guard is dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, channel: Channel, f: F) -> Subscription
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .handlers
            .entry(channel)
            .or_default()
            .push((id, Arc::new(f)));

        Subscription {
            bus: Arc::downgrade(&self.inner),
            channel,
            id,
            active: true,
        }
    }

    /// Forward every event of `channel` into an unbounded queue.
    pub fn listen(&self, channel: Channel) -> (Subscription, mpsc::UnboundedReceiver<Event>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let sub = self.subscribe(channel, move |ev| {
            let _ = tx.send(ev.clone());
        });
        (sub, rx)
    }

    /// Deliver `event` to the current subscribers of its channel.
    pub fn publish(&self, event: &Event) {
        let channel = event.channel();
        let snapshot: Vec<Handler> = match self.inner.handlers.get(&channel) {
            Some(list) => list.iter().map(|(_, h)| Arc::clone(h)).collect(),
            None => return,
        };

        for handler in snapshot {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| handler(event))) {
                let msg = panic
                    .downcast_ref::<&str>()
                    .map(|s| (*s).to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "non-string panic payload".into());
                tracing::error!(channel = channel.as_str(), panic = %msg, "event handler panicked");
            }
        }
    }

    pub fn handler_count(&self, channel: Channel) -> usize {
        self.inner
            .handlers
            .get(&channel)
            .map(|list| list.len())
            .unwrap_or(0)
    }
}

/// Registration guard returned by [`EventBus::subscribe`].
#[must_use = "dropping a Subscription unsubscribes its handler"]
pub struct Subscription {
    bus: Weak<BusInner>,
    channel: Channel,
    id: u64,
    active: bool,
}

impl Subscription {
    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(bus) = self.bus.upgrade() {
            bus.remove(self.channel, self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("channel", &self.channel)
            .field("id", &self.id)
            .field("active", &self.active)
            .finish()
    }
}
