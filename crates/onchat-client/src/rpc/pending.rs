use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::oneshot;

use onchat_core::protocol::{unwrap_frame, EventName, Reply};

use crate::events::{Channel, EventBus, Subscription};

/// Single-fire slot shared between the `json` handler and the waiter.
struct Slot {
    done: AtomicBool,
    tx: Mutex<Option<oneshot::Sender<Reply>>>,
}

impl Slot {
    /// Returns false if the slot was already settled.
    fn settle(&self, reply: Reply) -> bool {
        if self.done.swap(true, Ordering::AcqRel) {
            return false;
        }
        let tx = self.tx.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(tx) = tx {
            let _ = tx.send(reply);
        }
        true
    }
}

/// One in-flight correlated call.
///
/// Resolved by the first reply whose unwrapped event is in `expect`; later
/// replies with the same tag are ignored. Dropping it unsubscribes.
pub struct PendingRequest {
    expect: Vec<EventName>,
    slot: Arc<Slot>,
    _sub: Subscription,
}

impl PendingRequest {
    pub fn register(bus: &EventBus, expect: Vec<EventName>) -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        let slot = Arc::new(Slot {
            done: AtomicBool::new(false),
            tx: Mutex::new(Some(tx)),
        });

        let handler_slot = Arc::clone(&slot);
        let wanted = expect.clone();
        let sub = bus.subscribe(Channel::Json, move |ev| {
            let Some(frame) = ev.as_json() else { return };
            if handler_slot.done.load(Ordering::Acquire) {
                return;
            }
            let reply = unwrap_frame(frame);
            if wanted.iter().any(|e| reply.is_event(e)) && !handler_slot.settle(reply) {
                tracing::debug!("stray reply after resolution ignored");
            }
        });

        (
            Self {
                expect,
                slot,
                _sub: sub,
            },
            rx,
        )
    }

    pub fn expect(&self) -> &[EventName] {
        &self.expect
    }

    pub fn is_done(&self) -> bool {
        self.slot.done.load(Ordering::Acquire)
    }

    /// `LOGIN|RE_LOGIN`-style label for errors and logs.
    pub fn label(&self) -> String {
        self.expect
            .iter()
            .map(EventName::as_str)
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl Drop for PendingRequest {
    fn drop(&mut self) {
        self.slot.done.store(true, Ordering::Release);
    }
}
