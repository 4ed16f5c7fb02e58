//! Connection manager.
//!
//! State machine over one socket:
//! - `connect()` is a no-op while `Open` or `Connecting`
//! - open resets the attempt counter and publishes `open`
//! - every text frame publishes `message`, then `json` if it parses
//! - any close publishes `close` and, unless closed manually, schedules a
//!   reconnect after [`Backoff::delay`]
//! - `close()` during an in-flight connect is suppressed; the handshake is
//!   allowed to finish

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;

use onchat_core::error::{OnchatError, Result};

use crate::config::ConnectionSection;
use crate::events::{CloseInfo, Event, EventBus, RawFrame};
use crate::transport::backoff::Backoff;
use crate::transport::codec::{decode, Inbound};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Closing,
    Closed,
}

impl ConnectionState {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionState::Idle => "idle",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Closing => "closing",
            ConnectionState::Closed => "closed",
        }
    }
}

#[derive(Debug)]
enum Command {
    Frame(String),
    Close { code: u16, reason: String },
}

#[derive(Debug, Default)]
struct Control {
    manual_close: bool,
    pending_open: bool,
    attempts: u32,
    /// Bumped per socket; events from an older socket are ignored.
    generation: u64,
    outbound: Option<mpsc::UnboundedSender<Command>>,
}

struct Inner {
    cfg: ConnectionSection,
    backoff: Backoff,
    bus: EventBus,
    state: watch::Sender<ConnectionState>,
    ctl: Mutex<Control>,
}

impl Inner {
    fn ctl(&self) -> MutexGuard<'_, Control> {
        self.ctl.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn set_state(&self, next: ConnectionState) {
        let prev = self.state.send_replace(next);
        if prev != next {
            tracing::debug!(from = prev.as_str(), to = next.as_str(), "connection state");
        }
    }

    fn on_open(&self, generation: u64) {
        {
            let mut ctl = self.ctl();
            if ctl.generation != generation {
                return;
            }
            ctl.pending_open = false;
            ctl.attempts = 0;
        }
        self.set_state(ConnectionState::Open);
        tracing::info!(url = %self.cfg.url, "connected");
        self.bus.publish(&Event::Open);
    }

    fn on_text(&self, raw: String, json: Option<serde_json::Value>) {
        tracing::debug!(frame = %raw, "recv");
        self.bus.publish(&Event::Message(RawFrame::Text(raw)));
        if let Some(v) = json {
            self.bus.publish(&Event::Json(v));
        }
    }

    /// Returns the reconnect delay, if one should be scheduled.
    fn on_closed(&self, generation: u64, info: CloseInfo) -> Option<Duration> {
        let delay = {
            let mut ctl = self.ctl();
            if ctl.generation != generation {
                return None;
            }
            ctl.pending_open = false;
            ctl.outbound = None;

            let delay = if ctl.manual_close || !self.cfg.reconnect {
                None
            } else if self
                .cfg
                .reconnect_max_attempts
                .is_some_and(|max| ctl.attempts >= max)
            {
                tracing::warn!(attempts = ctl.attempts, "reconnect attempts exhausted, giving up");
                None
            } else {
                let d = self.backoff.delay(ctl.attempts);
                ctl.attempts += 1;
                Some(d)
            };

            // with the writer gone, no reader may still see `Open`
            self.set_state(ConnectionState::Closed);
            delay
        };

        tracing::info!(code = ?info.code, reason = %info.reason, "connection closed");
        self.bus.publish(&Event::Close(info));
        delay
    }
}

/// Handle to the single socket. Clones share state.
#[derive(Clone)]
pub struct Connection {
    inner: Arc<Inner>,
}

impl Connection {
    pub fn new(cfg: ConnectionSection, bus: EventBus) -> Self {
        let (state, _) = watch::channel(ConnectionState::Idle);
        Self {
            inner: Arc::new(Inner {
                backoff: Backoff::from_config(&cfg),
                cfg,
                bus,
                state,
                ctl: Mutex::new(Control::default()),
            }),
        }
    }

    pub fn bus(&self) -> &EventBus {
        &self.inner.bus
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state()
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Reconnect attempts since the last successful open.
    pub fn attempts(&self) -> u32 {
        self.inner.ctl().attempts
    }

    /// Start a socket unless one is open or opening. Must run inside a
    /// tokio runtime.
    pub fn connect(&self) {
        let (generation, rx) = {
            let mut ctl = self.inner.ctl();
            let state = self.inner.state();
            if matches!(state, ConnectionState::Open | ConnectionState::Connecting) {
                tracing::debug!(state = state.as_str(), "connect ignored");
                return;
            }
            ctl.manual_close = false;
            ctl.pending_open = true;
            ctl.generation += 1;
            let (tx, rx) = mpsc::unbounded_channel();
            ctl.outbound = Some(tx);
            self.inner.set_state(ConnectionState::Connecting);
            (ctl.generation, rx)
        };

        tracing::info!(url = %self.inner.cfg.url, generation, "connecting");
        tokio::spawn(run_socket(Arc::clone(&self.inner), generation, rx));
    }

    /// Manual close with code 1000.
    pub fn close(&self) {
        self.close_with(1000, "");
    }

    pub fn close_with(&self, code: u16, reason: &str) {
        let mut ctl = self.inner.ctl();
        if ctl.pending_open {
            ctl.manual_close = false;
            tracing::warn!("close requested while connecting, ignored");
            return;
        }
        ctl.manual_close = true;
        if let Some(tx) = ctl.outbound.as_ref() {
            if tx
                .send(Command::Close {
                    code,
                    reason: reason.to_string(),
                })
                .is_ok()
            {
                self.inner.set_state(ConnectionState::Closing);
            }
        }
    }

    /// Queue one text frame. Fails unless the socket is open.
    pub fn send_text(&self, text: String) -> Result<()> {
        let ctl = self.inner.ctl();
        if self.inner.state() != ConnectionState::Open {
            return Err(OnchatError::ConnectionClosed("socket is not open".into()));
        }
        let tx = ctl
            .outbound
            .as_ref()
            .ok_or_else(|| OnchatError::ConnectionClosed("socket is not open".into()))?;
        tracing::debug!(frame = %text, "send");
        tx.send(Command::Frame(text))
            .map_err(|_| OnchatError::Transport("socket writer is gone".into()))
    }

    /// Resolve once the socket is open. Starts a connect from `Idle` or
    /// `Closed`; fails if the socket closes before opening.
    pub async fn wait_for_open(&self) -> Result<()> {
        let mut rx = self.inner.state.subscribe();
        let current = *rx.borrow_and_update();
        match current {
            ConnectionState::Open => return Ok(()),
            ConnectionState::Idle | ConnectionState::Closed => self.connect(),
            ConnectionState::Connecting | ConnectionState::Closing => {}
        }

        let reached = rx
            .wait_for(|s| matches!(s, ConnectionState::Open | ConnectionState::Closed))
            .await
            .map(|s| *s)
            .map_err(|_| OnchatError::Internal("connection state dropped".into()))?;

        match reached {
            ConnectionState::Open => Ok(()),
            _ => Err(OnchatError::ConnectionClosed(
                "socket closed before opening".into(),
            )),
        }
    }
}

fn schedule_reconnect(inner: Weak<Inner>, delay: Duration) {
    tracing::info!(delay_ms = delay.as_millis() as u64, "reconnect scheduled");
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let Some(inner) = inner.upgrade() else { return };
        if inner.ctl().manual_close {
            tracing::debug!("reconnect cancelled by manual close");
            return;
        }
        Connection { inner }.connect();
    });
}

async fn run_socket(
    inner: Arc<Inner>,
    generation: u64,
    mut out_rx: mpsc::UnboundedReceiver<Command>,
) {
    let info = drive(&inner, generation, &mut out_rx).await;
    if let Some(delay) = inner.on_closed(generation, info) {
        schedule_reconnect(Arc::downgrade(&inner), delay);
    }
}

async fn drive(
    inner: &Inner,
    generation: u64,
    out_rx: &mut mpsc::UnboundedReceiver<Command>,
) -> CloseInfo {
    let ws = match tokio_tungstenite::connect_async(inner.cfg.url.as_str()).await {
        Ok((ws, _resp)) => ws,
        Err(e) => {
            tracing::warn!(url = %inner.cfg.url, error = %e, "connect failed");
            inner.bus.publish(&Event::Error(e.to_string()));
            return CloseInfo {
                code: None,
                reason: e.to_string(),
            };
        }
    };

    inner.on_open(generation);
    let (mut ws_tx, mut ws_rx) = ws.split();

    loop {
        tokio::select! {
            // outbound writer
            cmd = out_rx.recv() => {
                match cmd {
                    Some(Command::Frame(text)) => {
                        if let Err(e) = ws_tx.send(Message::Text(text.into())).await {
                            inner.bus.publish(&Event::Error(e.to_string()));
                            return CloseInfo { code: None, reason: e.to_string() };
                        }
                    }
                    Some(Command::Close { code, reason }) => {
                        let frame = CloseFrame {
                            code: CloseCode::from(code),
                            reason: reason.clone().into(),
                        };
                        let _ = ws_tx.send(Message::Close(Some(frame))).await;
                        return CloseInfo { code: Some(code), reason };
                    }
                    None => return CloseInfo::default(),
                }
            }

            // inbound reader
            incoming = ws_rx.next() => {
                let Some(incoming) = incoming else {
                    return CloseInfo { code: None, reason: "stream ended".into() };
                };
                match incoming {
                    Ok(msg) => match decode(msg) {
                        Inbound::Text { raw, json } => inner.on_text(raw, json),
                        Inbound::Binary(b) => inner.bus.publish(&Event::Message(RawFrame::Binary(b))),
                        Inbound::Close(info) => return info,
                        Inbound::Control => {}
                    },
                    Err(e) => {
                        tracing::warn!(error = %e, "socket error");
                        inner.bus.publish(&Event::Error(e.to_string()));
                        return CloseInfo { code: None, reason: e.to_string() };
                    }
                }
            }
        }
    }
}

#[cfg(test)]
impl Connection {
    /// Reports `Open` while the writer half is already gone.
    pub(crate) fn open_with_dead_writer(&self) {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let mut ctl = self.inner.ctl();
        ctl.generation += 1;
        ctl.outbound = Some(tx);
        self.inner.set_state(ConnectionState::Open);
    }
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::events::Channel;

    fn offline() -> Connection {
        let cfg = ConnectionSection {
            url: "ws://127.0.0.1:9/ws".into(),
            reconnect: false,
            ..ConnectionSection::default()
        };
        Connection::new(cfg, EventBus::new())
    }

    #[test]
    fn send_with_dead_writer_is_transport_error() {
        let conn = offline();
        conn.open_with_dead_writer();
        assert!(conn.is_open());

        let err = conn.send_text("{}".into()).expect_err("writer is gone");
        assert_eq!(err.kind().as_str(), "TRANSPORT");
    }

    #[test]
    fn closed_state_lands_with_writer_teardown() {
        let conn = offline();
        conn.open_with_dead_writer();
        let generation = conn.inner.ctl().generation;

        let saw_closed = Arc::new(AtomicBool::new(false));
        let seen = Arc::clone(&saw_closed);
        let watcher = conn.clone();
        let _sub = conn.bus().subscribe(Channel::Close, move |_| {
            let state = watcher.state();
            let rejected = watcher
                .send_text("{}".into())
                .is_err_and(|e| e.kind().as_str() == "CONNECTION_CLOSED");
            seen.store(state == ConnectionState::Closed && rejected, Ordering::SeqCst);
        });

        let delay = conn.inner.on_closed(generation, CloseInfo::default());
        assert!(delay.is_none());
        {
            let ctl = conn.inner.ctl();
            assert!(ctl.outbound.is_none());
            assert_eq!(conn.state(), ConnectionState::Closed);
        }
        assert!(saw_closed.load(Ordering::SeqCst));
    }

    #[test]
    fn stale_generation_close_is_ignored() {
        let conn = offline();
        conn.open_with_dead_writer();
        let stale = conn.inner.ctl().generation - 1;

        assert!(conn.inner.on_closed(stale, CloseInfo::default()).is_none());
        assert_eq!(conn.state(), ConnectionState::Open);
    }
}
