//! In-process mock of the onchat endpoint (axum ws).
#![allow(dead_code)]
#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use onchat_client::config::ClientConfig;

/// Maps one inbound request to the frames sent back, in order.
pub type Script = Arc<dyn Fn(&Value) -> Vec<Value> + Send + Sync>;

#[derive(Clone)]
struct MockState {
    script: Script,
    connections: Arc<AtomicUsize>,
    received: Arc<Mutex<Vec<Value>>>,
    kill: broadcast::Sender<()>,
    push: broadcast::Sender<String>,
}

pub struct MockServer {
    pub addr: SocketAddr,
    state: MockState,
}

impl MockServer {
    pub async fn start<F>(script: F) -> Self
    where
        F: Fn(&Value) -> Vec<Value> + Send + Sync + 'static,
    {
        let (kill, _) = broadcast::channel(8);
        let (push, _) = broadcast::channel(64);
        let state = MockState {
            script: Arc::new(script),
            connections: Arc::new(AtomicUsize::new(0)),
            received: Arc::new(Mutex::new(Vec::new())),
            kill,
            push,
        };

        let app = Router::new()
            .route("/ws", get(ws_handler))
            .with_state(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self { addr, state }
    }

    /// Server that never answers requests.
    pub async fn silent() -> Self {
        Self::start(|_| Vec::new()).await
    }

    pub fn url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Sockets accepted so far.
    pub fn connections(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    /// Drop every open socket without a close frame.
    pub fn drop_all(&self) {
        let _ = self.state.kill.send(());
    }

    /// Unsolicited frame to every open socket.
    pub fn push(&self, frame: Value) {
        let _ = self.state.push.send(frame.to_string());
    }

    pub fn push_raw(&self, text: &str) {
        let _ = self.state.push.send(text.to_string());
    }

    /// Requests received so far, in arrival order.
    pub fn received(&self) -> Vec<Value> {
        self.state.received.lock().unwrap().clone()
    }

    pub fn received_events(&self) -> Vec<String> {
        self.received()
            .iter()
            .map(|v| request_event(v).to_string())
            .collect()
    }
}

async fn ws_handler(ws: WebSocketUpgrade, State(st): State<MockState>) -> Response {
    // before the 101 goes out, so the client never sees open ahead of these
    st.connections.fetch_add(1, Ordering::SeqCst);
    let kill = st.kill.subscribe();
    let push = st.push.subscribe();
    ws.on_upgrade(move |socket| serve_socket(st, socket, kill, push))
}

async fn serve_socket(
    st: MockState,
    mut socket: WebSocket,
    mut kill: broadcast::Receiver<()>,
    mut push: broadcast::Receiver<String>,
) {
    loop {
        tokio::select! {
            _ = kill.recv() => return,
            pushed = push.recv() => {
                let Ok(text) = pushed else { continue };
                if socket.send(Message::Text(text)).await.is_err() {
                    return;
                }
            }
            incoming = socket.recv() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        let Ok(req) = serde_json::from_str::<Value>(&text) else { continue };
                        st.received.lock().unwrap().push(req.clone());
                        for frame in (st.script)(&req) {
                            if socket.send(Message::Text(frame.to_string())).await.is_err() {
                                return;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return,
                    Some(Ok(_)) => {}
                }
            }
        }
    }
}

/// `data.event` of an outbound envelope.
pub fn request_event(req: &Value) -> &str {
    req["data"]["event"].as_str().unwrap_or("")
}

/// `data.data` of an outbound envelope.
pub fn request_data(req: &Value) -> &Value {
    &req["data"]["data"]
}

/// Reply frame in the server's usual shape.
pub fn reply(event: &str, status: &str, data: Value) -> Value {
    json!({ "event": event, "status": status, "data": data })
}

pub fn ok(event: &str, data: Value) -> Value {
    reply(event, "success", data)
}

/// Config pointing at `url` with fast reconnects.
pub fn test_config(url: &str) -> ClientConfig {
    let mut cfg = ClientConfig::default();
    cfg.connection.url = url.to_string();
    cfg.connection.reconnect_min_delay_ms = 20;
    cfg.connection.reconnect_max_delay_ms = 100;
    cfg.requests.default_timeout_ms = 2000;
    cfg.requests.login_timeout_ms = 2000;
    cfg.requests.join_timeout_ms = 500;
    cfg.requests.history_timeout_ms = 2000;
    cfg.requests.presence_timeout_ms = 2000;
    cfg.requests.lookup_timeout_ms = 2000;
    cfg
}

/// A localhost address nothing listens on.
pub async fn refused_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("ws://{addr}/ws")
}

/// Poll `cond` every 5ms until it holds or `within` elapses.
pub async fn eventually<F: Fn() -> bool>(within: Duration, cond: F) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    loop {
        if cond() {
            return true;
        }
        if tokio::time::Instant::now() >= deadline {
            return false;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}
