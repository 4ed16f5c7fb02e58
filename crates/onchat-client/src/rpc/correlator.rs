use std::time::Duration;

use onchat_core::error::{OnchatError, Result};
use onchat_core::protocol::{EventName, Reply, Request};

use crate::events::EventBus;
use crate::rpc::pending::PendingRequest;
use crate::transport::Connection;

/// Turns `send + wait for tagged reply` into one awaitable call.
#[derive(Clone)]
pub struct Correlator {
    conn: Connection,
    bus: EventBus,
}

impl Correlator {
    pub fn new(conn: Connection) -> Self {
        let bus = conn.bus().clone();
        Self { conn, bus }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub async fn call(&self, req: Request, expect: EventName, timeout: Duration) -> Result<Reply> {
        self.call_any(req, &[expect], timeout).await
    }

    /// Resolve with the first reply tagged with any of `expect`.
    ///
    /// The budget covers waiting for the socket to open as well. A close
    /// after sending does not fail the call early; it runs into its timeout.
    pub async fn call_any(
        &self,
        req: Request,
        expect: &[EventName],
        timeout: Duration,
    ) -> Result<Reply> {
        let (pending, rx) = PendingRequest::register(&self.bus, expect.to_vec());
        let label = pending.label();

        let exchange = async {
            self.conn.wait_for_open().await?;
            self.conn.send_text(req.to_text())?;
            rx.await
                .map_err(|_| OnchatError::Internal("pending request dropped".into()))
        };

        let out = match tokio::time::timeout(timeout, exchange).await {
            Ok(res) => res,
            Err(_) => {
                tracing::warn!(event = %label, after_ms = timeout.as_millis() as u64, "request timed out");
                Err(OnchatError::Timeout {
                    event: label,
                    after_ms: timeout.as_millis() as u64,
                })
            }
        };
        drop(pending);
        out
    }

    /// Fire-and-forget send once the socket is open.
    pub async fn send(&self, req: Request) -> Result<()> {
        self.conn.wait_for_open().await?;
        self.conn.send_text(req.to_text())
    }
}
