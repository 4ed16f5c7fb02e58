//! Domain calls of the onchat protocol.
//!
//! [`Requester`] is the seam between the calls and the socket: the
//! [`Correlator`](crate::rpc::Correlator) implements it for real traffic and
//! tests substitute a scripted one.

pub mod chat;

use std::time::Duration;

use async_trait::async_trait;

use onchat_core::error::Result;
use onchat_core::protocol::{EventName, Reply, Request};

use crate::rpc::Correlator;

pub use chat::ChatApi;

#[async_trait]
pub trait Requester: Send + Sync {
    /// Send `req` and resolve with the first reply tagged with any of `expect`.
    async fn call_any(&self, req: Request, expect: &[EventName], timeout: Duration)
        -> Result<Reply>;

    async fn call(&self, req: Request, expect: EventName, timeout: Duration) -> Result<Reply> {
        self.call_any(req, &[expect], timeout).await
    }

    /// Fire-and-forget.
    async fn send(&self, req: Request) -> Result<()>;

    fn is_open(&self) -> bool;
}

#[async_trait]
impl Requester for Correlator {
    async fn call_any(
        &self,
        req: Request,
        expect: &[EventName],
        timeout: Duration,
    ) -> Result<Reply> {
        Correlator::call_any(self, req, expect, timeout).await
    }

    async fn send(&self, req: Request) -> Result<()> {
        Correlator::send(self, req).await
    }

    fn is_open(&self) -> bool {
        self.connection().is_open()
    }
}
