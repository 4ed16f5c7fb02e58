//! Shared error type across onchat crates.

use thiserror::Error;

/// Caller-facing error kinds (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Socket-level failure.
    Transport,
    /// The socket closed before it opened, or was never created.
    ConnectionClosed,
    /// No matching reply within the call budget.
    Timeout,
    /// Server replied with a non-success status.
    ProtocolStatus,
    /// Invalid input (config, unsendable content).
    BadRequest,
    /// Internal failure.
    Internal,
}

impl ErrorKind {
    /// String representation used in logs and tests.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Transport => "TRANSPORT",
            ErrorKind::ConnectionClosed => "CONNECTION_CLOSED",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::ProtocolStatus => "PROTOCOL_STATUS",
            ErrorKind::BadRequest => "BAD_REQUEST",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, OnchatError>;

/// Unified error type used by core and client.
///
/// Malformed frames and undecodable text never show up here: they degrade to
/// a literal string instead.
#[derive(Debug, Error)]
pub enum OnchatError {
    #[error("transport: {0}")]
    Transport(String),
    #[error("connection closed: {0}")]
    ConnectionClosed(String),
    #[error("timed out after {after_ms}ms waiting for {event}")]
    Timeout { event: String, after_ms: u64 },
    #[error("{event} failed: {message}")]
    Status { event: String, message: String },
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl OnchatError {
    /// Map the error to a stable kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OnchatError::Transport(_) => ErrorKind::Transport,
            OnchatError::ConnectionClosed(_) => ErrorKind::ConnectionClosed,
            OnchatError::Timeout { .. } => ErrorKind::Timeout,
            OnchatError::Status { .. } => ErrorKind::ProtocolStatus,
            OnchatError::BadRequest(_) => ErrorKind::BadRequest,
            OnchatError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller may reasonably retry the same call.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            OnchatError::Transport(_) | OnchatError::ConnectionClosed(_) | OnchatError::Timeout { .. }
        )
    }
}
