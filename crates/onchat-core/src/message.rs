//! Canonical decoded chat message.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Local;

use crate::codec::{Content, ContentKind};

/// Which side of the conversation a bubble belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Someone else.
    Left,
    /// The local user.
    Right,
}

impl Side {
    pub fn as_str(self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// A message ready for display.
///
/// `id` is a local counter and never a server identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub id: u64,
    pub side: Side,
    pub author: Option<String>,
    pub content: Content,
    pub time: String,
}

impl ChatMessage {
    pub fn kind(&self) -> ContentKind {
        self.content.kind()
    }

    /// A message authored locally, shown before the server echoes anything.
    pub fn outgoing(ids: &MessageIds, author: Option<&str>, content: Content) -> Self {
        Self {
            id: ids.next(),
            side: Side::Right,
            author: author.map(str::to_string),
            content,
            time: display_time(None),
        }
    }
}

/// Monotonic local message id source, shared by history and live delivery.
#[derive(Debug)]
pub struct MessageIds {
    next: AtomicU64,
}

impl Default for MessageIds {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageIds {
    pub fn new() -> Self {
        Self { next: AtomicU64::new(1) }
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Case-insensitive, trimmed identity comparison. Empty names never match.
pub fn is_same_user(a: Option<&str>, b: Option<&str>) -> bool {
    let a = a.unwrap_or("").trim().to_lowercase();
    let b = b.unwrap_or("").trim().to_lowercase();
    !a.is_empty() && a == b
}

/// Server-supplied display time, or the local wall clock as `HH:MM`.
pub fn display_time(server_time: Option<&str>) -> String {
    match server_time {
        Some(t) => t.to_string(),
        None => Local::now().format("%H:%M").to_string(),
    }
}
