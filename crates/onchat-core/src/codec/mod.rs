//! Message content codec.
//!
//! - [`text`]: transport-safe encoding of user text (base64 over UTF-8) with
//!   a lossless fallback for legacy, never-encoded payloads.
//! - [`content`]: classification of raw payloads into typed content.
//!
//! Decoding and classification are pure and total: no input makes them
//! fail. Only [`encode_outbound`] can refuse content (oversized files,
//! folders).

pub mod content;
pub mod text;

pub use content::{
    classify, classify_str, encode_outbound, Content, ContentKind, FileBlob, FolderSummary,
    FILE_MARKER, MAX_FILE_BYTES, STICKER_PREFIX,
};
pub use text::{decode_text, encode_text};
