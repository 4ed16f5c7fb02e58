//! Content classification.
//!
//! The server stores an untyped string per message. Its kind is sniffed here,
//! first match wins:
//! 1. `STICKER|<url>` -> sticker
//! 2. JSON object with `"dataType": "file_base64"` -> file
//! 3. `data:image...` or a URL ending in an image extension -> image
//! 4. anything else -> text (transport-decoded, raw on failure)

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde_json::{json, Value};

use crate::error::{OnchatError, Result};
use crate::fields::{any_text, scalar_text};

use super::text::{decode_text, encode_text};

/// Prefix marking a sticker reference.
pub const STICKER_PREFIX: &str = "STICKER|";
/// `dataType` value marking a JSON-wrapped file blob.
pub const FILE_MARKER: &str = "file_base64";
/// Largest file accepted for inline sending.
pub const MAX_FILE_BYTES: usize = 5 * 1024 * 1024;

const IMAGE_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "gif", "png", "webp"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Image,
    Sticker,
    File,
    Folder,
}

impl ContentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
            ContentKind::Sticker => "sticker",
            ContentKind::File => "file",
            ContentKind::Folder => "folder",
        }
    }
}

/// File carried inline as a data-URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBlob {
    pub name: String,
    /// Human-readable size, e.g. `"12.0 KB"`.
    pub size: String,
    pub mime: Option<String>,
    /// `data:<mime>;base64,<payload>`
    pub data: String,
}

impl FileBlob {
    /// `None` unless `v` is an object carrying the file marker.
    pub fn from_value(v: &Value) -> Option<Self> {
        let obj = v.as_object()?;
        if obj.get("dataType").and_then(Value::as_str) != Some(FILE_MARKER) {
            return None;
        }
        let text = |k: &str| obj.get(k).and_then(scalar_text);
        Some(Self {
            name: text("name").unwrap_or_default(),
            size: text("size").unwrap_or_default(),
            mime: text("type").or_else(|| text("mime")),
            data: text("data").unwrap_or_default(),
        })
    }

    /// Wire object, including the marker.
    pub fn to_value(&self) -> Value {
        let mut v = json!({
            "dataType": FILE_MARKER,
            "name": self.name,
            "size": self.size,
            "data": self.data,
        });
        if let (Some(mime), Some(obj)) = (&self.mime, v.as_object_mut()) {
            obj.insert("type".into(), Value::String(mime.clone()));
        }
        v
    }

    /// Wrap raw file bytes as a data-URL blob.
    pub fn from_bytes(name: &str, mime: &str, bytes: &[u8]) -> Result<Self> {
        if bytes.len() > MAX_FILE_BYTES {
            return Err(OnchatError::BadRequest(format!(
                "file {name} is {} bytes; limit is {MAX_FILE_BYTES}",
                bytes.len()
            )));
        }
        Ok(Self {
            name: name.to_string(),
            size: format!("{:.1} KB", bytes.len() as f64 / 1024.0),
            mime: Some(mime.to_string()),
            data: format!("data:{mime};base64,{}", STANDARD.encode(bytes)),
        })
    }

    /// Approximate decoded size of the embedded payload.
    pub fn payload_bytes(&self) -> usize {
        let b64 = self.data.split_once(',').map_or(self.data.as_str(), |(_, p)| p);
        b64.len() / 4 * 3
    }
}

/// Locally selected folder. Never sent over the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderSummary {
    pub name: String,
    pub item_count: usize,
}

/// Typed message content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Image(String),
    Sticker(String),
    File(FileBlob),
    Folder(FolderSummary),
}

impl Content {
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Text(_) => ContentKind::Text,
            Content::Image(_) => ContentKind::Image,
            Content::Sticker(_) => ContentKind::Sticker,
            Content::File(_) => ContentKind::File,
            Content::Folder(_) => ContentKind::Folder,
        }
    }
}

/// Classify any JSON payload. `null` is empty text; numbers and booleans
/// are text; objects are files when marked, text (their JSON) otherwise.
pub fn classify(raw: &Value) -> Content {
    match raw {
        Value::String(s) => classify_str(s),
        Value::Object(_) => match FileBlob::from_value(raw) {
            Some(file) => Content::File(file),
            None => Content::Text(raw.to_string()),
        },
        other => Content::Text(any_text(other)),
    }
}

/// Classify a raw string payload.
pub fn classify_str(raw: &str) -> Content {
    if let Some(url) = raw.strip_prefix(STICKER_PREFIX) {
        return Content::Sticker(url.to_string());
    }

    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        if let Some(file) = serde_json::from_str::<Value>(trimmed)
            .ok()
            .as_ref()
            .and_then(FileBlob::from_value)
        {
            return Content::File(file);
        }
    }

    if raw.starts_with("data:image") || has_image_extension(raw) {
        return Content::Image(raw.to_string());
    }

    Content::Text(decode_text(raw))
}

/// `\.(jpeg|jpg|gif|png|webp)($|\?)`, case-insensitive.
fn has_image_extension(s: &str) -> bool {
    let lower = s.to_ascii_lowercase();
    lower.match_indices('.').any(|(i, _)| {
        let rest = &lower[i + 1..];
        IMAGE_EXTENSIONS.iter().any(|ext| {
            rest.strip_prefix(*ext)
                .is_some_and(|after| after.is_empty() || after.starts_with('?'))
        })
    })
}

/// Wire form of outbound content (the `mes` field of `SEND_CHAT`).
pub fn encode_outbound(content: &Content) -> Result<String> {
    match content {
        Content::Text(t) => Ok(encode_text(t)),
        Content::Image(url) => Ok(url.clone()),
        Content::Sticker(url) => Ok(format!("{STICKER_PREFIX}{url}")),
        Content::File(file) => {
            if file.payload_bytes() > MAX_FILE_BYTES {
                return Err(OnchatError::BadRequest(format!(
                    "file {} exceeds {MAX_FILE_BYTES} bytes",
                    file.name
                )));
            }
            Ok(file.to_value().to_string())
        }
        Content::Folder(f) => Err(OnchatError::BadRequest(format!(
            "folder {} cannot be sent",
            f.name
        ))),
    }
}
