//! Transport-safe text encoding.
//!
//! User text may contain any Unicode (diacritics, emoji). It is sent as
//! standard padded base64 of its UTF-8 bytes. Older peers send plain text,
//! so decoding falls back to the input whenever it is not valid base64 or
//! does not decode to valid UTF-8.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

/// Encode arbitrary text for the wire.
pub fn encode_text(s: &str) -> String {
    STANDARD.encode(s.as_bytes())
}

/// Best-effort decode; returns `s` unchanged when it was never encoded.
pub fn decode_text(s: &str) -> String {
    match STANDARD.decode(s) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(decoded) => decoded,
            Err(_) => {
                tracing::trace!("payload decodes to non-utf8 bytes; keeping raw text");
                s.to_string()
            }
        },
        Err(_) => s.to_string(),
    }
}
