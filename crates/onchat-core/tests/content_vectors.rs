//! Content classification vector tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use onchat_core::codec::{
    classify, classify_str, decode_text, encode_outbound, encode_text, Content, ContentKind,
    FileBlob, FolderSummary, MAX_FILE_BYTES,
};
use serde_json::json;

mod vector_loader;
use vector_loader::{content_as_json, load};

#[test]
fn content_vectors() {
    for v in load("content.json") {
        let got = classify(&v.raw);
        assert_eq!(got.kind().as_str(), v.expect.kind, "vector={}", v.description);
        assert_eq!(content_as_json(&got), v.expect.content, "vector={}", v.description);
    }
}

#[test]
fn classification_is_idempotent() {
    for v in load("content.json") {
        assert_eq!(classify(&v.raw), classify(&v.raw), "vector={}", v.description);
    }
}

#[test]
fn text_round_trips_through_encoding() {
    let samples = [
        "",
        "plain ascii",
        "Tiếng Việt có dấu",
        "emoji 👍🏽🎉 and 𝄞",
        "line\nbreaks\tand tabs",
        "STICKER|not really a sticker",
    ];
    for s in samples {
        assert_eq!(decode_text(&encode_text(s)), s);
    }
}

#[test]
fn never_encoded_text_is_preserved() {
    for s in ["hello world", "chào bạn", "a?b", "{\"x\":"] {
        assert_eq!(decode_text(s), s);
    }
}

#[test]
fn sticker_wins_over_image_extension() {
    let c = classify_str("STICKER|https://x/y.png");
    assert_eq!(c, Content::Sticker("https://x/y.png".into()));
}

#[test]
fn outbound_encoding_matches_classifier() {
    let sticker = Content::Sticker("https://s/1.webp".into());
    let wire = encode_outbound(&sticker).unwrap();
    assert_eq!(wire, "STICKER|https://s/1.webp");
    assert_eq!(classify_str(&wire), sticker);

    let text = Content::Text("👋 hi".into());
    let wire = encode_outbound(&text).unwrap();
    assert_ne!(wire, "👋 hi");
    assert_eq!(classify_str(&wire), text);

    let image = Content::Image("https://i.ibb.co/x/cat.jpeg".into());
    assert_eq!(classify_str(&encode_outbound(&image).unwrap()), image);
}

#[test]
fn file_blob_from_bytes_is_classified_as_file() {
    let blob = FileBlob::from_bytes("notes.txt", "text/plain", b"hello").unwrap();
    assert_eq!(blob.size, "0.0 KB");
    assert_eq!(blob.data, "data:text/plain;base64,aGVsbG8=");

    let wire = encode_outbound(&Content::File(blob.clone())).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&wire).unwrap();
    assert_eq!(parsed["dataType"], json!("file_base64"));
    assert_eq!(parsed["type"], json!("text/plain"));
    assert_eq!(classify_str(&wire), Content::File(blob));
}

#[test]
fn oversized_file_is_rejected() {
    let big = vec![0u8; MAX_FILE_BYTES + 1];
    let err = FileBlob::from_bytes("big.bin", "application/octet-stream", &big).unwrap_err();
    assert_eq!(err.kind().as_str(), "BAD_REQUEST");
}

#[test]
fn folders_cannot_be_sent() {
    let folder = Content::Folder(FolderSummary { name: "photos".into(), item_count: 3 });
    assert_eq!(folder.kind(), ContentKind::Folder);
    let err = encode_outbound(&folder).unwrap_err();
    assert_eq!(err.kind().as_str(), "BAD_REQUEST");
}
