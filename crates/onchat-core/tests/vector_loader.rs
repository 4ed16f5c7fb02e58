//! JSON test vector loader shared by codec tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]
#![allow(dead_code)]

use std::fs;

use serde::Deserialize;
use serde_json::Value;

use onchat_core::codec::Content;

#[derive(Debug, Deserialize)]
pub struct ContentVector {
    pub description: String,
    #[serde(default)]
    pub raw: Value,
    pub expect: Expect,
}

#[derive(Debug, Deserialize)]
pub struct Expect {
    pub kind: String,
    pub content: Value,
}

pub fn load(name: &str) -> Vec<ContentVector> {
    let s = fs::read_to_string(format!("tests/vectors/{name}")).unwrap();
    serde_json::from_str(&s).unwrap()
}

/// Render decoded content in the vector's expectation shape.
pub fn content_as_json(content: &Content) -> Value {
    match content {
        Content::Text(s) | Content::Image(s) | Content::Sticker(s) => Value::String(s.clone()),
        Content::File(f) => {
            let mut v = serde_json::json!({ "name": f.name, "size": f.size, "data": f.data });
            if let Some(mime) = &f.mime {
                v["mime"] = Value::String(mime.clone());
            }
            v
        }
        Content::Folder(f) => serde_json::json!({ "name": f.name, "itemCount": f.item_count }),
    }
}
