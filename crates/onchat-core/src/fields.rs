//! Field-priority lookups over loosely-typed JSON.
//!
//! A JSON `null` counts as absent, so `{"mes": null, "message": "hi"}`
//! resolves to `"hi"`.

use serde_json::Value;

/// First non-null value among `keys`, looked up on `v` in order.
pub(crate) fn pick<'a>(v: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| v.get(*k))
        .find(|x| !x.is_null())
}

/// `frame.data.<key>`, falling back to `frame.<key>`.
pub(crate) fn pick_nested<'a>(frame: &'a Value, key: &str) -> Option<&'a Value> {
    frame
        .get("data")
        .and_then(|d| d.get(key))
        .filter(|x| !x.is_null())
        .or_else(|| frame.get(key).filter(|x| !x.is_null()))
}

/// Scalar rendering: strings as-is, numbers and booleans via their JSON text.
pub(crate) fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Like [`scalar_text`] but renders objects and arrays as compact JSON.
pub(crate) fn any_text(v: &Value) -> String {
    match v {
        Value::Null => String::new(),
        other => scalar_text(other).unwrap_or_else(|| other.to_string()),
    }
}
