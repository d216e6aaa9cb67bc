//! Reference extraction from nested payloads.
//!
//! Job parameters and container mounts are arbitrary JSON. Any string leaf
//! may name an input by embedding a content hash or a collection UUID, or by
//! being a UUID.

use serde_json::Value;

use prov_types::{find_reference, Locator, NodeId};

/// Every reference mentioned in `value`, in document order, without
/// duplicates. Object keys listed in `reserved` are not descended into.
pub fn references(value: &Value, reserved: &[String]) -> Vec<NodeId> {
    let mut found = Vec::new();
    collect(value, reserved, &mut found);
    found
}

fn collect(value: &Value, reserved: &[String], found: &mut Vec<NodeId>) {
    match value {
        Value::String(s) => {
            if let Some(id) = find_reference(s) {
                if !found.contains(&id) {
                    found.push(id);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect(item, reserved, found);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                if reserved.iter().any(|r| r == key) {
                    continue;
                }
                collect(item, reserved, found);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Returns `true` if some string leaf of `value` contains `hash` literally.
pub fn mentions_hash(value: &Value, hash: &Locator) -> bool {
    let needle = hash.strip_hints().to_string();
    mentions(value, &needle)
}

fn mentions(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => str_mentions(s, needle),
        Value::Array(items) => items.iter().any(|v| mentions(v, needle)),
        Value::Object(map) => map.values().any(|v| mentions(v, needle)),
        Value::Null | Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Returns `true` if `s` contains the hint-free locator text `needle` and
/// the match is not the prefix of a longer size.
pub(crate) fn str_mentions(s: &str, needle: &str) -> bool {
    s.match_indices(needle).any(|(at, _)| {
        !s.as_bytes()
            .get(at + needle.len())
            .is_some_and(u8::is_ascii_digit)
    })
}
