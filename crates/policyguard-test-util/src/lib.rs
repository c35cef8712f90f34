//! Shared test utilities for the policyguard workspace.
//!
//! Kept as a regular crate because `xtask` and the CLI integration tests both
//! need the scaffold writers outside of `#[cfg(test)]`.

pub mod scaffold;

use serde_json::Value;

const TIMESTAMP_KEYS: &[&str] = &["started_at", "ended_at"];

/// Normalize non-deterministic JSON fields for golden comparison.
///
/// `tool.version` is replaced only when the root looks like a report envelope
/// (`schema`, `tool`, `run`, `verdict`, `findings` all present), so finding
/// payloads with a nested `tool` object stay untouched. Timestamps and
/// `duration_ms` are normalized at any depth.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_envelope = ["schema", "tool", "run", "verdict", "findings"]
            .iter()
            .all(|k| obj.contains_key(*k));
        if is_envelope
            && let Some(tool) = obj.get_mut("tool").and_then(Value::as_object_mut)
            && tool.contains_key("version")
        {
            tool.insert("version".to_string(), Value::from("__VERSION__"));
        }
    }
    normalize_timestamps(&mut value);
    value
}

fn normalize_timestamps(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for key in TIMESTAMP_KEYS {
                if let Some(v) = map.get_mut(*key) {
                    *v = Value::from("__TIMESTAMP__");
                }
            }
            if let Some(v) = map.get_mut("duration_ms") {
                *v = Value::from(0);
            }
            map.values_mut().for_each(normalize_timestamps);
        }
        Value::Array(items) => items.iter_mut().for_each(normalize_timestamps),
        _ => {}
    }
}
