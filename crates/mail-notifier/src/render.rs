//! Bounded-depth rendering of structured metadata.
//!
//! Converts an arbitrary [`serde_json::Value`] into a compact human-readable
//! string for inclusion in a notification body. Traversal depth is capped so
//! deeply nested structures cannot produce unbounded output. Rendering is
//! total: it never fails, whatever the input.

use std::fmt::Write;

use serde_json::Value;

/// Placeholder emitted where the depth cap cuts a nested value off.
const ELIDED: &str = "…";

/// Renders `value`, visiting nested containers at most `max_depth` levels
/// deep.
///
/// Objects render as `{ key: value, ... }`, arrays as `[a, b]`, strings
/// quoted. Containers below the depth cap collapse to `{…}` / `[…]`.
#[must_use]
pub fn render(value: &Value, max_depth: usize) -> String {
    let mut out = String::new();
    write_value(&mut out, value, max_depth);
    out
}

fn write_value(out: &mut String, value: &Value, depth: usize) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => {
            let _ = write!(out, "{b}");
        }
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::String(s) => {
            let _ = write!(out, "{s:?}");
        }
        Value::Array(items) => {
            if items.is_empty() {
                out.push_str("[]");
            } else if depth == 0 {
                out.push('[');
                out.push_str(ELIDED);
                out.push(']');
            } else {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_value(out, item, depth - 1);
                }
                out.push(']');
            }
        }
        Value::Object(map) => {
            if map.is_empty() {
                out.push_str("{}");
            } else if depth == 0 {
                out.push('{');
                out.push_str(ELIDED);
                out.push('}');
            } else {
                out.push_str("{ ");
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    let _ = write!(out, "{key}: ");
                    write_value(out, item, depth - 1);
                }
                out.push_str(" }");
            }
        }
    }
}
