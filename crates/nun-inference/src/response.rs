//! Tolerant parsing of structured capability output.
//!
//! Models constrained to JSON still occasionally wrap the object in Markdown
//! fences or report numbers as strings. These helpers absorb that without
//! accepting anything structurally wrong.

use serde_json::{Map, Value};

/// Parse a response into a JSON value, unwrapping ```json fences.
pub fn parse_json(response: &str) -> Option<Value> {
    let trimmed = response.trim();
    let body = strip_code_fence(trimmed).unwrap_or(trimmed);
    serde_json::from_str(body).ok()
}

fn strip_code_fence(text: &str) -> Option<&str> {
    let inner = text.strip_prefix("```")?.strip_suffix("```")?;
    // Drop an info string such as `json` on the opening fence line.
    let inner = match inner.find('\n') {
        Some(newline) if !inner[..newline].trim().starts_with('{') => &inner[newline + 1..],
        _ => inner,
    };
    Some(inner.trim())
}

/// First string field among `keys`.
pub fn string_field<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| object.get(*k))
        .and_then(Value::as_str)
}

/// First numeric field among `keys`; numeric strings are accepted.
pub fn number_field(object: &Map<String, Value>, keys: &[&str]) -> Option<f32> {
    match keys.iter().find_map(|k| object.get(*k))? {
        Value::Number(n) => n.as_f64().map(|v| v as f32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
