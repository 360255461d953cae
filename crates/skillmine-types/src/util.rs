use chrono::DateTime;
use serde_json::Value;

/// Serialized tool arguments are truncated to this many chars.
pub const MAX_ARGUMENTS_LEN: usize = 1024;

/// Session first_prompt fields are truncated to this many chars.
pub const FIRST_PROMPT_LEN: usize = 500;

/// Example prompts carried in summaries are truncated to this many chars.
pub const EXAMPLE_PROMPT_LEN: usize = 200;

/// Truncate a string to a maximum char count, appending an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect::<String>() + "…"
    }
}

/// Convert a log timestamp value to an RFC 3339 string.
///
/// Strings pass through unchanged; numbers are treated as epoch seconds, or
/// epoch milliseconds when larger than 1e12.
pub fn timestamp_to_rfc3339(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => {
            let raw = n.as_f64()?;
            let secs = if raw > 1e12 { raw / 1000.0 } else { raw };
            let dt = DateTime::from_timestamp(secs as i64, 0)?;
            Some(dt.to_rfc3339())
        }
        _ => None,
    }
}
