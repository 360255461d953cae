//! Line builders for the three log schemas.
//!
//! Each function renders one JSONL line the way the corresponding runtime
//! writes it, so parser tests exercise the real field spellings.

use serde_json::json;

// --- Claude ---

pub fn claude_user_line(session_id: &str, cwd: &str, timestamp: &str, text: &str) -> String {
    json!({
        "type": "user",
        "sessionId": session_id,
        "cwd": cwd,
        "timestamp": timestamp,
        "message": {"role": "user", "content": text}
    })
    .to_string()
}

pub fn claude_assistant_tools_line(session_id: &str, timestamp: &str, tools: &[&str]) -> String {
    let content: Vec<_> = tools
        .iter()
        .enumerate()
        .map(|(i, name)| {
            json!({
                "type": "tool_use",
                "id": format!("toolu_{}_{}", session_id, i),
                "name": name,
                "input": {"file_path": "/tmp/example"}
            })
        })
        .collect();
    json!({
        "type": "assistant",
        "sessionId": session_id,
        "timestamp": timestamp,
        "message": {"role": "assistant", "content": content}
    })
    .to_string()
}

pub fn claude_tool_result_line(session_id: &str, tool_use_id: &str, is_error: bool) -> String {
    json!({
        "type": "user",
        "sessionId": session_id,
        "message": {"role": "user", "content": [
            {"type": "tool_result", "tool_use_id": tool_use_id, "is_error": is_error}
        ]}
    })
    .to_string()
}

// --- Codex ---

pub fn codex_session_meta_line(session_id: &str, cwd: &str, timestamp: &str) -> String {
    json!({
        "type": "session_meta",
        "timestamp": timestamp,
        "payload": {
            "id": session_id,
            "timestamp": timestamp,
            "cwd": cwd,
            "originator": "cli",
            "cli_version": "0.1.0",
            "source": "cli"
        }
    })
    .to_string()
}

pub fn codex_user_message_line(timestamp: &str, text: &str) -> String {
    json!({
        "type": "response_item",
        "timestamp": timestamp,
        "payload": {"type": "message", "role": "user", "content": [
            {"type": "input_text", "text": text}
        ]}
    })
    .to_string()
}

pub fn codex_function_call_line(timestamp: &str, name: &str, arguments: &str) -> String {
    json!({
        "type": "response_item",
        "timestamp": timestamp,
        "payload": {
            "type": "function_call",
            "name": name,
            "arguments": arguments,
            "call_id": "call_1"
        }
    })
    .to_string()
}

pub fn codex_history_line(session_id: &str, ts: i64, text: &str) -> String {
    json!({"session_id": session_id, "ts": ts, "text": text}).to_string()
}

// --- Lemon ---

pub fn lemon_session_line(session_id: &str, cwd: &str) -> String {
    json!({"type": "session", "id": session_id, "cwd": cwd}).to_string()
}

pub fn lemon_user_line(timestamp: i64, text: &str) -> String {
    json!({
        "type": "message",
        "timestamp": timestamp,
        "message": {"role": "user", "content": text}
    })
    .to_string()
}

pub fn lemon_tool_line(timestamp: i64, tools: &[&str]) -> String {
    let content: Vec<_> = tools
        .iter()
        .map(|name| json!({"type": "tool_call", "name": name, "arguments": {"arg": 1}}))
        .collect();
    json!({
        "type": "message",
        "timestamp": timestamp,
        "message": {"role": "assistant", "content": content}
    })
    .to_string()
}
