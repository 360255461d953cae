use serde::Deserialize;
use serde_json::Value;

/// One line of a Lemon agent session file.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum LemonRecord {
    Session(SessionStartRecord),
    Message(MessageRecord),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionStartRecord {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageRecord {
    #[serde(default)]
    pub timestamp: Option<Value>,
    pub message: LemonMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LemonMessage {
    pub role: String,
    /// String for user turns, block list for assistant turns.
    #[serde(default)]
    pub content: Value,
    /// Message-level timestamp wins over the record-level one.
    #[serde(default)]
    pub timestamp: Option<Value>,
}

/// Assistant content block. Lemon has emitted both `tool_call` and
/// `tool_use` spellings across versions; arguments may live under
/// `arguments` or `input` and may be an object or a pre-serialized string.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum LemonContentItem {
    ToolCall(LemonToolInvocation),
    ToolUse(LemonToolInvocation),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LemonToolInvocation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<Value>,
    #[serde(default)]
    pub input: Option<Value>,
}
