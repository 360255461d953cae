use serde::Deserialize;
use serde_json::Value;

/// One line of a Codex session file.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum CodexRecord {
    SessionMeta(SessionMetaRecord),
    ResponseItem(ResponseItemRecord),
    EventMsg(EventMsgRecord),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionMetaRecord {
    #[serde(default)]
    pub timestamp: Option<Value>,
    pub payload: SessionMetaPayload,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionMetaPayload {
    pub id: String,
    #[serde(default)]
    pub cwd: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ResponseItemRecord {
    #[serde(default)]
    pub timestamp: Option<Value>,
    pub payload: ResponseItemPayload,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum ResponseItemPayload {
    Message(MessagePayload),
    FunctionCall(FunctionCallPayload),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagePayload {
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum MessageContent {
    InputText { text: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FunctionCallPayload {
    pub name: String,
    /// Codex serializes arguments as a JSON string already.
    #[serde(default)]
    pub arguments: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EventMsgRecord {
    #[serde(default)]
    pub timestamp: Option<Value>,
    pub payload: EventMsgPayload,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub(crate) enum EventMsgPayload {
    UserMessage {
        #[serde(default)]
        message: String,
    },
    #[serde(other)]
    Unknown,
}
