use serde::{Deserialize, Serialize};

use crate::Source;

/// One user-authored turn within a session, after wrapper markup stripping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptRecord {
    pub source: Source,
    pub session_id: String,
    /// Strictly increasing per session; authoritative for turn ordering.
    pub prompt_idx: u32,
    /// RFC 3339 timestamp, when the log carried one.
    pub timestamp: Option<String>,
    pub text: String,
    pub project: String,
    pub char_count: u32,
}

/// One assistant tool invocation within a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub source: Source,
    pub session_id: String,
    pub prompt_idx: u32,
    /// Resets to 0 at each new prompt_idx.
    pub call_idx: u32,
    pub timestamp: Option<String>,
    pub tool_name: String,
    /// Serialized arguments, truncated to [`crate::MAX_ARGUMENTS_LEN`].
    pub arguments_json: String,
    pub is_error: bool,
}

/// Aggregate view of one session, derived by grouping prompts and tool calls
/// by (source, session_id). Never authored independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub source: Source,
    pub session_id: String,
    pub project: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub num_prompts: u32,
    pub num_tool_calls: u32,
    /// Sorted, deduplicated tool names seen in the session.
    pub unique_tools: Vec<String>,
    /// Tool names across the entire session, ordered by (prompt_idx, call_idx).
    pub tool_sequence: Vec<String>,
    /// Earliest prompt text, truncated to 500 chars.
    pub first_prompt: String,
}

/// A prompt annotated with its cluster assignment. `cluster_id` is `None`
/// exactly when the preprocessed text fell below the minimum-length filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteredPrompt {
    #[serde(flatten)]
    pub prompt: PromptRecord,
    pub cluster_id: Option<u32>,
}

/// Counts returned by the extraction phase for observability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub claude_files: usize,
    pub codex_files: usize,
    pub lemon_files: usize,
    /// Files that failed to parse entirely and contributed nothing.
    pub skipped_files: usize,
    pub prompts: usize,
    pub tool_calls: usize,
    pub sessions: usize,
}

impl ExtractionStats {
    pub fn total_files(&self) -> usize {
        self.claude_files + self.codex_files + self.lemon_files
    }
}
