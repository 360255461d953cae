use crate::Result;
use skillmine_types::{PromptRecord, Source, SourceRoots, ToolCallRecord};
use std::path::{Path, PathBuf};

/// Self-contained result of parsing one log file.
///
/// A worker produces exactly one of these per file; the coordinator merges
/// them without any shared mutable state.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub prompts: Vec<PromptRecord>,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Schema-specific parser for one log source.
///
/// Responsibilities:
/// - Decode the source's line-delimited-JSON schema into normalized records
/// - Track session id and project context from session-start records
/// - Maintain prompt_idx / call_idx counters per the turn structure
///
/// Implementations are registered in [`crate::registry`]; adding a fourth
/// source means one new implementation, not coordinator changes.
pub trait LogParser: Send + Sync {
    /// The source this parser decodes.
    fn source(&self) -> Source;

    /// Root directory holding this source's JSONL files.
    fn log_root(&self, roots: &SourceRoots) -> PathBuf;

    /// Parse one file end-to-end.
    ///
    /// Returns `Err` only when the file cannot be read at all; malformed
    /// lines inside a readable file are skipped silently.
    fn parse_file(&self, path: &Path) -> Result<ParsedFile>;
}

/// Fallback session id when a file carries no session-start record.
pub(crate) fn file_stem_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}
