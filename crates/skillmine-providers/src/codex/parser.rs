use std::collections::HashSet;
use std::path::{Path, PathBuf};

use skillmine_types::{
    MAX_ARGUMENTS_LEN, PromptRecord, Source, SourceRoots, ToolCallRecord, timestamp_to_rfc3339,
    truncate,
};

use crate::codex::history::HistoryIndex;
use crate::codex::schema::*;
use crate::scrub::scrub_prompt_text;
use crate::traits::{LogParser, ParsedFile, file_stem_id};
use crate::Result;

/// Prompts this short are noise (confirmations, accidental submits).
const MIN_PROMPT_LEN: usize = 5;

/// How many leading chars identify a prompt for auxiliary-log dedup.
const DEDUP_PREFIX_LEN: usize = 50;

/// Wrapper payloads injected by the Codex runtime, not user-authored.
const WRAPPER_PREFIXES: &[&str] = &["<permissions", "<environment_context", "# AGENTS.md"];

/// Parser for Codex session files.
///
/// Holds the pre-loaded auxiliary history index; after a session file is
/// parsed, history entries for that session not already captured are
/// appended as additional prompts. Dedup compares only the first 50 chars
/// of cleaned text — a known heuristic that can both under- and over-merge;
/// kept as-is deliberately.
pub struct CodexParser {
    history: HistoryIndex,
}

impl CodexParser {
    pub fn new(history: HistoryIndex) -> Self {
        Self { history }
    }
}

impl LogParser for CodexParser {
    fn source(&self) -> Source {
        Source::Codex
    }

    fn log_root(&self, roots: &SourceRoots) -> PathBuf {
        roots.codex_root.clone()
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        let text = std::fs::read_to_string(path)?;
        Ok(parse_codex_lines(&text, &file_stem_id(path), &self.history))
    }
}

fn is_wrapper_payload(text: &str) -> bool {
    WRAPPER_PREFIXES.iter().any(|prefix| text.starts_with(prefix))
}

fn dedup_prefix(text: &str) -> String {
    text.chars().take(DEDUP_PREFIX_LEN).collect()
}

fn parse_codex_lines(text: &str, fallback_id: &str, history: &HistoryIndex) -> ParsedFile {
    let mut out = ParsedFile::default();
    let mut session_id: Option<String> = None;
    let mut project: Option<String> = None;
    let mut prompt_idx: i64 = -1;
    let mut call_idx: u32 = 0;

    let push_prompt = |out: &mut ParsedFile,
                           prompt_idx: &mut i64,
                           call_idx: &mut u32,
                           session_id: &Option<String>,
                           project: &Option<String>,
                           timestamp: Option<String>,
                           cleaned: String| {
        *prompt_idx += 1;
        *call_idx = 0;
        out.prompts.push(PromptRecord {
            source: Source::Codex,
            session_id: session_id.clone().unwrap_or_else(|| fallback_id.to_string()),
            prompt_idx: *prompt_idx as u32,
            timestamp,
            char_count: cleaned.chars().count() as u32,
            text: cleaned,
            project: project.clone().unwrap_or_default(),
        });
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: CodexRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) => continue,
        };

        match record {
            CodexRecord::SessionMeta(meta) => {
                session_id = Some(meta.payload.id);
                project = meta.payload.cwd;
            }

            CodexRecord::ResponseItem(item) => {
                let timestamp = item.timestamp.as_ref().and_then(timestamp_to_rfc3339);
                match item.payload {
                    ResponseItemPayload::Message(message) => {
                        if message.role != "user" {
                            continue;
                        }
                        for content in message.content {
                            let MessageContent::InputText { text } = content else {
                                continue;
                            };
                            if is_wrapper_payload(&text) {
                                continue;
                            }
                            let cleaned = scrub_prompt_text(&text);
                            if cleaned.chars().count() > MIN_PROMPT_LEN {
                                push_prompt(
                                    &mut out,
                                    &mut prompt_idx,
                                    &mut call_idx,
                                    &session_id,
                                    &project,
                                    timestamp.clone(),
                                    cleaned,
                                );
                            }
                        }
                    }

                    ResponseItemPayload::FunctionCall(call) => {
                        let arguments = if call.arguments.is_empty() {
                            "{}".to_string()
                        } else {
                            call.arguments
                        };
                        out.tool_calls.push(ToolCallRecord {
                            source: Source::Codex,
                            session_id: session_id
                                .clone()
                                .unwrap_or_else(|| fallback_id.to_string()),
                            prompt_idx: prompt_idx.max(0) as u32,
                            call_idx,
                            timestamp,
                            tool_name: call.name,
                            arguments_json: truncate(&arguments, MAX_ARGUMENTS_LEN),
                            is_error: false,
                        });
                        call_idx += 1;
                    }

                    ResponseItemPayload::Unknown => {}
                }
            }

            CodexRecord::EventMsg(event) => {
                let timestamp = event.timestamp.as_ref().and_then(timestamp_to_rfc3339);
                if let EventMsgPayload::UserMessage { message } = event.payload {
                    let cleaned = scrub_prompt_text(&message);
                    if cleaned.chars().count() > MIN_PROMPT_LEN {
                        push_prompt(
                            &mut out,
                            &mut prompt_idx,
                            &mut call_idx,
                            &session_id,
                            &project,
                            timestamp,
                            cleaned,
                        );
                    }
                }
            }

            CodexRecord::Unknown => {}
        }
    }

    // Recover prompts present only in the auxiliary history log.
    if let Some(sid) = session_id.clone() {
        let mut seen: HashSet<String> =
            out.prompts.iter().map(|p| dedup_prefix(&p.text)).collect();

        for entry in history.entries_for(&sid) {
            let cleaned = scrub_prompt_text(&entry.text);
            if cleaned.is_empty() {
                continue;
            }
            let prefix = dedup_prefix(&cleaned);
            if seen.contains(&prefix) {
                continue;
            }
            seen.insert(prefix);
            prompt_idx += 1;
            out.prompts.push(PromptRecord {
                source: Source::Codex,
                session_id: sid.clone(),
                prompt_idx: prompt_idx as u32,
                timestamp: entry.ts.as_ref().and_then(timestamp_to_rfc3339),
                char_count: cleaned.chars().count() as u32,
                text: cleaned,
                project: project.clone().unwrap_or_default(),
            });
        }
    }

    out
}
