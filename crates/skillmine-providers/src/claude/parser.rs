use std::collections::HashMap;
use std::path::{Path, PathBuf};

use skillmine_types::{
    MAX_ARGUMENTS_LEN, PromptRecord, Source, SourceRoots, ToolCallRecord, timestamp_to_rfc3339,
    truncate,
};

use crate::claude::schema::*;
use crate::scrub::scrub_prompt_text;
use crate::traits::{LogParser, ParsedFile, file_stem_id};
use crate::Result;

/// Parser for Claude session transcripts.
///
/// Session id and project come from the first record that declares them.
/// A user record with string content opens a new turn; assistant tool_use
/// blocks within the turn increment call_idx. A later tool_result block
/// flagged is_error marks the matching call as errored.
pub struct ClaudeParser;

impl LogParser for ClaudeParser {
    fn source(&self) -> Source {
        Source::Claude
    }

    fn log_root(&self, roots: &SourceRoots) -> PathBuf {
        roots.claude_root.clone()
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        let text = std::fs::read_to_string(path)?;
        Ok(parse_claude_lines(&text, &file_stem_id(path)))
    }
}

fn parse_claude_lines(text: &str, fallback_id: &str) -> ParsedFile {
    let mut out = ParsedFile::default();
    let mut session_id: Option<String> = None;
    let mut project: Option<String> = None;
    let mut prompt_idx: i64 = -1;
    let mut call_idx: u32 = 0;
    // tool_use id -> index into out.tool_calls, for error back-linking
    let mut call_sites: HashMap<String, usize> = HashMap::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: ClaudeRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) => continue,
        };

        match record {
            ClaudeRecord::User(user) => {
                if session_id.is_none() {
                    session_id = user.session_id.clone();
                }
                if project.is_none() {
                    project = user.cwd.clone();
                }
                let Some(message) = user.message else {
                    continue;
                };
                if message.role != "user" {
                    continue;
                }

                match message.content {
                    UserContent::Text(content) => {
                        if content.trim().is_empty() {
                            continue;
                        }
                        prompt_idx += 1;
                        call_idx = 0;
                        let cleaned = scrub_prompt_text(&content);
                        if !cleaned.is_empty() {
                            out.prompts.push(PromptRecord {
                                source: Source::Claude,
                                session_id: session_id
                                    .clone()
                                    .unwrap_or_else(|| fallback_id.to_string()),
                                prompt_idx: prompt_idx as u32,
                                timestamp: user.timestamp.as_ref().and_then(timestamp_to_rfc3339),
                                char_count: cleaned.chars().count() as u32,
                                text: cleaned,
                                project: project.clone().unwrap_or_default(),
                            });
                        }
                    }
                    UserContent::Blocks(blocks) => {
                        // Tool results do not open a turn; errored ones mark
                        // the originating call.
                        for block in blocks {
                            if let UserBlock::ToolResult {
                                tool_use_id,
                                is_error: true,
                            } = block
                                && let Some(&site) = call_sites.get(&tool_use_id)
                            {
                                out.tool_calls[site].is_error = true;
                            }
                        }
                    }
                }
            }

            ClaudeRecord::Assistant(assistant) => {
                if session_id.is_none() {
                    session_id = assistant.session_id.clone();
                }
                if project.is_none() {
                    project = assistant.cwd.clone();
                }
                let Some(message) = assistant.message else {
                    continue;
                };
                if message.role != "assistant" {
                    continue;
                }

                for block in message.content {
                    if let AssistantBlock::ToolUse { id, name, input } = block {
                        let arguments_json =
                            serde_json::to_string(&input).unwrap_or_else(|_| "{}".to_string());
                        out.tool_calls.push(ToolCallRecord {
                            source: Source::Claude,
                            session_id: session_id
                                .clone()
                                .unwrap_or_else(|| fallback_id.to_string()),
                            prompt_idx: prompt_idx.max(0) as u32,
                            call_idx,
                            timestamp: assistant
                                .timestamp
                                .as_ref()
                                .and_then(timestamp_to_rfc3339),
                            tool_name: name,
                            arguments_json: truncate(&arguments_json, MAX_ARGUMENTS_LEN),
                            is_error: false,
                        });
                        call_sites.insert(id, out.tool_calls.len() - 1);
                        call_idx += 1;
                    }
                }
            }

            ClaudeRecord::Unknown => {}
        }
    }

    out
}
