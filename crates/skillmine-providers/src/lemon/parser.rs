use std::path::{Path, PathBuf};

use serde_json::Value;
use skillmine_types::{
    MAX_ARGUMENTS_LEN, PromptRecord, Source, SourceRoots, ToolCallRecord, timestamp_to_rfc3339,
    truncate,
};

use crate::lemon::schema::*;
use crate::scrub::scrub_prompt_text;
use crate::traits::{LogParser, ParsedFile, file_stem_id};
use crate::Result;

/// Parser for Lemon agent session files.
pub struct LemonParser;

impl LogParser for LemonParser {
    fn source(&self) -> Source {
        Source::Lemon
    }

    fn log_root(&self, roots: &SourceRoots) -> PathBuf {
        roots.lemon_root.clone()
    }

    fn parse_file(&self, path: &Path) -> Result<ParsedFile> {
        let text = std::fs::read_to_string(path)?;
        Ok(parse_lemon_lines(&text, &file_stem_id(path)))
    }
}

fn invocation_arguments(invocation: &LemonToolInvocation) -> String {
    let raw = invocation
        .arguments
        .clone()
        .or_else(|| invocation.input.clone())
        .unwrap_or_else(|| Value::Object(Default::default()));
    match raw {
        Value::String(s) => s,
        other => serde_json::to_string(&other).unwrap_or_else(|_| "{}".to_string()),
    }
}

fn parse_lemon_lines(text: &str, fallback_id: &str) -> ParsedFile {
    let mut out = ParsedFile::default();
    let mut session_id: Option<String> = None;
    let mut project: Option<String> = None;
    let mut prompt_idx: i64 = -1;
    let mut call_idx: u32 = 0;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let record: LemonRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(_) => continue,
        };

        match record {
            LemonRecord::Session(start) => {
                session_id = start.id;
                project = start.cwd;
            }

            LemonRecord::Message(record) => {
                let timestamp = record
                    .message
                    .timestamp
                    .as_ref()
                    .or(record.timestamp.as_ref())
                    .and_then(timestamp_to_rfc3339);

                match record.message.role.as_str() {
                    "user" => {
                        let Value::String(content) = &record.message.content else {
                            continue;
                        };
                        if content.trim().is_empty() {
                            continue;
                        }
                        let cleaned = scrub_prompt_text(content);
                        if cleaned.is_empty() {
                            continue;
                        }
                        prompt_idx += 1;
                        call_idx = 0;
                        out.prompts.push(PromptRecord {
                            source: Source::Lemon,
                            session_id: session_id
                                .clone()
                                .unwrap_or_else(|| fallback_id.to_string()),
                            prompt_idx: prompt_idx as u32,
                            timestamp,
                            char_count: cleaned.chars().count() as u32,
                            text: cleaned,
                            project: project.clone().unwrap_or_default(),
                        });
                    }

                    "assistant" => {
                        let Value::Array(items) = &record.message.content else {
                            continue;
                        };
                        for item in items {
                            let Ok(parsed) =
                                serde_json::from_value::<LemonContentItem>(item.clone())
                            else {
                                continue;
                            };
                            let (LemonContentItem::ToolCall(invocation)
                            | LemonContentItem::ToolUse(invocation)) = parsed
                            else {
                                continue;
                            };
                            let arguments = invocation_arguments(&invocation);
                            out.tool_calls.push(ToolCallRecord {
                                source: Source::Lemon,
                                session_id: session_id
                                    .clone()
                                    .unwrap_or_else(|| fallback_id.to_string()),
                                prompt_idx: prompt_idx.max(0) as u32,
                                call_idx,
                                timestamp: timestamp.clone(),
                                tool_name: invocation
                                    .name
                                    .unwrap_or_else(|| "unknown".to_string()),
                                arguments_json: truncate(&arguments, MAX_ARGUMENTS_LEN),
                                is_error: false,
                            });
                            call_idx += 1;
                        }
                    }

                    _ => {}
                }
            }

            LemonRecord::Unknown => {}
        }
    }

    out
}
