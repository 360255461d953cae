use anyhow::Result;
use arrow::datatypes::{DataType, Field, Schema};
use skillmine_types::SessionRecord;
use std::path::Path;
use std::sync::Arc;

use crate::ipc::*;
use crate::relations::{decode_json, encode_json, parse_source};

// tool_sequence is pipe-joined rather than JSON: tool names never contain
// '|' in practice and the flat form stays grep-able.
const SEQUENCE_SEPARATOR: &str = "|";

fn schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("source", DataType::Utf8, false),
        Field::new("session_id", DataType::Utf8, false),
        Field::new("project", DataType::Utf8, false),
        Field::new("start_time", DataType::Utf8, true),
        Field::new("end_time", DataType::Utf8, true),
        Field::new("num_prompts", DataType::UInt32, false),
        Field::new("num_tool_calls", DataType::UInt32, false),
        Field::new("unique_tools", DataType::Utf8, false),
        Field::new("tool_sequence", DataType::Utf8, false),
        Field::new("first_prompt", DataType::Utf8, false),
    ]))
}

fn join_sequence(sequence: &[String]) -> String {
    sequence.join(SEQUENCE_SEPARATOR)
}

fn split_sequence(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        Vec::new()
    } else {
        raw.split(SEQUENCE_SEPARATOR).map(str::to_string).collect()
    }
}

pub(crate) fn write(path: &Path, rows: &[SessionRecord]) -> Result<()> {
    let unique_tools = rows
        .iter()
        .map(|r| encode_json(&r.unique_tools))
        .collect::<Result<Vec<_>>>()?;
    let columns = vec![
        str_array(rows.iter().map(|r| r.source.as_str().to_string()).collect()),
        str_array(rows.iter().map(|r| r.session_id.clone()).collect()),
        str_array(rows.iter().map(|r| r.project.clone()).collect()),
        opt_str_array(rows.iter().map(|r| r.start_time.clone()).collect()),
        opt_str_array(rows.iter().map(|r| r.end_time.clone()).collect()),
        u32_array(rows.iter().map(|r| r.num_prompts).collect()),
        u32_array(rows.iter().map(|r| r.num_tool_calls).collect()),
        str_array(unique_tools),
        str_array(rows.iter().map(|r| join_sequence(&r.tool_sequence)).collect()),
        str_array(rows.iter().map(|r| r.first_prompt.clone()).collect()),
    ];
    write_batch(path, schema(), columns)
}

pub(crate) fn read(path: &Path, phase: &str) -> Result<Vec<SessionRecord>> {
    let mut rows = Vec::new();
    for batch in read_batches(path, phase)? {
        for i in 0..batch.num_rows() {
            rows.push(SessionRecord {
                source: parse_source(string_col(&batch, 0)?.value(i))?,
                session_id: string_col(&batch, 1)?.value(i).to_string(),
                project: string_col(&batch, 2)?.value(i).to_string(),
                start_time: opt_string(string_col(&batch, 3)?, i),
                end_time: opt_string(string_col(&batch, 4)?, i),
                num_prompts: u32_col(&batch, 5)?.value(i),
                num_tool_calls: u32_col(&batch, 6)?.value(i),
                unique_tools: decode_json(string_col(&batch, 7)?.value(i))?,
                tool_sequence: split_sequence(string_col(&batch, 8)?.value(i)),
                first_prompt: string_col(&batch, 9)?.value(i).to_string(),
            });
        }
    }
    Ok(rows)
}
