use anyhow::Result;
use arrow::datatypes::{DataType, Field, Schema};
use skillmine_types::ToolCallRecord;
use std::path::Path;
use std::sync::Arc;

use crate::ipc::*;
use crate::relations::parse_source;

fn schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("source", DataType::Utf8, false),
        Field::new("session_id", DataType::Utf8, false),
        Field::new("prompt_idx", DataType::UInt32, false),
        Field::new("call_idx", DataType::UInt32, false),
        Field::new("timestamp", DataType::Utf8, true),
        Field::new("tool_name", DataType::Utf8, false),
        Field::new("arguments_json", DataType::Utf8, false),
        Field::new("is_error", DataType::Boolean, false),
    ]))
}

pub(crate) fn write(path: &Path, rows: &[ToolCallRecord]) -> Result<()> {
    let columns = vec![
        str_array(rows.iter().map(|r| r.source.as_str().to_string()).collect()),
        str_array(rows.iter().map(|r| r.session_id.clone()).collect()),
        u32_array(rows.iter().map(|r| r.prompt_idx).collect()),
        u32_array(rows.iter().map(|r| r.call_idx).collect()),
        opt_str_array(rows.iter().map(|r| r.timestamp.clone()).collect()),
        str_array(rows.iter().map(|r| r.tool_name.clone()).collect()),
        str_array(rows.iter().map(|r| r.arguments_json.clone()).collect()),
        bool_array(rows.iter().map(|r| r.is_error).collect()),
    ];
    write_batch(path, schema(), columns)
}

pub(crate) fn read(path: &Path, phase: &str) -> Result<Vec<ToolCallRecord>> {
    let mut rows = Vec::new();
    for batch in read_batches(path, phase)? {
        for i in 0..batch.num_rows() {
            rows.push(ToolCallRecord {
                source: parse_source(string_col(&batch, 0)?.value(i))?,
                session_id: string_col(&batch, 1)?.value(i).to_string(),
                prompt_idx: u32_col(&batch, 2)?.value(i),
                call_idx: u32_col(&batch, 3)?.value(i),
                timestamp: opt_string(string_col(&batch, 4)?, i),
                tool_name: string_col(&batch, 5)?.value(i).to_string(),
                arguments_json: string_col(&batch, 6)?.value(i).to_string(),
                is_error: bool_col(&batch, 7)?.value(i),
            });
        }
    }
    Ok(rows)
}
