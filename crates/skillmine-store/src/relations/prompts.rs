use anyhow::Result;
use arrow::datatypes::{DataType, Field, Schema};
use skillmine_types::{ClusteredPrompt, PromptRecord};
use std::path::Path;
use std::sync::Arc;

use crate::ipc::*;
use crate::relations::parse_source;

fn base_fields() -> Vec<Field> {
    vec![
        Field::new("source", DataType::Utf8, false),
        Field::new("session_id", DataType::Utf8, false),
        Field::new("prompt_idx", DataType::UInt32, false),
        Field::new("timestamp", DataType::Utf8, true),
        Field::new("text", DataType::Utf8, false),
        Field::new("project", DataType::Utf8, false),
        Field::new("char_count", DataType::UInt32, false),
    ]
}

fn base_columns(rows: &[PromptRecord]) -> Vec<arrow::array::ArrayRef> {
    vec![
        str_array(rows.iter().map(|r| r.source.as_str().to_string()).collect()),
        str_array(rows.iter().map(|r| r.session_id.clone()).collect()),
        u32_array(rows.iter().map(|r| r.prompt_idx).collect()),
        opt_str_array(rows.iter().map(|r| r.timestamp.clone()).collect()),
        str_array(rows.iter().map(|r| r.text.clone()).collect()),
        str_array(rows.iter().map(|r| r.project.clone()).collect()),
        u32_array(rows.iter().map(|r| r.char_count).collect()),
    ]
}

fn row(batch: &arrow::record_batch::RecordBatch, i: usize) -> Result<PromptRecord> {
    Ok(PromptRecord {
        source: parse_source(string_col(batch, 0)?.value(i))?,
        session_id: string_col(batch, 1)?.value(i).to_string(),
        prompt_idx: u32_col(batch, 2)?.value(i),
        timestamp: opt_string(string_col(batch, 3)?, i),
        text: string_col(batch, 4)?.value(i).to_string(),
        project: string_col(batch, 5)?.value(i).to_string(),
        char_count: u32_col(batch, 6)?.value(i),
    })
}

pub(crate) fn write(path: &Path, rows: &[PromptRecord]) -> Result<()> {
    let schema = Arc::new(Schema::new(base_fields()));
    write_batch(path, schema, base_columns(rows))
}

pub(crate) fn read(path: &Path, phase: &str) -> Result<Vec<PromptRecord>> {
    let mut rows = Vec::new();
    for batch in read_batches(path, phase)? {
        for i in 0..batch.num_rows() {
            rows.push(row(&batch, i)?);
        }
    }
    Ok(rows)
}

pub(crate) fn write_clustered(path: &Path, rows: &[ClusteredPrompt]) -> Result<()> {
    let mut fields = base_fields();
    fields.push(Field::new("cluster_id", DataType::UInt32, true));
    let schema = Arc::new(Schema::new(fields));

    let prompts: Vec<PromptRecord> = rows.iter().map(|r| r.prompt.clone()).collect();
    let mut columns = base_columns(&prompts);
    columns.push(opt_u32_array(rows.iter().map(|r| r.cluster_id).collect()));

    write_batch(path, schema, columns)
}

pub(crate) fn read_clustered(path: &Path, phase: &str) -> Result<Vec<ClusteredPrompt>> {
    let mut rows = Vec::new();
    for batch in read_batches(path, phase)? {
        for i in 0..batch.num_rows() {
            rows.push(ClusteredPrompt {
                prompt: row(&batch, i)?,
                cluster_id: opt_u32(u32_col(&batch, 7)?, i),
            });
        }
    }
    Ok(rows)
}
