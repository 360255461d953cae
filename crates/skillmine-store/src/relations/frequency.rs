use anyhow::Result;
use arrow::datatypes::{DataType, Field, Schema};
use skillmine_types::{SourceToolCount, ToolCount};
use std::path::Path;
use std::sync::Arc;

use crate::ipc::*;
use crate::relations::parse_source;

fn global_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("tool_name", DataType::Utf8, false),
        Field::new("count", DataType::UInt32, false),
    ]))
}

pub(crate) fn write_global(path: &Path, rows: &[ToolCount]) -> Result<()> {
    let columns = vec![
        str_array(rows.iter().map(|r| r.tool_name.clone()).collect()),
        u32_array(rows.iter().map(|r| r.count).collect()),
    ];
    write_batch(path, global_schema(), columns)
}

pub(crate) fn read_global(path: &Path, phase: &str) -> Result<Vec<ToolCount>> {
    let mut rows = Vec::new();
    for batch in read_batches(path, phase)? {
        for i in 0..batch.num_rows() {
            rows.push(ToolCount {
                tool_name: string_col(&batch, 0)?.value(i).to_string(),
                count: u32_col(&batch, 1)?.value(i),
            });
        }
    }
    Ok(rows)
}

fn by_source_schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("source", DataType::Utf8, false),
        Field::new("tool_name", DataType::Utf8, false),
        Field::new("count", DataType::UInt32, false),
    ]))
}

pub(crate) fn write_by_source(path: &Path, rows: &[SourceToolCount]) -> Result<()> {
    let columns = vec![
        str_array(rows.iter().map(|r| r.source.as_str().to_string()).collect()),
        str_array(rows.iter().map(|r| r.tool_name.clone()).collect()),
        u32_array(rows.iter().map(|r| r.count).collect()),
    ];
    write_batch(path, by_source_schema(), columns)
}

pub(crate) fn read_by_source(path: &Path, phase: &str) -> Result<Vec<SourceToolCount>> {
    let mut rows = Vec::new();
    for batch in read_batches(path, phase)? {
        for i in 0..batch.num_rows() {
            rows.push(SourceToolCount {
                source: parse_source(string_col(&batch, 0)?.value(i))?,
                tool_name: string_col(&batch, 1)?.value(i).to_string(),
                count: u32_col(&batch, 2)?.value(i),
            });
        }
    }
    Ok(rows)
}
