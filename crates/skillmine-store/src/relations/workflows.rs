use anyhow::Result;
use arrow::datatypes::{DataType, Field, Schema};
use skillmine_types::WorkflowPattern;
use std::path::Path;
use std::sync::Arc;

use crate::ipc::*;
use crate::relations::{decode_json, encode_json};

fn schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("pattern", DataType::Utf8, false),
        Field::new("normalized", DataType::Utf8, false),
        Field::new("occurrences", DataType::UInt32, false),
        Field::new("distinct_sessions", DataType::UInt32, false),
        Field::new("sources", DataType::Utf8, false),
        Field::new("example_first_prompts", DataType::Utf8, false),
        Field::new("avg_length", DataType::Float64, false),
    ]))
}

pub(crate) fn write(path: &Path, rows: &[WorkflowPattern]) -> Result<()> {
    let pattern = rows
        .iter()
        .map(|r| encode_json(&r.pattern))
        .collect::<Result<Vec<_>>>()?;
    let normalized = rows
        .iter()
        .map(|r| encode_json(&r.normalized))
        .collect::<Result<Vec<_>>>()?;
    let sources = rows
        .iter()
        .map(|r| encode_json(&r.sources))
        .collect::<Result<Vec<_>>>()?;
    let examples = rows
        .iter()
        .map(|r| encode_json(&r.example_first_prompts))
        .collect::<Result<Vec<_>>>()?;
    let columns = vec![
        str_array(pattern),
        str_array(normalized),
        u32_array(rows.iter().map(|r| r.occurrences).collect()),
        u32_array(rows.iter().map(|r| r.distinct_sessions).collect()),
        str_array(sources),
        str_array(examples),
        f64_array(rows.iter().map(|r| r.avg_length).collect()),
    ];
    write_batch(path, schema(), columns)
}

pub(crate) fn read(path: &Path, phase: &str) -> Result<Vec<WorkflowPattern>> {
    let mut rows = Vec::new();
    for batch in read_batches(path, phase)? {
        for i in 0..batch.num_rows() {
            rows.push(WorkflowPattern {
                pattern: decode_json(string_col(&batch, 0)?.value(i))?,
                normalized: decode_json(string_col(&batch, 1)?.value(i))?,
                occurrences: u32_col(&batch, 2)?.value(i),
                distinct_sessions: u32_col(&batch, 3)?.value(i),
                sources: decode_json(string_col(&batch, 4)?.value(i))?,
                example_first_prompts: decode_json(string_col(&batch, 5)?.value(i))?,
                avg_length: f64_col(&batch, 6)?.value(i),
            });
        }
    }
    Ok(rows)
}
