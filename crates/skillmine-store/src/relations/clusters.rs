use anyhow::Result;
use arrow::datatypes::{DataType, Field, Schema};
use skillmine_types::ClusterSummary;
use std::path::Path;
use std::sync::Arc;

use crate::ipc::*;
use crate::relations::{decode_json, encode_json};

fn schema() -> Arc<Schema> {
    Arc::new(Schema::new(vec![
        Field::new("cluster_id", DataType::UInt32, false),
        Field::new("label", DataType::Utf8, false),
        Field::new("count", DataType::UInt32, false),
        Field::new("example_prompts", DataType::Utf8, false),
        Field::new("top_terms", DataType::Utf8, false),
        Field::new("sources", DataType::Utf8, false),
    ]))
}

pub(crate) fn write(path: &Path, rows: &[ClusterSummary]) -> Result<()> {
    let example_prompts = rows
        .iter()
        .map(|r| encode_json(&r.example_prompts))
        .collect::<Result<Vec<_>>>()?;
    let top_terms = rows
        .iter()
        .map(|r| encode_json(&r.top_terms))
        .collect::<Result<Vec<_>>>()?;
    let sources = rows
        .iter()
        .map(|r| encode_json(&r.sources))
        .collect::<Result<Vec<_>>>()?;
    let columns = vec![
        u32_array(rows.iter().map(|r| r.cluster_id).collect()),
        str_array(rows.iter().map(|r| r.label.clone()).collect()),
        u32_array(rows.iter().map(|r| r.count).collect()),
        str_array(example_prompts),
        str_array(top_terms),
        str_array(sources),
    ];
    write_batch(path, schema(), columns)
}

pub(crate) fn read(path: &Path, phase: &str) -> Result<Vec<ClusterSummary>> {
    let mut rows = Vec::new();
    for batch in read_batches(path, phase)? {
        for i in 0..batch.num_rows() {
            rows.push(ClusterSummary {
                cluster_id: u32_col(&batch, 0)?.value(i),
                label: string_col(&batch, 1)?.value(i).to_string(),
                count: u32_col(&batch, 2)?.value(i),
                example_prompts: decode_json(string_col(&batch, 3)?.value(i))?,
                top_terms: decode_json(string_col(&batch, 4)?.value(i))?,
                sources: decode_json(string_col(&batch, 5)?.value(i))?,
            });
        }
    }
    Ok(rows)
}
