use anyhow::{Context, Result, anyhow};
use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray, UInt32Array};
use arrow::datatypes::Schema;
use arrow::ipc::reader::FileReader;
use arrow::ipc::writer::FileWriter;
use arrow::record_batch::RecordBatch;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Write one record batch as a complete relation file.
pub(crate) fn write_batch(path: &Path, schema: Arc<Schema>, columns: Vec<ArrayRef>) -> Result<()> {
    let batch = RecordBatch::try_new(schema.clone(), columns)
        .with_context(|| format!("failed to assemble relation batch for {}", path.display()))?;
    let file = File::create(path)
        .with_context(|| format!("failed to create relation file {}", path.display()))?;
    let mut writer = FileWriter::try_new(file, schema.as_ref())
        .with_context(|| format!("failed to open relation writer for {}", path.display()))?;
    writer.write(&batch)?;
    writer.finish()?;
    Ok(())
}

/// Read all batches of a relation file.
///
/// A missing file is a user-visible error naming the phase that produces it.
pub(crate) fn read_batches(path: &Path, phase: &str) -> Result<Vec<RecordBatch>> {
    if !path.exists() {
        return Err(anyhow!(
            "missing relation file {}: run `skillmine {}` first",
            path.display(),
            phase
        ));
    }
    let file = File::open(path)
        .with_context(|| format!("failed to open relation file {}", path.display()))?;
    let reader = FileReader::try_new(file, None)
        .with_context(|| format!("failed to read relation file {}", path.display()))?;
    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch.with_context(|| format!("corrupt relation file {}", path.display()))?);
    }
    Ok(batches)
}

// --- Column builders ---

pub(crate) fn str_array(values: Vec<String>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

pub(crate) fn opt_str_array(values: Vec<Option<String>>) -> ArrayRef {
    Arc::new(StringArray::from(values))
}

pub(crate) fn u32_array(values: Vec<u32>) -> ArrayRef {
    Arc::new(UInt32Array::from(values))
}

pub(crate) fn opt_u32_array(values: Vec<Option<u32>>) -> ArrayRef {
    Arc::new(UInt32Array::from(values))
}

pub(crate) fn bool_array(values: Vec<bool>) -> ArrayRef {
    Arc::new(BooleanArray::from(values))
}

pub(crate) fn f64_array(values: Vec<f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values))
}

// --- Column accessors ---

pub(crate) fn string_col<'a>(batch: &'a RecordBatch, index: usize) -> Result<&'a StringArray> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| anyhow!("relation column {} is not Utf8", index))
}

pub(crate) fn u32_col<'a>(batch: &'a RecordBatch, index: usize) -> Result<&'a UInt32Array> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<UInt32Array>()
        .ok_or_else(|| anyhow!("relation column {} is not UInt32", index))
}

pub(crate) fn bool_col<'a>(batch: &'a RecordBatch, index: usize) -> Result<&'a BooleanArray> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<BooleanArray>()
        .ok_or_else(|| anyhow!("relation column {} is not Boolean", index))
}

pub(crate) fn f64_col<'a>(batch: &'a RecordBatch, index: usize) -> Result<&'a Float64Array> {
    batch
        .column(index)
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| anyhow!("relation column {} is not Float64", index))
}

pub(crate) fn opt_string(array: &StringArray, row: usize) -> Option<String> {
    if array.is_null(row) {
        None
    } else {
        Some(array.value(row).to_string())
    }
}

pub(crate) fn opt_u32(array: &UInt32Array, row: usize) -> Option<u32> {
    if array.is_null(row) {
        None
    } else {
        Some(array.value(row))
    }
}
