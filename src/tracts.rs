// ==============================================================================
// tracts.rs - Tract Interval Extraction
// ==============================================================================
// Description: Selects name/left/right from a tract table as Sample/left/right
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use arrow::array::ArrayRef;
use arrow::compute::{cast_with_options, CastOptions};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ProjectionMask;
use parquet::errors::ParquetError;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::models::TractReport;
use crate::output::{create_parquet_writer, file_sha256};

/// Source columns, in output order
const SOURCE_COLUMNS: [&str; 3] = ["name", "left", "right"];

/// Errors raised while reading or converting the tract table
#[derive(Error, Debug)]
pub enum TractError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Parquet error: {0}")]
    ParquetError(#[from] ParquetError),

    #[error("Missing column '{0}' in tract table")]
    MissingColumn(String),

    #[error("Failed to cast column '{column}' to {to}: {source}")]
    CastError {
        column: String,
        to: DataType,
        source: ArrowError,
    },

    #[error("Arrow error: {0}")]
    ArrowError(#[from] ArrowError),
}

/// Output schema: `Sample` (renamed from `name`), `left`, `right`
pub fn tract_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("Sample", DataType::Utf8, true),
        Field::new("left", DataType::UInt32, true),
        Field::new("right", DataType::UInt32, true),
    ]))
}

/// Strict cast: overflow or negative values are errors, nulls stay null
fn cast_column(batch: &RecordBatch, column: &str, to: &DataType) -> Result<ArrayRef, TractError> {
    let array = batch
        .column_by_name(column)
        .ok_or_else(|| TractError::MissingColumn(column.to_string()))?;

    let options = CastOptions {
        safe: false,
        ..Default::default()
    };

    cast_with_options(array, to, &options).map_err(|source| TractError::CastError {
        column: column.to_string(),
        to: to.clone(),
        source,
    })
}

/// Convert one projected input batch to the output schema
fn convert_batch(batch: &RecordBatch, schema: &SchemaRef) -> Result<RecordBatch, TractError> {
    let sample = cast_column(batch, "name", &DataType::Utf8)?;
    let left = cast_column(batch, "left", &DataType::UInt32)?;
    let right = cast_column(batch, "right", &DataType::UInt32)?;

    Ok(RecordBatch::try_new(schema.clone(), vec![sample, left, right])?)
}

/// Open the tract table, reading only the three source columns
fn open_tracts(
    path: &Path,
) -> Result<parquet::arrow::arrow_reader::ParquetRecordBatchReader, TractError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;

    let roots = SOURCE_COLUMNS
        .iter()
        .map(|name| {
            builder
                .schema()
                .index_of(name)
                .map_err(|_| TractError::MissingColumn(name.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mask = ProjectionMask::roots(builder.parquet_schema(), roots);
    Ok(builder.with_projection(mask).build()?)
}

/// Extract tract intervals into a new Parquet file
///
/// One output row per input row, no filtering. Columns other than
/// `name`, `left` and `right` are ignored.
pub fn extract_tract_intervals(input: &Path, output: &Path) -> Result<TractReport> {
    info!("Extracting tract intervals: {:?} -> {:?}", input, output);

    let reader = open_tracts(input)
        .with_context(|| format!("Failed to open tract table {:?}", input))?;

    let schema = tract_schema();
    let mut writer = create_parquet_writer(output, schema.clone())?;
    let mut rows_written = 0;

    for batch in reader {
        let batch = batch
            .map_err(TractError::from)
            .with_context(|| format!("Failed to read tract table {:?}", input))?;
        let converted = convert_batch(&batch, &schema)
            .with_context(|| format!("Failed to convert tract table {:?}", input))?;

        writer
            .write(&converted)
            .context("Failed to write Parquet data")?;
        rows_written += converted.num_rows();
    }

    writer.close().context("Failed to close Parquet writer")?;

    let sha256 = file_sha256(output)?;
    info!("✓ Tract intervals written: {} rows", rows_written);

    Ok(TractReport {
        input_path: input.to_path_buf(),
        output_path: output.to_path_buf(),
        rows_written,
        sha256,
    })
}
