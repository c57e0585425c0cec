// ==============================================================================
// output.rs - Parquet Output Generation
// ==============================================================================
// Description: Batched Parquet writers for long-format genotype tables
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

// Apache Arrow/Parquet for columnar data
use arrow::array::{ArrayRef, Int8Array, StringArray, UInt32Array};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

/// Long rows buffered before a RecordBatch is flushed
pub const BATCH_SIZE: usize = 131_072;

/// Schema of every long-format genotype output
pub fn genotype_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("POS", DataType::UInt32, false),
        Field::new("Sample", DataType::Utf8, false),
        Field::new("Allele1", DataType::Int8, false),
        Field::new("Allele2", DataType::Int8, false),
    ]))
}

/// Create a SNAPPY-compressed Parquet writer, creating parent directories
pub fn create_parquet_writer(path: &Path, schema: SchemaRef) -> Result<ArrowWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {:?}", parent))?;
    }

    let file = File::create(path)
        .with_context(|| format!("Failed to create Parquet file {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();

    ArrowWriter::try_new(file, schema, Some(props)).context("Failed to create Parquet writer")
}

/// Streaming writer for `(POS, Sample, Allele1, Allele2)` rows
///
/// Samples are pushed by index into `sample_names`; rows are buffered and
/// written as one RecordBatch every [`BATCH_SIZE`] rows to bound memory.
pub struct GenotypeParquetWriter<'a> {
    writer: ArrowWriter<File>,
    schema: SchemaRef,
    sample_names: &'a [String],
    positions: Vec<u32>,
    samples: Vec<usize>,
    allele1: Vec<i8>,
    allele2: Vec<i8>,
    rows_written: usize,
    batches_written: usize,
}

impl<'a> GenotypeParquetWriter<'a> {
    pub fn create(path: &Path, sample_names: &'a [String]) -> Result<Self> {
        let schema = genotype_schema();
        let writer = create_parquet_writer(path, schema.clone())?;

        Ok(Self {
            writer,
            schema,
            sample_names,
            positions: Vec::with_capacity(BATCH_SIZE),
            samples: Vec::with_capacity(BATCH_SIZE),
            allele1: Vec::with_capacity(BATCH_SIZE),
            allele2: Vec::with_capacity(BATCH_SIZE),
            rows_written: 0,
            batches_written: 0,
        })
    }

    /// Buffer one long row, flushing when the batch is full
    pub fn push(&mut self, position: u32, sample: usize, allele1: i8, allele2: i8) -> Result<()> {
        self.positions.push(position);
        self.samples.push(sample);
        self.allele1.push(allele1);
        self.allele2.push(allele2);

        if self.positions.len() >= BATCH_SIZE {
            self.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if self.positions.is_empty() {
            return Ok(());
        }

        let names = self.sample_names;
        let position_array: ArrayRef = Arc::new(UInt32Array::from(std::mem::take(&mut self.positions)));
        let sample_array: ArrayRef = Arc::new(StringArray::from_iter_values(
            self.samples.drain(..).map(|i| names[i].as_str()),
        ));
        let allele1_array: ArrayRef = Arc::new(Int8Array::from(std::mem::take(&mut self.allele1)));
        let allele2_array: ArrayRef = Arc::new(Int8Array::from(std::mem::take(&mut self.allele2)));

        let batch = RecordBatch::try_new(
            self.schema.clone(),
            vec![position_array, sample_array, allele1_array, allele2_array],
        )
        .context("Failed to create Arrow RecordBatch")?;

        // Write this batch immediately
        self.writer
            .write(&batch)
            .context("Failed to write Parquet batch")?;

        self.rows_written += batch.num_rows();
        self.batches_written += 1;
        self.positions.reserve(BATCH_SIZE);
        self.allele1.reserve(BATCH_SIZE);
        self.allele2.reserve(BATCH_SIZE);
        Ok(())
    }

    /// Flush remaining rows and close the file, returning total rows written
    pub fn finish(mut self) -> Result<usize> {
        self.flush()?;
        self.writer
            .close()
            .context("Failed to close Parquet writer")?;

        debug!(
            "Parquet writer closed: {} batches, {} rows",
            self.batches_written, self.rows_written
        );
        Ok(self.rows_written)
    }
}

/// Hex-encoded SHA-256 of a file
pub fn file_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
