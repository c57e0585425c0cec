// ==============================================================================
// rewriter.rs - Wide-to-Long Genotype Table Rewriter
// ==============================================================================
// Description: Executes one rewrite job: read, mask, reshape, split, write
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================
// Pipeline per job:
//   1. Read POS + sample columns after skip_rows header lines
//   2. Anti-join against the mask POS set (if any)
//   3. Cast POS to u32
//   4. Reshape each row into one long row per sample
//   5. Split "a|b" into Allele1/Allele2 (i8)
//   6-7. Write (POS, Sample, Allele1, Allele2) to Parquet
// Rows are streamed; only the mask POS set is held in memory.
// ==============================================================================

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use crate::genotype::parse_genotype;
use crate::models::{JobReport, RewriteJob};
use crate::output::{file_sha256, GenotypeParquetWriter};
use crate::parsers::{cast_position, read_mask_positions, GenotypeTableReader};

/// Rewrites wide genotype matrices into long Parquet tables
#[derive(Debug, Clone)]
pub struct TableRewriter {
    sample_columns: Arc<[String]>,
}

impl TableRewriter {
    pub fn new(sample_columns: Vec<String>) -> Self {
        Self {
            sample_columns: sample_columns.into(),
        }
    }

    pub fn sample_columns(&self) -> &[String] {
        &self.sample_columns
    }

    /// Execute a single job, overwriting its output file
    ///
    /// Any failure aborts the job; the output file may then be partial.
    pub fn rewrite(&self, job: &RewriteJob) -> Result<JobReport> {
        info!("Rewriting {}", job);

        let mask = match &job.mask_path {
            Some(mask_path) => {
                let positions = read_mask_positions(mask_path, job.skip_rows)
                    .with_context(|| format!("Failed to read mask table {:?}", mask_path))?;
                info!("Loaded {} mask positions from {:?}", positions.len(), mask_path);
                positions
            }
            None => HashSet::new(),
        };

        let mut reader =
            GenotypeTableReader::open(&job.input_path, job.skip_rows, &self.sample_columns)
                .with_context(|| format!("Failed to open genotype table {:?}", job.input_path))?;

        let mut writer = GenotypeParquetWriter::create(&job.output_path, &self.sample_columns)?;

        let mut rows_read = 0usize;
        let mut rows_masked = 0usize;

        while let Some(row) = reader.next_row() {
            let row = row.with_context(|| format!("Failed to read {:?}", job.input_path))?;
            rows_read += 1;

            if mask.contains(&row.position) {
                rows_masked += 1;
                continue;
            }

            let position = cast_position(row.position, row.line)
                .with_context(|| format!("Failed to cast POS in {:?}", job.input_path))?;

            for (sample, genotype) in row.genotypes().enumerate() {
                let (allele1, allele2) = parse_genotype(genotype).with_context(|| {
                    format!(
                        "Failed to parse genotype in {:?} at line {}, column {}",
                        job.input_path, row.line, self.sample_columns[sample]
                    )
                })?;
                writer.push(position, sample, allele1, allele2)?;
            }

            if rows_read % 10_000 == 0 {
                debug!("Read {} rows so far...", rows_read);
            }
        }

        let rows_written = writer
            .finish()
            .with_context(|| format!("Failed to write {:?}", job.output_path))?;
        debug_assert_eq!(
            rows_written,
            (rows_read - rows_masked) * self.sample_columns.len()
        );

        let sha256 = file_sha256(&job.output_path)?;

        info!(
            "✓ {:?}: {} rows read, {} masked, {} rows × {} samples = {} long rows",
            job.output_path,
            rows_read,
            rows_masked,
            rows_read - rows_masked,
            self.sample_columns.len(),
            rows_written
        );

        Ok(JobReport {
            input_path: job.input_path.clone(),
            output_path: job.output_path.clone(),
            mask_path: job.mask_path.clone(),
            rows_read,
            rows_masked,
            rows_written,
            sha256,
        })
    }
}
