// ==============================================================================
// models.rs - Job and Report Data Models
// ==============================================================================
// Description: Job descriptors and per-output reports for the rewrite pipeline
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// One wide-to-long rewrite of a genotype matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RewriteJob {
    /// Tab-separated genotype matrix (plain or gzip)
    pub input_path: PathBuf,

    /// Parquet file to create (overwritten)
    pub output_path: PathBuf,

    /// Leading lines to discard before the column-name row
    pub skip_rows: usize,

    /// Optional table whose POS values are removed from the input
    pub mask_path: Option<PathBuf>,
}

impl RewriteJob {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        skip_rows: usize,
        mask_path: Option<PathBuf>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            skip_rows,
            mask_path,
        }
    }
}

impl fmt::Display for RewriteJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} (skip {})",
            self.input_path.display(),
            self.output_path.display(),
            self.skip_rows
        )?;
        if let Some(mask) = &self.mask_path {
            write!(f, " masked by {}", mask.display())?;
        }
        Ok(())
    }
}

/// Outcome of a successful rewrite job
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub mask_path: Option<PathBuf>,

    /// Matrix rows read from the input
    pub rows_read: usize,

    /// Matrix rows removed by the mask anti-join
    pub rows_masked: usize,

    /// Long-format rows written (kept rows x samples)
    pub rows_written: usize,

    /// SHA-256 of the written Parquet file
    pub sha256: String,
}

/// Outcome of the tract interval extraction
#[derive(Debug, Clone, Serialize)]
pub struct TractReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub rows_written: usize,
    pub sha256: String,
}

/// Written to `manifest.json` after a fully successful run
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest {
    pub generated_at: String,
    pub samples: usize,
    pub jobs: Vec<JobReport>,
    pub tracts: TractReport,
}
