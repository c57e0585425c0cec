// ==============================================================================
// config.rs - Pipeline Configuration
// ==============================================================================
// Description: Directory layout, sample count and sample-column naming
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use std::ops::RangeInclusive;
use std::path::PathBuf;

/// Number of sample columns in every genotype matrix
pub const SAMPLES: usize = 1980;

/// Prefix shared by all sample column names (EUR_1, EUR_2, ...)
pub const SAMPLE_PREFIX: &str = "EUR_";

/// Damage/imputation rates processed by the job enumerator (0.1 through 0.9)
pub const RATES: RangeInclusive<u8> = 1..=9;

/// Header lines preceding the column-name row in test sample VCFs
pub const TEST_SAMPLES_SKIP_ROWS: usize = 5;

/// Header lines preceding the column-name row in imputed VCFs
pub const IMPUTED_SKIP_ROWS: usize = 12;

/// Runtime configuration for a full rewrite run
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory holding the input VCF tables and tract file
    pub data_dir: PathBuf,

    /// Directory receiving all Parquet outputs
    pub output_dir: PathBuf,

    /// Parquet file with `name`, `left`, `right` tract columns
    pub tracts_path: PathBuf,

    /// Number of sample columns (EUR_1..EUR_n)
    pub samples: usize,

    /// Maximum number of jobs in flight (1 = strictly sequential)
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let data_dir = PathBuf::from("data");
        Self {
            tracts_path: data_dir.join("neanderthal_tracts.parquet"),
            output_dir: data_dir.join("out"),
            data_dir,
            samples: SAMPLES,
            concurrency: 1,
        }
    }
}

impl PipelineConfig {
    /// Ordered sample column names, computed once per run
    pub fn sample_columns(&self) -> Vec<String> {
        sample_columns(self.samples)
    }

    pub fn tract_output_path(&self) -> PathBuf {
        self.output_dir.join("tract_intervals.parquet")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join("manifest.json")
    }
}

/// Build `EUR_1..=EUR_n`
pub fn sample_columns(n: usize) -> Vec<String> {
    (1..=n).map(|i| format!("{}{}", SAMPLE_PREFIX, i)).collect()
}
