// ==============================================================================
// jobs.rs - Rewrite Job Enumeration
// ==============================================================================
// Description: Builds the fixed list of genotype rewrite jobs for rates 1-9
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================
// Per rate r (1..=9), in order:
//   test_samples.vcf.gz             -> masked_samples_r.parquet   (skip 5, mask damaged_test_samples_0.r)
//   imputed_0.r_filtered.vcf.gz     -> imputed_filtered_r.parquet (skip 12)
// Then once:
//   test_samples.vcf.gz             -> test_samples.parquet       (skip 5)
// ==============================================================================

use std::path::Path;

use crate::config::{PipelineConfig, IMPUTED_SKIP_ROWS, RATES, TEST_SAMPLES_SKIP_ROWS};
use crate::models::RewriteJob;

const TEST_SAMPLES_FILE: &str = "test_samples.vcf.gz";

/// The two jobs belonging to a single rate
pub fn jobs_for_rate(rate: u8, data_dir: &Path, output_dir: &Path) -> [RewriteJob; 2] {
    [
        RewriteJob::new(
            data_dir.join(TEST_SAMPLES_FILE),
            output_dir.join(format!("masked_samples_{}.parquet", rate)),
            TEST_SAMPLES_SKIP_ROWS,
            Some(data_dir.join(format!("damaged_test_samples_0.{}.vcf.gz", rate))),
        ),
        RewriteJob::new(
            data_dir.join(format!("imputed_0.{}_filtered.vcf.gz", rate)),
            output_dir.join(format!("imputed_filtered_{}.parquet", rate)),
            IMPUTED_SKIP_ROWS,
            None,
        ),
    ]
}

/// All rewrite jobs for a run, in execution order
pub fn enumerate_jobs(config: &PipelineConfig) -> Vec<RewriteJob> {
    let mut jobs: Vec<RewriteJob> = RATES
        .flat_map(|rate| jobs_for_rate(rate, &config.data_dir, &config.output_dir))
        .collect();

    jobs.push(RewriteJob::new(
        config.data_dir.join(TEST_SAMPLES_FILE),
        config.output_dir.join("test_samples.parquet"),
        TEST_SAMPLES_SKIP_ROWS,
        None,
    ));

    jobs
}
