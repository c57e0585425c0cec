// ==============================================================================
// main.rs - Genotype Table Rewriter Entry Point
// ==============================================================================
// Description: Converts VCF genotype matrices and tract tables to Parquet
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genotype_rewriter::config::{PipelineConfig, SAMPLES};
use genotype_rewriter::jobs::enumerate_jobs;
use genotype_rewriter::pipeline;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory holding the input VCF tables
    #[arg(short, long, env = "GENOTYPE_REWRITER_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Output directory (defaults to <data-dir>/out)
    #[arg(short, long, env = "GENOTYPE_REWRITER_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Tract table (defaults to <data-dir>/neanderthal_tracts.parquet)
    #[arg(long, env = "GENOTYPE_REWRITER_TRACTS")]
    tracts: Option<PathBuf>,

    /// Number of sample columns (EUR_1..EUR_n)
    #[arg(long, default_value_t = SAMPLES as u32, value_parser = clap::value_parser!(u32).range(1..))]
    samples: u32,

    /// Maximum number of jobs running at once
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    concurrency: u32,

    /// Log the job plan and exit without reading any input
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            output_dir: self.output_dir.unwrap_or_else(|| self.data_dir.join("out")),
            tracts_path: self
                .tracts
                .unwrap_or_else(|| self.data_dir.join("neanderthal_tracts.parquet")),
            data_dir: self.data_dir,
            samples: self.samples as usize,
            concurrency: self.concurrency as usize,
        }
    }
}

/// One line per output the run would write, in execution order
fn job_plan(config: &PipelineConfig) -> Vec<String> {
    let mut plan: Vec<String> = enumerate_jobs(config)
        .iter()
        .enumerate()
        .map(|(i, job)| format!("Job {:>2}: {}", i + 1, job))
        .collect();
    plan.push(format!(
        "Tracts: {:?} -> {:?}",
        config.tracts_path,
        config.tract_output_path()
    ));
    plan
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "genotype_rewriter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let dry_run = args.dry_run;
    let config = args.into_config();

    info!("Genotype Table Rewriter starting...");
    info!("Data directory: {:?}", config.data_dir);
    info!("Output directory: {:?}", config.output_dir);

    if dry_run {
        for line in job_plan(&config) {
            info!("{}", line);
        }
        return Ok(());
    }

    let manifest = pipeline::run(&config).await?;
    info!(
        "Processing completed successfully: {} genotype tables, {} tract intervals",
        manifest.jobs.len(),
        manifest.tracts.rows_written
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_layout() {
        let config = Args::parse_from(["genotype-rewriter"]).into_config();
        let expected = PipelineConfig::default();
        assert_eq!(config.data_dir, expected.data_dir);
        assert_eq!(config.output_dir, expected.output_dir);
        assert_eq!(config.tracts_path, expected.tracts_path);
        assert_eq!(config.samples, 1980);
        assert_eq!(config.concurrency, 1);
    }

    #[test]
    fn test_output_dir_follows_data_dir() {
        let config = Args::parse_from(["genotype-rewriter", "--data-dir", "/tmp/run"]).into_config();
        assert_eq!(config.output_dir, PathBuf::from("/tmp/run/out"));
        assert_eq!(
            config.tracts_path,
            PathBuf::from("/tmp/run/neanderthal_tracts.parquet")
        );
    }

    #[test]
    fn test_dry_run_plan() {
        let args = Args::parse_from(["genotype-rewriter", "--data-dir", "/tmp/run", "--dry-run"]);
        assert!(args.dry_run);
        let plan = job_plan(&args.into_config());

        assert_eq!(plan.len(), 20);
        assert!(plan[0].starts_with("Job  1: /tmp/run/test_samples.vcf.gz -> /tmp/run/out/masked_samples_1.parquet"));
        assert!(plan[0].contains("damaged_test_samples_0.1.vcf.gz"));
        assert!(plan[18].contains("test_samples.parquet"));
        assert_eq!(
            plan[19],
            "Tracts: \"/tmp/run/neanderthal_tracts.parquet\" -> \"/tmp/run/out/tract_intervals.parquet\""
        );
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        assert!(Args::try_parse_from(["genotype-rewriter", "--concurrency", "0"]).is_err());
    }
}
