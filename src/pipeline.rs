// ==============================================================================
// pipeline.rs - Rewrite Run Orchestration
// ==============================================================================
// Description: Runs all rewrite jobs and the tract extraction, writes manifest
// Author: Matt Barham
// Created: 2026-10-17
// Modified: 2026-10-17
// Version: 1.0.0
// ==============================================================================
// Execution model:
//   concurrency = 1  -> jobs run one after another in enumeration order
//   concurrency = N  -> at most N jobs on the blocking pool, joined at the end
// The first failing job aborts the run; no manifest is written in that case.
// ==============================================================================

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::jobs::enumerate_jobs;
use crate::models::{JobReport, RewriteJob, RunManifest};
use crate::rewriter::TableRewriter;
use crate::tracts::extract_tract_intervals;

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    match ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
    {
        Ok(style) => pb.set_style(style.progress_chars("#>-")),
        Err(e) => warn!("Invalid progress bar template: {}", e),
    }
    pb
}

/// Run every rewrite job, then the tract extraction, then write the manifest
pub async fn run(config: &PipelineConfig) -> Result<RunManifest> {
    let jobs = enumerate_jobs(config);
    let rewriter = TableRewriter::new(config.sample_columns());

    info!(
        "Starting {} rewrite jobs ({} samples, concurrency {})",
        jobs.len(),
        rewriter.sample_columns().len(),
        config.concurrency
    );

    let reports = run_jobs(jobs, rewriter, config.concurrency).await?;

    let tracts_input = config.tracts_path.clone();
    let tracts_output = config.tract_output_path();
    let tracts = tokio::task::spawn_blocking(move || {
        extract_tract_intervals(&tracts_input, &tracts_output)
    })
    .await
    .context("Tract extraction task panicked")??;

    let manifest = RunManifest {
        generated_at: chrono::Utc::now().to_rfc3339(),
        samples: config.samples,
        jobs: reports,
        tracts,
    };
    write_manifest(config, &manifest)?;

    info!("✓ Run complete: {} outputs written", manifest.jobs.len() + 1);
    Ok(manifest)
}

/// Execute jobs, returning reports in enumeration order
pub async fn run_jobs(
    jobs: Vec<RewriteJob>,
    rewriter: TableRewriter,
    concurrency: usize,
) -> Result<Vec<JobReport>> {
    let pb = progress_bar(jobs.len());

    let result = if concurrency <= 1 {
        run_sequential(jobs, rewriter, &pb).await
    } else {
        run_parallel(jobs, rewriter, concurrency, &pb).await
    };

    match &result {
        Ok(_) => pb.finish_with_message("done"),
        Err(_) => pb.abandon_with_message("failed"),
    }
    result
}

async fn run_sequential(
    jobs: Vec<RewriteJob>,
    rewriter: TableRewriter,
    pb: &ProgressBar,
) -> Result<Vec<JobReport>> {
    let mut reports = Vec::with_capacity(jobs.len());

    for job in jobs {
        pb.set_message(job.output_path.display().to_string());

        let rewriter = rewriter.clone();
        let report = tokio::task::spawn_blocking(move || rewriter.rewrite(&job))
            .await
            .context("Rewrite task panicked")??;

        reports.push(report);
        pb.inc(1);
    }

    Ok(reports)
}

async fn run_parallel(
    jobs: Vec<RewriteJob>,
    rewriter: TableRewriter,
    concurrency: usize,
    pb: &ProgressBar,
) -> Result<Vec<JobReport>> {
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let total = jobs.len();
    let mut set = JoinSet::new();

    for (index, job) in jobs.into_iter().enumerate() {
        let semaphore = semaphore.clone();
        let rewriter = rewriter.clone();
        set.spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let report = tokio::task::spawn_blocking(move || rewriter.rewrite(&job))
                .await
                .context("Rewrite task panicked")??;
            Ok::<_, anyhow::Error>((index, report))
        });
    }

    let mut reports: Vec<Option<JobReport>> = vec![None; total];
    while let Some(joined) = set.join_next().await {
        let outcome = joined
            .context("Rewrite task panicked")
            .and_then(|outcome| outcome);

        match outcome {
            Ok((index, report)) => {
                reports[index] = Some(report);
                pb.inc(1);
            }
            Err(e) => {
                // Queued jobs never start; running ones finish in the background
                set.abort_all();
                return Err(e);
            }
        }
    }

    reports
        .into_iter()
        .map(|r| r.context("Rewrite job produced no report"))
        .collect()
}

fn write_manifest(config: &PipelineConfig, manifest: &RunManifest) -> Result<()> {
    let path = config.manifest_path();
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", config.output_dir))?;

    let file = std::fs::File::create(&path)
        .with_context(|| format!("Failed to create manifest {:?}", path))?;
    serde_json::to_writer_pretty(file, manifest).context("Failed to write manifest")?;

    info!("Manifest written: {:?}", path);
    Ok(())
}
