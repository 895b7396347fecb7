// src/driver.rs
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::{fs, path::PathBuf, time::Instant};
use tracing::{error, info, warn};

use crate::history::RunLog;
use crate::merge::{export_parquet, merge_outputs, MergeReport};
use crate::process::{run_source, RunSummary};
use crate::schema::PipelineConfig;

/// A source that produced no artifact, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source_name: String,
    pub error: String,
}

/// Everything a batch did, including the parts that failed.
#[derive(Debug, Default, Serialize)]
pub struct BatchReport {
    pub runs: Vec<RunSummary>,
    pub failures: Vec<SourceFailure>,
    /// Runs whose artifact was written but whose log entry was not.
    pub log_failures: usize,
    pub merge: Option<MergeReport>,
    pub parquet_rows: Option<usize>,
}

/// Run every source in order, then merge their artifacts (plus any extra
/// inputs) into the combined artifact and optionally export it to Parquet.
///
/// A source that fails is skipped and reported; the batch only aborts on
/// configuration errors or when nothing at all could be merged.
pub fn run_batch(config: &PipelineConfig) -> Result<BatchReport> {
    let start = Instant::now();
    config.validate().context("validating batch config")?;
    fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating output dir {}", config.output_dir.display()))?;

    let log = RunLog::new(&config.run_log);
    let mut report = BatchReport::default();

    // ─── 1) per-source pipelines ────────────────────────────────────
    let total = config.sources.len();
    for (i, source) in config.sources.iter().enumerate() {
        info!("source {}/{}: {}", i + 1, total, source.name);
        match run_source(source) {
            Ok(summary) => {
                // the artifact stays even if the log entry is lost
                if let Err(e) = log.record_run(&summary) {
                    error!(source = %source.name, error = %e, "run log not updated");
                    report.log_failures += 1;
                }
                report.runs.push(summary);
            }
            Err(e) if e.is_source_local() => {
                warn!(source = %source.name, error = %e, "source skipped");
                report.failures.push(SourceFailure {
                    source_name: source.name.clone(),
                    error: e.to_string(),
                });
            }
            Err(e) => {
                log_batch_summary(&report);
                return Err(e).with_context(|| format!("source '{}'", source.name));
            }
        }
    }

    // ─── 2) final merge ─────────────────────────────────────────────
    let inputs: Vec<PathBuf> = report
        .runs
        .iter()
        .map(|r| r.output_path.clone())
        .chain(config.merge.extra_inputs.iter().cloned())
        .collect();
    let merge = match merge_outputs(&inputs, &config.merge.output) {
        Ok(merge) => merge,
        Err(e) => {
            log_batch_summary(&report);
            return Err(e).with_context(|| format!("writing {}", config.merge.output.display()));
        }
    };
    let merged_any = !merge.merged.is_empty();
    report.merge = Some(merge);

    if !merged_any {
        log_batch_summary(&report);
        bail!("no source produced a usable artifact; nothing to merge");
    }

    // ─── 3) columnar export ─────────────────────────────────────────
    if let Some(parquet_path) = &config.merge.parquet {
        match export_parquet(&config.merge.output, parquet_path) {
            Ok(rows) => report.parquet_rows = Some(rows),
            Err(e) => error!(parquet = %parquet_path.display(), error = %e, "parquet export failed"),
        }
    }

    log_batch_summary(&report);
    info!(elapsed = ?start.elapsed(), "batch done");
    Ok(report)
}

/// Log one line per run and per failure.
pub fn log_batch_summary(report: &BatchReport) {
    info!(
        succeeded = report.runs.len(),
        failed = report.failures.len(),
        "batch summary"
    );
    for run in &report.runs {
        info!("{}", run);
    }
    for failure in &report.failures {
        warn!("{}: FAILED ({})", failure.source_name, failure.error);
    }
    if let Some(merge) = &report.merge {
        info!(
            merged = merge.merged.len(),
            skipped = merge.skipped.len(),
            rows = merge.rows_written,
            "combined artifact"
        );
    }
}
