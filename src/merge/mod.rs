// src/merge/mod.rs
pub mod columnar;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{info, instrument, warn};

use crate::errors::PipelineError;
use crate::process::{
    date_parser::parse_day_first,
    loader::decode_bytes,
    write::{write_artifact, CONTENT_COLUMN, DATE_COLUMN},
};

pub use columnar::export_parquet;

/// Outcome of combining the per-source artifacts.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub merged: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    /// Rows dropped for an empty `DATE` or `CONTENT`.
    pub missing_field_rows: usize,
    /// Rows whose `DATE` is not a calendar date.
    pub invalid_date_rows: usize,
    pub rows_written: usize,
}

/// Concatenate `inputs`, drop incomplete rows, stable-sort by date and write
/// the result to `output`.
///
/// Inputs that are missing, unreadable or lack a required column are skipped
/// with a warning. Nothing is written when no input could be read.
#[instrument(level = "info", skip(inputs, output), fields(output = %output.display()))]
pub fn merge_outputs(inputs: &[PathBuf], output: &Path) -> Result<MergeReport, PipelineError> {
    let mut report = MergeReport::default();
    let mut combined: Vec<(NaiveDate, String)> = Vec::new();

    for (index, input) in inputs.iter().enumerate() {
        info!("merging {}/{}: {}", index + 1, inputs.len(), input.display());
        if !input.is_file() {
            warn!(input = %input.display(), "merge input not found, skipping");
            report.skipped.push(input.clone());
            continue;
        }
        match read_artifact(input, &mut report) {
            Ok(rows) => {
                combined.extend(rows);
                report.merged.push(input.clone());
            }
            Err(e) => {
                warn!(input = %input.display(), error = %e, "merge input unusable, skipping");
                report.skipped.push(input.clone());
            }
        }
    }

    if report.merged.is_empty() {
        warn!("no merge input could be read; combined artifact not written");
        return Ok(report);
    }

    combined.sort_by_key(|(date, _)| *date);
    report.rows_written = write_artifact(
        output,
        combined
            .iter()
            .map(|(date, text)| (date.format("%Y-%m-%d").to_string(), text.as_str())),
    )?;
    info!(
        rows = report.rows_written,
        missing = report.missing_field_rows,
        invalid = report.invalid_date_rows,
        "combined artifact written"
    );
    Ok(report)
}

/// Read one `DATE,CONTENT` artifact. Extra columns are ignored.
fn read_artifact(
    path: &Path,
    report: &mut MergeReport,
) -> Result<Vec<(NaiveDate, String)>, PipelineError> {
    let bytes = fs::read(path)?;
    let text = decode_bytes(path, &bytes, "utf-8")?;
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| PipelineError::MissingRequiredColumn {
                path: path.to_path_buf(),
                column: name.to_string(),
            })
    };
    let date_ix = column(DATE_COLUMN)?;
    let content_ix = column(CONTENT_COLUMN)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let date = record.get(date_ix).map(str::trim).unwrap_or("");
        let content = record.get(content_ix).unwrap_or("");
        if date.is_empty() || content.is_empty() {
            report.missing_field_rows += 1;
            continue;
        }
        match parse_artifact_date(date) {
            Some(d) => rows.push((d, content.to_string())),
            None => report.invalid_date_rows += 1,
        }
    }
    Ok(rows)
}

/// Artifacts carry ISO dates; older hand-made ones may not.
fn parse_artifact_date(s: &str) -> Option<NaiveDate> {
    let day = s.get(..10).unwrap_or(s);
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_day_first(s))
}
