// src/process/mod.rs
pub mod aggregate;
pub mod date_parser;
pub mod dedup;
pub mod fuse;
pub mod loader;
pub mod raw_table;
pub mod summary;
pub mod utils;
pub mod write;
#[cfg(test)]
mod xlsx_fixture;

use chrono::NaiveDate;
use std::time::Instant;
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::schema::{DedupKey, SourceSchema};
use aggregate::{finish, NormalizedRecord};
use date_parser::DateParser;
use dedup::dedup_by_key;
use raw_table::RawRecord;

pub use aggregate::DailyBucket;
pub use raw_table::RawValue;
pub use summary::RunSummary;

/// Run one source end to end: load, dedup, normalize dates, fuse title and
/// body, aggregate, and write the artifact to `schema.output`.
///
/// Dedup runs on the raw date text before normalization, or on the
/// canonical date after it, depending on `schema.dedup`.
#[tracing::instrument(level = "info", skip(schema), fields(source = %schema.name))]
pub fn run_source(schema: &SourceSchema) -> Result<RunSummary, PipelineError> {
    let start = Instant::now();

    // ─── 1) load ────────────────────────────────────────────────────
    let records = loader::load_records(schema)?;
    let initial_count = records.len();
    info!(initial_count, "loaded");

    // ─── 2) dedup + dates ───────────────────────────────────────────
    let parser = DateParser::new(&schema.date);
    let (dated, duplicate_count, date_invalid_count) = match schema.dedup {
        DedupKey::Raw => {
            let (kept, dups) = dedup_by_key(records, |r| (r.date.to_text(), r.body.to_text()));
            let (dated, invalid) = normalize_dates(kept, &parser);
            (dated, dups, invalid)
        }
        DedupKey::Canonical => {
            let (dated, invalid) = normalize_dates(records, &parser);
            let (kept, dups) = dedup_by_key(dated, |(date, r)| (*date, r.body.to_text()));
            (kept, dups, invalid)
        }
    };
    info!(duplicate_count, date_invalid_count, "deduplicated and dated");

    // ─── 3) fuse ────────────────────────────────────────────────────
    let has_title = schema.columns.title.is_some();
    let fused: Vec<NormalizedRecord> = dated
        .into_iter()
        .map(|(date, r)| NormalizedRecord {
            date,
            text: fuse::fuse(has_title.then_some(&r.title), &r.body),
        })
        .collect();
    let final_count = fused.len();

    // ─── 4) aggregate + write ───────────────────────────────────────
    let rows = finish(fused, schema.terminal);
    let output_rows = write::write_artifact(
        &schema.output,
        rows.iter()
            .map(|b| (b.date.format("%Y-%m-%d").to_string(), b.text.as_str())),
    )?;
    debug!(output = %schema.output.display(), elapsed = ?start.elapsed(), "artifact written");

    Ok(RunSummary {
        source_name: schema.name.clone(),
        input_path: schema.path.clone(),
        output_path: schema.output.clone(),
        initial_count,
        duplicate_count,
        date_invalid_count,
        final_count,
        output_rows,
    })
}

/// Pair each record with its canonical date, dropping (and counting) the
/// ones whose date cannot be parsed.
fn normalize_dates(
    records: Vec<RawRecord>,
    parser: &DateParser,
) -> (Vec<(NaiveDate, RawRecord)>, usize) {
    let before = records.len();
    let dated: Vec<_> = records
        .into_iter()
        .filter_map(|r| parser.parse(&r.date).map(|d| (d, r)))
        .collect();
    let invalid = before - dated.len();
    (dated, invalid)
}
