use serde::Serialize;
use std::{fmt, path::PathBuf};

/// Counters for one source run, returned by the pipeline and appended to the
/// run log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub source_name: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub initial_count: usize,
    pub duplicate_count: usize,
    pub date_invalid_count: usize,
    /// Records left after dedup and the date filter.
    pub final_count: usize,
    /// Rows in the written artifact (days, or records in per-record mode).
    pub output_rows: usize,
}

impl RunSummary {
    /// Records left after dedup, before invalid dates are dropped.
    pub fn deduplicated_count(&self) -> usize {
        self.initial_count - self.duplicate_count
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} in, {} duplicates, {} invalid dates, {} kept, {} rows → {}",
            self.source_name,
            self.initial_count,
            self.duplicate_count,
            self.date_invalid_count,
            self.final_count,
            self.output_rows,
            self.output_path.display()
        )
    }
}
