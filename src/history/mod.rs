// src/history/mod.rs

use chrono::Local;
use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};
use tracing::debug;

use crate::errors::PipelineError;
use crate::process::RunSummary;

const RULE: &str = "==================================================";

/// Append-only plain-text log of pipeline runs. Earlier entries are never
/// rewritten.
pub struct RunLog {
    path: PathBuf,
}

impl RunLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry for `summary`, stamped with the local time.
    pub fn record_run(&self, summary: &RunSummary) -> Result<(), PipelineError> {
        let stamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        self.append(&format_entry(summary, &stamp))
    }

    fn append(&self, entry: &str) -> Result<(), PipelineError> {
        let fail = |source| PipelineError::LogWriteFailure {
            path: self.path.clone(),
            source,
        };
        if let Some(dir) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(fail)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(fail)?;
        file.write_all(entry.as_bytes()).map_err(fail)?;
        debug!(log = %self.path.display(), "appended run entry");
        Ok(())
    }
}

/// The fixed-format block written for every run.
pub fn format_entry(summary: &RunSummary, stamp: &str) -> String {
    format!(
        "\n\n{rule}\nProcessing log\n{rule}\n\
         Processed at: {stamp}\n\
         Input file: {input}\n\
         Output file: {output}\n\n\
         ------------------ Summary ------------------\n\
         Initial records: {initial}\n\
         Duplicates removed: {dups}\n\
         Remaining after dedup: {dedup}\n\
         Invalid dates dropped: {invalid}\n\
         Final records: {final_count}\n\
         Output rows: {rows}\n\
         ----------------------------------------------\n",
        rule = RULE,
        stamp = stamp,
        input = summary.input_path.display(),
        output = summary.output_path.display(),
        initial = summary.initial_count,
        dups = summary.duplicate_count,
        dedup = summary.deduplicated_count(),
        invalid = summary.date_invalid_count,
        final_count = summary.final_count,
        rows = summary.output_rows,
    )
}
