use std::{io, path::PathBuf};

use thiserror::Error;

/// Failures raised while loading, normalizing or merging news sources.
///
/// Record-level problems (an unparseable date) are never errors; they are
/// counted in the run summary instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("source file not found: {}", .path.display())]
    SourceNotFound { path: PathBuf },
    #[error("schema mismatch in {}: {details}", .path.display())]
    SchemaMismatch { path: PathBuf, details: String },
    #[error("cannot decode {} as {encoding}", .path.display())]
    DecodeError { path: PathBuf, encoding: String },
    #[error("{} is missing required column '{column}'", .path.display())]
    MissingRequiredColumn { path: PathBuf, column: String },
    #[error("failed to append run log {}: {source}", .path.display())]
    LogWriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("spreadsheet error in {}: {details}", .path.display())]
    Spreadsheet { path: PathBuf, details: String },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Arrow(#[from] arrow::error::ArrowError),
    #[error(transparent)]
    Parquet(#[from] parquet::errors::ParquetError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl PipelineError {
    /// Errors that only affect a single source and let the batch continue.
    pub fn is_source_local(&self) -> bool {
        !matches!(self, PipelineError::Configuration(_))
    }
}
