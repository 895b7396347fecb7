// src/schema/types.rs

use serde::{Deserialize, Serialize};
use std::{fmt, path::PathBuf};

/// Where a logical field lives in a source row: a zero-based position, or a
/// header name when the file carries a header row.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Index(i) => write!(f, "#{}", i),
            ColumnRef::Name(n) => write!(f, "'{}'", n),
        }
    }
}

/// Column layout of one source. Every source maps to exactly date, an
/// optional title, and body.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
pub struct ColumnMap {
    pub date: ColumnRef,
    #[serde(default)]
    pub title: Option<ColumnRef>,
    pub body: ColumnRef,
}

/// Physical container of a source.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceFormat {
    Csv {
        #[serde(default = "default_delimiter")]
        delimiter: char,
    },
    Spreadsheet {
        #[serde(default)]
        sheet: usize,
    },
}

fn default_delimiter() -> char {
    ','
}

/// How raw date values of a source are turned into calendar dates.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum DateStrategy {
    /// One chrono format string, e.g. `%Y/%m/%d`.
    Fixed { format: String },
    /// Numeric dates read day-before-month whenever that is a valid date.
    DayFirst,
    /// Formats tried in order; the first that parses wins.
    Ordered { formats: Vec<String> },
    /// Numbers separated by literal unit tokens, e.g. `2024 年 7 月 3 日`.
    TokenText {
        year: String,
        month: String,
        day: String,
    },
}

/// Which date key the deduplicator compares.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DedupKey {
    /// Exact raw date text, compared before normalization.
    #[default]
    Raw,
    /// Canonical calendar date, compared after normalization.
    Canonical,
}

/// Shape of the per-source artifact.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Terminal {
    /// One row per calendar date.
    #[default]
    PerDay,
    /// One row per surviving record.
    PerRecord,
}

/// Static description of one raw news export.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct SourceSchema {
    pub name: String,
    pub path: PathBuf,
    pub format: SourceFormat,
    #[serde(default = "default_encoding")]
    pub encoding: String,
    #[serde(default)]
    pub has_header: bool,
    pub columns: ColumnMap,
    pub date: DateStrategy,
    #[serde(default)]
    pub dedup: DedupKey,
    #[serde(default)]
    pub terminal: Terminal,
    /// Artifact file name, relative to the batch output directory.
    pub output: PathBuf,
}

fn default_encoding() -> String {
    "utf-8".into()
}

/// Settings of the final combine step.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct MergeConfig {
    pub output: PathBuf,
    /// Already-normalized artifacts without a source script of their own.
    #[serde(default)]
    pub extra_inputs: Vec<PathBuf>,
    #[serde(default)]
    pub parquet: Option<PathBuf>,
}

/// A whole batch: every source plus where the shared outputs go.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct PipelineConfig {
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_run_log")]
    pub run_log: PathBuf,
    pub merge: MergeConfig,
    pub sources: Vec<SourceSchema>,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_run_log() -> PathBuf {
    PathBuf::from("processing_log.txt")
}
