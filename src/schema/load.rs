use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::debug;

use super::{PipelineConfig, SourceSchema};
use crate::errors::PipelineError;

impl PipelineConfig {
    /// Read a YAML batch description.
    ///
    /// Every input (source paths, extra merge inputs) and `output_dir` are
    /// resolved against the config file's directory. Every output
    /// (artifacts, run log, merged files) is resolved against `output_dir`.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, PipelineError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            PipelineError::Configuration(format!("reading {}: {}", path.display(), e))
        })?;
        let config = Self::from_yaml_str(&text)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        debug!(config = %path.display(), sources = config.sources.len(), "loaded config");
        Ok(config.resolve(base))
    }

    /// Parse a YAML batch description without touching paths.
    pub fn from_yaml_str(text: &str) -> Result<Self, PipelineError> {
        let config: PipelineConfig = serde_yaml::from_str(text)
            .map_err(|e| PipelineError::Configuration(format!("invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Anchor relative paths at `base`, as described on [`Self::from_yaml_file`].
    pub fn resolve(mut self, base: &Path) -> Self {
        self.output_dir = join_relative(base, &self.output_dir);
        let out = self.output_dir.clone();
        self.run_log = join_relative(&out, &self.run_log);
        self.merge.output = join_relative(&out, &self.merge.output);
        self.merge.parquet = self.merge.parquet.map(|p| join_relative(&out, &p));
        self.merge.extra_inputs = self
            .merge
            .extra_inputs
            .iter()
            .map(|p| join_relative(base, p))
            .collect();
        for source in &mut self.sources {
            source.path = join_relative(base, &source.path);
            source.output = join_relative(&out, &source.output);
        }
        self
    }

    /// Reject batches that could never produce a coherent artifact.
    pub fn validate(&self) -> Result<(), PipelineError> {
        let mut seen = std::collections::HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.name.as_str()) {
                return Err(PipelineError::Configuration(format!(
                    "duplicate source name '{}'",
                    source.name
                )));
            }
            source.validate()?;
        }
        Ok(())
    }
}

impl SourceSchema {
    pub fn validate(&self) -> Result<(), PipelineError> {
        if encoding_rs::Encoding::for_label(self.encoding.as_bytes()).is_none() {
            return Err(PipelineError::Configuration(format!(
                "source '{}': unknown encoding '{}'",
                self.name, self.encoding
            )));
        }
        if !self.has_header {
            let cols = &self.columns;
            let named = std::iter::once(&cols.date)
                .chain(cols.title.as_ref())
                .chain(std::iter::once(&cols.body))
                .any(|c| matches!(c, super::ColumnRef::Name(_)));
            if named {
                return Err(PipelineError::Configuration(format!(
                    "source '{}': named columns need has_header: true",
                    self.name
                )));
            }
        }
        if let super::DateStrategy::Ordered { formats } = &self.date {
            if formats.is_empty() {
                return Err(PipelineError::Configuration(format!(
                    "source '{}': ordered date strategy lists no formats",
                    self.name
                )));
            }
        }
        Ok(())
    }
}

fn join_relative(base: &Path, p: &Path) -> PathBuf {
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base.join(p)
    }
}
