pub mod load;
pub mod presets;
pub mod types;

pub use types::{
    ColumnMap, ColumnRef, DateStrategy, DedupKey, MergeConfig, PipelineConfig, SourceFormat,
    SourceSchema, Terminal,
};
