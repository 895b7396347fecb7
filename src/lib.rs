pub mod driver;
pub mod errors;
pub mod history;
pub mod merge;
pub mod process;
pub mod schema;

pub use driver::{run_batch, BatchReport};
pub use errors::PipelineError;
pub use process::{run_source, RunSummary};
pub use schema::{PipelineConfig, SourceSchema};
