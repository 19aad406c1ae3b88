//! Extraction and payload pipelines for repofrag.
//!
//! - [`extract`] walks a repository and writes `fragments.json`
//! - [`payload`] selects fragments by priority and writes `prompt_payload.json`
//! - [`document`] holds the JSON I/O both pipelines share

pub mod document;
pub mod extract;
pub mod payload;

pub use extract::{ExtractResult, ProgressReporter, SilentProgress};
pub use payload::PayloadResult;
