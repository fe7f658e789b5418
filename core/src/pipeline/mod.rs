// px/src/pipeline/mod.rs

//! Defines the `Pipeline` struct, its combinators, hooks, and execution logic.

pub mod compose;
pub mod definition;
pub mod execution;
pub mod hooks;
pub mod parallel;
pub(crate) mod transform;

// Re-export the main Pipeline struct
pub use definition::{ErrorHandler, ErrorPolicy, Pipeline, PipelineOptions, ResultCallback};
pub use hooks::{DebugSink, TracingSink};
