//! End-to-end aggregation run
//!
//! Template load, concurrent aggregation, matching and emission all happen in
//! memory. Output files are touched only after every one of those steps has
//! succeeded.

pub mod orchestrator;

pub use orchestrator::{AggregationPipeline, PipelineOutput, RunReport};
