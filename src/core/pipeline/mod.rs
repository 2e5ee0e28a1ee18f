//! Receive, redact and republish loop

pub mod processor;
pub mod state;
pub mod summary;

pub use processor::AnonymizePipeline;
pub use state::{DropReason, PipelineState, StepOutcome};
pub use summary::PipelineSummary;
