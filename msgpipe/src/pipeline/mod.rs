//! Pipeline building and execution.
//!
//! This module provides:
//! - The pipeline builder with validation
//! - Sequential and concurrent module dispatch
//! - Run outcomes

mod builder;
mod outcome;
mod runner;

pub use builder::PipelineBuilder;
pub use outcome::{RunOutcome, RunSummary};
pub use runner::Pipeline;
