//! # msgpipe
//!
//! Failure aggregation for modular message-processing pipelines.
//!
//! A pipeline dispatches one action on one message to a list of independent
//! modules. Modules fail independently and never abort their siblings; every
//! failure of a run is kept, in order, and reported once as a
//! [`ProcessorFailure`](failure::ProcessorFailure) naming the processor that
//! produced it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use msgpipe::prelude::*;
//! use std::sync::Arc;
//!
//! let pipeline = PipelineBuilder::new("SenderModule")
//!     .module(Arc::new(SignModule::new()))?
//!     .module(Arc::new(HttpSendModule::new()))?
//!     .build()?;
//!
//! match pipeline.run(RunRequest::new(actions::SEND, message)).await? {
//!     RunOutcome::Success(summary) => println!("handled by {:?}", summary.handled),
//!     RunOutcome::Failed(failure) => eprintln!("{failure}"),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod config;
pub mod errors;
pub mod events;
pub mod failure;
pub mod modules;
pub mod observability;
pub mod pipeline;
pub mod processor;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{ExecutionMode, LoggingConfig, PipelineConfig};
    pub use crate::errors::{ContractViolation, PipelineError, PipelineValidationError};
    pub use crate::events::{EventSink, LoggingEventSink, NoOpEventSink};
    pub use crate::failure::{
        FailureCollector, ModuleFailure, ProcessorFailure, SharedFailureCollector,
    };
    pub use crate::modules::{actions, FnModule, Module, NoOpModule, RunRequest};
    pub use crate::observability::init_tracing;
    pub use crate::pipeline::{Pipeline, PipelineBuilder, RunOutcome, RunSummary};
    pub use crate::processor::{Processor, ProcessorRef};
}
