//! Lifecycle events emitted by pipeline runs.

mod sink;

pub use sink::{CollectingEventSink, EventSink, LoggingEventSink, NoOpEventSink};

/// Event type names.
pub mod names {
    /// A run started.
    pub const PIPELINE_STARTED: &str = "pipeline.started";
    /// A run finished without failures.
    pub const PIPELINE_COMPLETED: &str = "pipeline.completed";
    /// A run finished with an aggregate failure.
    pub const PIPELINE_FAILED: &str = "pipeline.failed";
    /// A module started handling the request.
    pub const MODULE_STARTED: &str = "module.started";
    /// A module handled the request.
    pub const MODULE_COMPLETED: &str = "module.completed";
    /// A module failed; the failure was recorded.
    pub const MODULE_FAILED: &str = "module.failed";
    /// A module declined the request.
    pub const MODULE_SKIPPED: &str = "module.skipped";
}
