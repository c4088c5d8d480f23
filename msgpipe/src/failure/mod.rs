//! Failure collection and aggregation.
//!
//! Modules that fail during a run do not abort it. Their failures are
//! recorded in a [`FailureCollector`] and, once every module has run, turned
//! into exactly one [`ProcessorFailure`].

mod aggregate;
mod cause;
mod collector;

pub use aggregate::ProcessorFailure;
pub use cause::ModuleFailure;
pub use collector::{FailureCollector, SharedFailureCollector};
