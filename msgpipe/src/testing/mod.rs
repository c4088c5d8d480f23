//! Testing utilities for msgpipe pipelines.
//!
//! This module provides:
//! - Mock modules
//! - Assertions on run outcomes

mod assertions;
mod mocks;

pub use assertions::{assert_cause_messages, assert_run_failed, assert_run_succeeded};
pub use mocks::{FailingModule, PanickingModule, RecordingModule, SlowModule};
