//! Outcome of a pipeline run.

use crate::failure::ProcessorFailure;
use serde::{Deserialize, Serialize};

/// What a successful run did.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Processor display name.
    pub processor: String,
    /// Dispatched action.
    pub action: String,
    /// Modules that accepted the request, in declaration order.
    pub handled: Vec<String>,
    /// Modules that declined the request.
    pub skipped: Vec<String>,
    /// Wall-clock duration of the run in milliseconds.
    pub duration_ms: f64,
}

impl RunSummary {
    /// Creates an empty summary for one run.
    #[must_use]
    pub fn new(processor: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            processor: processor.into(),
            action: action.into(),
            ..Self::default()
        }
    }

    /// Returns true if at least one module accepted the request.
    #[must_use]
    pub fn was_handled(&self) -> bool {
        !self.handled.is_empty()
    }
}

/// The single outcome of a pipeline run.
///
/// There is no partial success: one failing module makes the whole run
/// [`Failed`](Self::Failed).
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Every module that accepted the request succeeded.
    Success(RunSummary),
    /// At least one module failed.
    Failed(ProcessorFailure),
}

impl RunOutcome {
    /// Returns true for [`RunOutcome::Success`].
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Returns true for [`RunOutcome::Failed`].
    #[must_use]
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Returns the aggregate failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<&ProcessorFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Success(_) => None,
        }
    }

    /// Converts into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns the aggregate failure of a failed run.
    pub fn into_result(self) -> Result<RunSummary, ProcessorFailure> {
        match self {
            Self::Success(summary) => Ok(summary),
            Self::Failed(failure) => Err(failure),
        }
    }
}
