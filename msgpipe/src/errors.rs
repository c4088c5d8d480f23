//! Error types for the msgpipe framework.
//!
//! Module failures never surface on their own: they are collected during a
//! run and reported through a single [`ProcessorFailure`]. The types here
//! cover everything else that can go wrong around a run.

use crate::failure::ProcessorFailure;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// The main error type for msgpipe operations.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// One or more modules failed during a run.
    #[error("{0}")]
    Failed(#[from] ProcessorFailure),

    /// No module accepted the requested action.
    #[error("No module found in processor '{processor}' for action '{action}'")]
    NoModule {
        /// The processor display name.
        processor: String,
        /// The requested action.
        action: String,
    },

    /// A precondition of the failure aggregation was violated.
    #[error("{0}")]
    Contract(#[from] ContractViolation),

    /// The pipeline definition is invalid.
    #[error("{0}")]
    Validation(#[from] PipelineValidationError),

    /// The configuration could not be read or parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Returns the aggregate failure if this error carries one.
    #[must_use]
    pub fn as_processor_failure(&self) -> Option<&ProcessorFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// A violated precondition when building a [`ProcessorFailure`].
///
/// This always points at a bug in the orchestrating code, never at bad
/// message data, and must not be retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContractViolation {
    /// The processor identity is absent (blank display name).
    #[error("Contract violation: processor must not be absent")]
    MissingProcessor,

    /// The causes sequence is absent or empty.
    #[error("Contract violation: causes must not be empty")]
    NoCauses,
}

/// Error raised when a pipeline definition is invalid.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct PipelineValidationError {
    /// The error message.
    pub message: String,
    /// The modules involved in the error.
    pub modules: Vec<String>,
}

impl PipelineValidationError {
    /// Creates a new pipeline validation error.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            modules: Vec::new(),
        }
    }

    /// Sets the modules involved.
    #[must_use]
    pub fn with_modules(mut self, modules: Vec<String>) -> Self {
        self.modules = modules;
        self
    }

    /// Converts to a dictionary representation.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("message".to_string(), serde_json::json!(self.message));
        map.insert("modules".to_string(), serde_json::json!(self.modules));
        map
    }
}
