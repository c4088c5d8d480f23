//! Pipeline and logging configuration.

use crate::errors::{PipelineError, PipelineValidationError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the modules of a run are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// One module at a time, in declaration order (default).
    #[default]
    Sequential,
    /// One task per module; failures are recorded in arrival order.
    Concurrent,
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Concurrent => write!(f, "concurrent"),
        }
    }
}

/// Configuration of a single pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Display name of the processor.
    pub name: String,
    /// Module scheduling.
    pub mode: ExecutionMode,
    /// Upper bound on modules running at once in concurrent mode.
    pub max_concurrency: usize,
    /// Fail a run when no module accepted its action.
    pub require_handler: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            name: "DefaultMessageProcessor".to_string(),
            mode: ExecutionMode::Sequential,
            max_concurrency: 16,
            require_handler: true,
        }
    }
}

impl PipelineConfig {
    /// Creates a default configuration with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the execution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the concurrency limit.
    #[must_use]
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    /// Sets whether an unhandled action fails the run.
    #[must_use]
    pub fn with_require_handler(mut self, require_handler: bool) -> Self {
        self.require_handler = require_handler;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is blank or the concurrency limit is zero.
    pub fn validate(&self) -> Result<(), PipelineValidationError> {
        if self.name.trim().is_empty() {
            return Err(PipelineValidationError::new("Pipeline name must not be empty"));
        }
        if self.max_concurrency == 0 {
            return Err(PipelineValidationError::new(
                "max_concurrency must be at least 1",
            ));
        }
        Ok(())
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] for malformed JSON and
    /// [`PipelineError::Validation`] for invalid values.
    pub fn from_json_str(json: &str) -> Result<Self, PipelineError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| PipelineError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Io`] if the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PipelineError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert!(config.require_handler);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = PipelineConfig::new("inbound")
            .with_mode(ExecutionMode::Concurrent)
            .with_max_concurrency(4)
            .with_require_handler(false);

        assert_eq!(config.name, "inbound");
        assert_eq!(config.mode, ExecutionMode::Concurrent);
        assert_eq!(config.max_concurrency, 4);
        assert!(!config.require_handler);
    }

    #[test]
    fn test_validate_rejects_blank_name_and_zero_concurrency() {
        assert!(PipelineConfig::new(" ").validate().is_err());
        assert!(PipelineConfig::new("p").with_max_concurrency(0).validate().is_err());
    }

    #[test]
    fn test_from_json_str_partial() {
        let config =
            PipelineConfig::from_json_str(r#"{"name": "outbound", "mode": "concurrent"}"#).unwrap();

        assert_eq!(config.name, "outbound");
        assert_eq!(config.mode, ExecutionMode::Concurrent);
        assert_eq!(config.max_concurrency, 16);
    }

    #[test]
    fn test_from_json_str_errors() {
        assert!(matches!(
            PipelineConfig::from_json_str("{not json"),
            Err(PipelineError::Config(_))
        ));
        assert!(matches!(
            PipelineConfig::from_json_str(r#"{"max_concurrency": 0}"#),
            Err(PipelineError::Validation(_))
        ));
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"name": "from-file", "require_handler": false}}"#).unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.name, "from-file");
        assert!(!config.require_handler);

        assert!(matches!(
            PipelineConfig::from_json_file(file.path().with_extension("missing")),
            Err(PipelineError::Io(_))
        ));
    }

    #[test]
    fn test_execution_mode_display() {
        assert_eq!(ExecutionMode::Sequential.to_string(), "sequential");
        assert_eq!(ExecutionMode::Concurrent.to_string(), "concurrent");
    }
}
