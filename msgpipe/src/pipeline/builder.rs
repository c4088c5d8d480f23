//! Pipeline builder with validation.

use super::Pipeline;
use crate::config::{ExecutionMode, PipelineConfig};
use crate::errors::PipelineValidationError;
use crate::events::{EventSink, NoOpEventSink};
use crate::modules::Module;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Builder for creating validated pipelines.
pub struct PipelineBuilder<M>
where
    M: Send + Sync + 'static,
{
    config: PipelineConfig,
    modules: Vec<Arc<dyn Module<M>>>,
    names: HashSet<String>,
    event_sink: Arc<dyn EventSink>,
}

impl<M> PipelineBuilder<M>
where
    M: Send + Sync + 'static,
{
    /// Creates a builder with the default configuration and the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_config(PipelineConfig::new(name))
    }

    /// Creates a builder from a configuration.
    #[must_use]
    pub fn from_config(config: PipelineConfig) -> Self {
        Self {
            config,
            modules: Vec::new(),
            names: HashSet::new(),
            event_sink: Arc::new(NoOpEventSink),
        }
    }

    /// Appends a module.
    ///
    /// # Errors
    ///
    /// Returns an error if the module name is blank or already used.
    pub fn module(mut self, module: Arc<dyn Module<M>>) -> Result<Self, PipelineValidationError> {
        self.add_module(module)?;
        Ok(self)
    }

    /// Appends a module in place.
    ///
    /// # Errors
    ///
    /// Returns an error if the module name is blank or already used.
    pub fn add_module(&mut self, module: Arc<dyn Module<M>>) -> Result<(), PipelineValidationError> {
        let name = module.name().to_string();
        if name.trim().is_empty() {
            return Err(PipelineValidationError::new("Module name must not be empty"));
        }
        if !self.names.insert(name.clone()) {
            return Err(PipelineValidationError::new(format!(
                "Module '{name}' is already registered in pipeline '{}'",
                self.config.name
            ))
            .with_modules(vec![name]));
        }
        self.modules.push(module);
        Ok(())
    }

    /// Sets the execution mode.
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Sets the event sink.
    #[must_use]
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.event_sink = sink;
        self
    }

    /// Returns the pipeline name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Returns the number of modules.
    #[must_use]
    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Builds the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> Result<Arc<Pipeline<M>>, PipelineValidationError> {
        self.config.validate()?;
        Ok(Pipeline::new_shared(self.config, self.modules, self.event_sink))
    }
}

impl<M> fmt::Debug for PipelineBuilder<M>
where
    M: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let modules: Vec<&str> = self.modules.iter().map(|m| m.name()).collect();
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("modules", &modules)
            .finish_non_exhaustive()
    }
}
