//! Mock modules for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::failure::ModuleFailure;
use crate::modules::{Module, RunRequest};

/// A module that records the actions it handled and returns a fixed result.
#[derive(Debug)]
pub struct RecordingModule {
    name: String,
    action: Option<String>,
    result: Mutex<Result<(), ModuleFailure>>,
    calls: Mutex<Vec<String>>,
}

impl RecordingModule {
    /// Creates a module that succeeds on every action.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            action: None,
            result: Mutex::new(Ok(())),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Restricts the module to one action.
    #[must_use]
    pub fn for_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Makes every following call fail with `failure`.
    pub fn fail_with(&self, failure: ModuleFailure) {
        *self.result.lock() = Err(failure);
    }

    /// Returns the number of handled calls.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Returns the actions handled, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl<M> Module<M> for RecordingModule
where
    M: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, request: &RunRequest<M>) -> bool {
        self.action.as_deref().map_or(true, |a| a == request.action())
    }

    async fn handle(&self, request: &RunRequest<M>) -> Result<(), ModuleFailure> {
        self.calls.lock().push(request.action().to_string());
        self.result.lock().clone()
    }
}

/// A module that always fails with the same message and trace.
#[derive(Debug, Clone)]
pub struct FailingModule {
    name: String,
    message: String,
    trace: String,
}

impl FailingModule {
    /// Creates a failing module.
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            trace: trace.into(),
        }
    }
}

#[async_trait]
impl<M> Module<M> for FailingModule
where
    M: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _request: &RunRequest<M>) -> Result<(), ModuleFailure> {
        Err(ModuleFailure::with_trace(&self.message, &self.trace))
    }
}

/// A module that panics while handling.
#[derive(Debug, Clone)]
pub struct PanickingModule {
    name: String,
}

impl PanickingModule {
    /// Creates a panicking module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl<M> Module<M> for PanickingModule
where
    M: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _request: &RunRequest<M>) -> Result<(), ModuleFailure> {
        panic!("{} exploded", self.name)
    }
}

/// A module that sleeps, then succeeds or fails.
#[derive(Debug, Clone)]
pub struct SlowModule {
    name: String,
    delay: Duration,
    failure: Option<String>,
}

impl SlowModule {
    /// Creates a module that succeeds after `delay`.
    #[must_use]
    pub fn new(name: impl Into<String>, delay: Duration) -> Self {
        Self {
            name: name.into(),
            delay,
            failure: None,
        }
    }

    /// Makes the module fail with `message` after the delay.
    #[must_use]
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

#[async_trait]
impl<M> Module<M> for SlowModule
where
    M: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _request: &RunRequest<M>) -> Result<(), ModuleFailure> {
        tokio::time::sleep(self.delay).await;
        match &self.failure {
            Some(message) => Err(ModuleFailure::with_trace(message, format!("at {}", self.name))),
            None => Ok(()),
        }
    }
}
