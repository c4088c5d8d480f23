//! Module trait and implementations.
//!
//! Modules are the independent units of work a pipeline dispatches a message
//! to. A failing module never stops its siblings.

mod request;

pub use request::{actions, RunRequest};

use crate::failure::ModuleFailure;
use async_trait::async_trait;
use std::fmt::Debug;

/// Trait for pipeline modules handling messages of type `M`.
#[async_trait]
pub trait Module<M>: Send + Sync + Debug
where
    M: Send + Sync + 'static,
{
    /// Returns the name of the module.
    fn name(&self) -> &str;

    /// Returns true if the module wants to handle this request.
    ///
    /// Modules that decline are skipped and do not count as handlers.
    fn can_handle(&self, _request: &RunRequest<M>) -> bool {
        true
    }

    /// Handles the request.
    ///
    /// # Errors
    ///
    /// Returns the failure to record for this run.
    async fn handle(&self, request: &RunRequest<M>) -> Result<(), ModuleFailure>;
}

/// A function-based module.
pub struct FnModule<M, F>
where
    F: Fn(&RunRequest<M>) -> Result<(), ModuleFailure> + Send + Sync,
{
    name: String,
    action: Option<String>,
    func: F,
    _message: std::marker::PhantomData<fn(M)>,
}

impl<M, F> FnModule<M, F>
where
    F: Fn(&RunRequest<M>) -> Result<(), ModuleFailure> + Send + Sync,
{
    /// Creates a module that handles every action.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            action: None,
            func,
            _message: std::marker::PhantomData,
        }
    }

    /// Restricts the module to a single action.
    #[must_use]
    pub fn for_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

impl<M, F> Debug for FnModule<M, F>
where
    F: Fn(&RunRequest<M>) -> Result<(), ModuleFailure> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnModule")
            .field("name", &self.name)
            .field("action", &self.action)
            .finish()
    }
}

#[async_trait]
impl<M, F> Module<M> for FnModule<M, F>
where
    M: Send + Sync + 'static,
    F: Fn(&RunRequest<M>) -> Result<(), ModuleFailure> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn can_handle(&self, request: &RunRequest<M>) -> bool {
        self.action
            .as_deref()
            .map_or(true, |action| action == request.action())
    }

    async fn handle(&self, request: &RunRequest<M>) -> Result<(), ModuleFailure> {
        (self.func)(request)
    }
}

/// A module that accepts every request and does nothing.
#[derive(Debug, Clone)]
pub struct NoOpModule {
    name: String,
}

impl NoOpModule {
    /// Creates a new no-op module.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl<M> Module<M> for NoOpModule
where
    M: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _request: &RunRequest<M>) -> Result<(), ModuleFailure> {
        Ok(())
    }
}
