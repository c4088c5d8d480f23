//! The request handed to every module of a run.

use std::collections::HashMap;
use std::sync::Arc;

/// Well-known action names.
pub mod actions {
    /// Send an outbound message.
    pub const SEND: &str = "send";
    /// Persist an inbound message.
    pub const STORE_MESSAGE: &str = "storemessage";
    /// Persist an inbound receipt.
    pub const STORE_MDN: &str = "storemdn";
}

/// One action dispatched against one message.
///
/// Cheap to clone: the message and the options are shared, so concurrent
/// modules each get their own handle on the same data.
#[derive(Debug)]
pub struct RunRequest<M> {
    action: String,
    message: Arc<M>,
    options: Arc<HashMap<String, serde_json::Value>>,
}

impl<M> RunRequest<M> {
    /// Creates a request without options.
    pub fn new(action: impl Into<String>, message: M) -> Self {
        Self::shared(action, Arc::new(message))
    }

    /// Creates a request for an already shared message.
    pub fn shared(action: impl Into<String>, message: Arc<M>) -> Self {
        Self {
            action: action.into(),
            message,
            options: Arc::new(HashMap::new()),
        }
    }

    /// Sets the options.
    #[must_use]
    pub fn with_options(mut self, options: HashMap<String, serde_json::Value>) -> Self {
        self.options = Arc::new(options);
        self
    }

    /// Adds a single option.
    #[must_use]
    pub fn with_option(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        Arc::make_mut(&mut self.options).insert(key.into(), value);
        self
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the message.
    #[must_use]
    pub fn message(&self) -> &M {
        &self.message
    }

    /// Returns the options.
    #[must_use]
    pub fn options(&self) -> &HashMap<String, serde_json::Value> {
        &self.options
    }

    /// Returns an option value.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.get(key)
    }
}

impl<M> Clone for RunRequest<M> {
    fn clone(&self) -> Self {
        Self {
            action: self.action.clone(),
            message: Arc::clone(&self.message),
            options: Arc::clone(&self.options),
        }
    }
}
