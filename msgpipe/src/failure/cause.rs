//! Raw failures raised by individual pipeline modules.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error as StdError;
use std::fmt::{self, Write as _};

/// A single failure raised by one module during a pipeline run.
///
/// Carries the descriptive message and the rendered origin trace. Once
/// built it is never mutated; the collector and the aggregate only clone it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleFailure {
    module: String,
    message: String,
    trace: String,
}

impl ModuleFailure {
    /// Creates a failure with an explicit, already rendered trace.
    #[must_use]
    pub fn with_trace(message: impl Into<String>, trace: impl Into<String>) -> Self {
        Self {
            module: String::new(),
            message: message.into(),
            trace: trace.into(),
        }
    }

    /// Creates a failure and captures the current backtrace as its trace.
    ///
    /// Capture honours `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE`; when capture is
    /// disabled the trace is empty.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_trace(message, render_backtrace(&Backtrace::capture()))
    }

    /// Creates a failure from any error, rendering its source chain as the trace.
    #[must_use]
    pub fn from_error(err: &(dyn StdError + 'static)) -> Self {
        Self::with_trace(err.to_string(), render_sources(err.source()))
    }

    /// Creates a failure from an [`anyhow::Error`].
    ///
    /// The trace holds the context chain below the outermost message followed
    /// by the captured backtrace, if anyhow recorded one.
    #[must_use]
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let mut trace = render_sources(err.chain().nth(1));
        let backtrace = render_backtrace(err.backtrace());
        if !backtrace.is_empty() {
            if !trace.is_empty() {
                trace.push('\n');
            }
            trace.push_str(&backtrace);
        }
        Self::with_trace(err.to_string(), trace)
    }

    /// Tags the failure with the name of the module that raised it.
    #[must_use]
    pub fn in_module(mut self, module: impl Into<String>) -> Self {
        self.module = module.into();
        self
    }

    /// Returns the module name, empty if it was never tagged.
    #[must_use]
    pub fn module(&self) -> &str {
        &self.module
    }

    /// Returns the descriptive message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the rendered origin trace.
    #[must_use]
    pub fn trace(&self) -> &str {
        &self.trace
    }
}

impl fmt::Display for ModuleFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.module.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.module, self.message)
        }
    }
}

impl StdError for ModuleFailure {}

impl From<anyhow::Error> for ModuleFailure {
    fn from(err: anyhow::Error) -> Self {
        Self::from_anyhow(&err)
    }
}

impl From<std::io::Error> for ModuleFailure {
    fn from(err: std::io::Error) -> Self {
        Self::from_error(&err)
    }
}

fn render_backtrace(backtrace: &Backtrace) -> String {
    match backtrace.status() {
        BacktraceStatus::Captured => backtrace.to_string().trim_end().to_string(),
        _ => String::new(),
    }
}

fn render_sources(mut source: Option<&(dyn StdError + 'static)>) -> String {
    let mut out = String::new();
    while let Some(err) = source {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = write!(out, "caused by: {err}");
        source = err.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use pretty_assertions::assert_eq;

    #[derive(Debug, thiserror::Error)]
    #[error("signature mismatch")]
    struct SignatureError {
        #[source]
        source: std::io::Error,
    }

    #[test]
    fn test_with_trace() {
        let failure = ModuleFailure::with_trace("timeout", "at L1");
        assert_eq!(failure.message(), "timeout");
        assert_eq!(failure.trace(), "at L1");
        assert_eq!(failure.module(), "");
        assert_eq!(failure.to_string(), "timeout");
    }

    #[test]
    fn test_new_captures_message() {
        let failure = ModuleFailure::new("badsig");
        assert_eq!(failure.message(), "badsig");
        assert!(failure.module().is_empty());
    }

    #[test]
    fn test_in_module_display() {
        let failure = ModuleFailure::with_trace("timeout", "").in_module("sender");
        assert_eq!(failure.module(), "sender");
        assert_eq!(failure.to_string(), "sender: timeout");
    }

    #[test]
    fn test_from_error_renders_source_chain() {
        let err = SignatureError {
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "bad digest"),
        };
        let failure = ModuleFailure::from_error(&err);

        assert_eq!(failure.message(), "signature mismatch");
        assert_eq!(failure.trace(), "caused by: bad digest");
    }

    #[test]
    fn test_from_error_without_source() {
        let err = std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout");
        let failure = ModuleFailure::from(err);

        assert_eq!(failure.message(), "timeout");
        assert!(failure.trace().is_empty());
    }

    #[test]
    fn test_from_anyhow_keeps_context_chain() {
        let err = Err::<(), _>(std::io::Error::new(std::io::ErrorKind::Other, "connection reset"))
            .context("sending message")
            .unwrap_err();
        let failure = ModuleFailure::from(err);

        assert_eq!(failure.message(), "sending message");
        assert!(failure.trace().starts_with("caused by: connection reset"));
    }
}
