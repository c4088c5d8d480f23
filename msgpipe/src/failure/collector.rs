//! Per-run failure collection.

use super::{ModuleFailure, ProcessorFailure};
use crate::pipeline::{RunOutcome, RunSummary};
use crate::processor::ProcessorRef;
use parking_lot::Mutex;
use std::sync::Arc;

/// Collects module failures for one pipeline run, in occurrence order.
#[derive(Debug, Default)]
pub struct FailureCollector {
    failures: Vec<ModuleFailure>,
}

impl FailureCollector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a module failure.
    pub fn record(&mut self, failure: ModuleFailure) {
        self.failures.push(failure);
    }

    /// Returns true if no failure has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    /// Returns the number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    /// Takes every recorded failure, leaving the collector empty.
    pub fn drain(&mut self) -> Vec<ModuleFailure> {
        std::mem::take(&mut self.failures)
    }

    /// Ends the run: success if nothing was recorded, otherwise one aggregate.
    ///
    /// # Errors
    ///
    /// Returns a [`ContractViolation`](crate::errors::ContractViolation) if
    /// failures were recorded but `processor` has no usable identity.
    pub fn finish(
        mut self,
        processor: &ProcessorRef,
        summary: RunSummary,
    ) -> Result<RunOutcome, crate::errors::ContractViolation> {
        if self.is_empty() {
            return Ok(RunOutcome::Success(summary));
        }
        let failure = ProcessorFailure::build(processor, self.drain())?;
        Ok(RunOutcome::Failed(failure))
    }
}

impl Extend<ModuleFailure> for FailureCollector {
    fn extend<T: IntoIterator<Item = ModuleFailure>>(&mut self, iter: T) {
        self.failures.extend(iter);
    }
}

/// A [`FailureCollector`] shared by concurrently running modules.
///
/// Appends are mutually exclusive; the recorded order is arrival order.
#[derive(Debug, Clone, Default)]
pub struct SharedFailureCollector {
    inner: Arc<Mutex<FailureCollector>>,
}

impl SharedFailureCollector {
    /// Creates an empty shared collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a module failure.
    pub fn record(&self, failure: ModuleFailure) {
        self.inner.lock().record(failure);
    }

    /// Returns true if no failure has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Returns the number of recorded failures.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Takes every recorded failure.
    ///
    /// Only call once every writer has been joined; a failure recorded after
    /// the drain belongs to no run.
    pub fn drain(&self) -> Vec<ModuleFailure> {
        self.inner.lock().drain()
    }

    /// Drains the collector and ends the run, see [`FailureCollector::finish`].
    ///
    /// # Errors
    ///
    /// Same as [`FailureCollector::finish`].
    pub fn finish(
        &self,
        processor: &ProcessorRef,
        summary: RunSummary,
    ) -> Result<RunOutcome, crate::errors::ContractViolation> {
        let mut collector = FailureCollector::new();
        collector.extend(self.drain());
        collector.finish(processor, summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ContractViolation;
    use pretty_assertions::assert_eq;

    fn failure(message: &str) -> ModuleFailure {
        ModuleFailure::with_trace(message, format!("at {message}"))
    }

    #[test]
    fn test_collector_records_in_order() {
        let mut collector = FailureCollector::new();
        assert!(collector.is_empty());

        collector.record(failure("a"));
        collector.record(failure("b"));
        collector.record(failure("a"));

        assert!(!collector.is_empty());
        assert_eq!(collector.len(), 3);
        assert_eq!(collector.drain(), vec![failure("a"), failure("b"), failure("a")]);
        assert!(collector.is_empty());
    }

    #[test]
    fn test_finish_empty_is_success() {
        let outcome = FailureCollector::new()
            .finish(&ProcessorRef::detached("p"), RunSummary::default())
            .unwrap();
        assert!(outcome.is_success());
    }

    #[test]
    fn test_finish_builds_single_aggregate() {
        let mut collector = FailureCollector::new();
        collector.record(failure("timeout"));
        collector.record(failure("badsig"));

        let outcome = collector
            .finish(&ProcessorRef::detached("SenderModule"), RunSummary::default())
            .unwrap();

        let RunOutcome::Failed(aggregate) = outcome else {
            panic!("expected failed outcome");
        };
        assert_eq!(aggregate.causes(), vec![failure("timeout"), failure("badsig")]);
    }

    #[test]
    fn test_finish_with_blank_processor_is_violation() {
        let mut collector = FailureCollector::new();
        collector.record(failure("x"));

        let err = collector
            .finish(&ProcessorRef::detached(""), RunSummary::default())
            .unwrap_err();
        assert_eq!(err, ContractViolation::MissingProcessor);
    }

    #[test]
    fn test_shared_finish_builds_aggregate_and_empties() {
        let shared = SharedFailureCollector::new();
        shared.clone().record(ModuleFailure::with_trace("a", "t"));

        let outcome = shared
            .finish(&ProcessorRef::detached("P"), RunSummary::default())
            .unwrap();

        let RunOutcome::Failed(aggregate) = outcome else {
            panic!("expected failed outcome");
        };
        assert_eq!(aggregate.message(), "P threw exception:\na\nt");
        assert!(shared.is_empty());

        let outcome = shared
            .finish(&ProcessorRef::detached("P"), RunSummary::default())
            .unwrap();
        assert!(outcome.is_success());
    }

    #[test]
    fn test_shared_collector_across_threads() {
        let shared = SharedFailureCollector::new();
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let shared = shared.clone();
                std::thread::spawn(move || shared.record(failure(&format!("m{i}"))))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(shared.len(), 16);
        let mut messages: Vec<String> = shared
            .drain()
            .iter()
            .map(|f| f.message().to_string())
            .collect();
        messages.sort();
        messages.dedup();
        assert_eq!(messages.len(), 16);
        assert!(shared.is_empty());
    }
}
