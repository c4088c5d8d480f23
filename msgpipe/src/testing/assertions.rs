//! Test assertions for run outcomes.

use crate::failure::ProcessorFailure;
use crate::pipeline::{RunOutcome, RunSummary};

/// Asserts that the run succeeded and returns its summary.
pub fn assert_run_succeeded(outcome: &RunOutcome) -> &RunSummary {
    match outcome {
        RunOutcome::Success(summary) => summary,
        RunOutcome::Failed(failure) => panic!("Expected success, got failure:\n{failure}"),
    }
}

/// Asserts that the run failed and returns the aggregate failure.
pub fn assert_run_failed(outcome: &RunOutcome) -> &ProcessorFailure {
    match outcome {
        RunOutcome::Failed(failure) => failure,
        RunOutcome::Success(summary) => panic!("Expected failure, got success: {summary:?}"),
    }
}

/// Asserts the cause messages of a failure, in order.
pub fn assert_cause_messages(failure: &ProcessorFailure, expected: &[&str]) {
    let actual: Vec<String> = failure
        .causes()
        .iter()
        .map(|c| c.message().to_string())
        .collect();
    assert_eq!(
        actual, expected,
        "Unexpected causes for processor '{}'",
        failure.processor().name()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::ModuleFailure;
    use crate::processor::ProcessorRef;

    #[test]
    fn test_assert_run_failed() {
        let failure = ProcessorFailure::build(
            &ProcessorRef::detached("p"),
            vec![
                ModuleFailure::with_trace("a", ""),
                ModuleFailure::with_trace("b", ""),
            ],
        )
        .unwrap();
        let outcome = RunOutcome::Failed(failure);

        assert_cause_messages(assert_run_failed(&outcome), &["a", "b"]);
    }

    #[test]
    #[should_panic(expected = "Expected success")]
    fn test_assert_run_succeeded_panics_on_failure() {
        let failure = ProcessorFailure::build(
            &ProcessorRef::detached("p"),
            vec![ModuleFailure::with_trace("a", "")],
        )
        .unwrap();
        assert_run_succeeded(&RunOutcome::Failed(failure));
    }
}
