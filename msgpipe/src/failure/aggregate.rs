//! The aggregate failure reported for a failed pipeline run.

use super::ModuleFailure;
use crate::errors::ContractViolation;
use crate::processor::ProcessorRef;
use std::collections::HashMap;
use std::fmt;

/// All failures of one processor run, reported as a single error.
///
/// Built once from a non-empty, ordered list of causes. The composed message
/// is rendered at construction and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorFailure {
    processor: ProcessorRef,
    causes: Vec<ModuleFailure>,
    message: String,
}

impl ProcessorFailure {
    /// Builds the aggregate for `processor` from `causes`, in order.
    ///
    /// # Errors
    ///
    /// Returns [`ContractViolation::MissingProcessor`] if the processor has a
    /// blank name and [`ContractViolation::NoCauses`] if `causes` is empty.
    pub fn build<I>(processor: &ProcessorRef, causes: I) -> Result<Self, ContractViolation>
    where
        I: IntoIterator<Item = ModuleFailure>,
    {
        if processor.name().trim().is_empty() {
            return Err(ContractViolation::MissingProcessor);
        }

        let causes: Vec<ModuleFailure> = causes.into_iter().collect();
        if causes.is_empty() {
            return Err(ContractViolation::NoCauses);
        }

        let message = compose_message(processor.name(), &causes);
        Ok(Self {
            processor: processor.clone(),
            causes,
            message,
        })
    }

    /// Builds the aggregate from optional inputs.
    ///
    /// # Errors
    ///
    /// An absent processor or absent causes are contract violations, as are
    /// the conditions checked by [`build`](Self::build).
    pub fn try_build(
        processor: Option<&ProcessorRef>,
        causes: Option<&[ModuleFailure]>,
    ) -> Result<Self, ContractViolation> {
        let processor = processor.ok_or(ContractViolation::MissingProcessor)?;
        let causes = causes.ok_or(ContractViolation::NoCauses)?;
        Self::build(processor, causes.iter().cloned())
    }

    /// Returns the processor whose run produced this failure.
    #[must_use]
    pub fn processor(&self) -> &ProcessorRef {
        &self.processor
    }

    /// Returns a copy of the causes, in the order they occurred.
    #[must_use]
    pub fn causes(&self) -> Vec<ModuleFailure> {
        self.causes.clone()
    }

    /// Returns the number of causes; always at least one.
    #[must_use]
    pub fn cause_count(&self) -> usize {
        self.causes.len()
    }

    /// Returns the composed diagnostic message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Converts to a dictionary representation for event payloads.
    #[must_use]
    pub fn to_dict(&self) -> HashMap<String, serde_json::Value> {
        let mut map = HashMap::new();
        map.insert("processor".to_string(), serde_json::json!(self.processor.name()));
        map.insert(
            "processor_id".to_string(),
            serde_json::json!(self.processor.id().to_string()),
        );
        map.insert("cause_count".to_string(), serde_json::json!(self.causes.len()));
        map.insert(
            "causes".to_string(),
            serde_json::json!(self
                .causes
                .iter()
                .map(|c| {
                    serde_json::json!({
                        "module": c.module(),
                        "message": c.message(),
                        "trace": c.trace(),
                    })
                })
                .collect::<Vec<_>>()),
        );
        map
    }
}

impl fmt::Display for ProcessorFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ProcessorFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes
            .first()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// Nests a sub-pipeline failure as one cause of an enclosing run.
///
/// The nested aggregate is not flattened: its composed message becomes the
/// cause message and its processor name the module name.
impl From<ProcessorFailure> for ModuleFailure {
    fn from(failure: ProcessorFailure) -> Self {
        let module = failure.processor.name().to_string();
        ModuleFailure::with_trace(failure.message, "").in_module(module)
    }
}

fn compose_message(processor: &str, causes: &[ModuleFailure]) -> String {
    let mut message = String::with_capacity(
        processor.len()
            + 20
            + causes
                .iter()
                .map(|c| c.message().len() + c.trace().len() + 2)
                .sum::<usize>(),
    );
    message.push_str(processor);
    message.push_str(" threw ");
    message.push_str(if causes.len() == 1 {
        "exception:"
    } else {
        "exceptions:"
    });
    for cause in causes {
        message.push('\n');
        message.push_str(cause.message());
        message.push('\n');
        message.push_str(cause.trace());
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sender() -> ProcessorRef {
        ProcessorRef::detached("SenderModule")
    }

    fn timeout() -> ModuleFailure {
        ModuleFailure::with_trace("timeout", "at L1")
    }

    fn badsig() -> ModuleFailure {
        ModuleFailure::with_trace("badsig", "at L2")
    }

    #[test]
    fn test_single_cause_message() {
        let failure = ProcessorFailure::build(&sender(), vec![timeout()]).unwrap();

        assert_eq!(failure.message(), "SenderModule threw exception:\ntimeout\nat L1");
        assert_eq!(failure.to_string(), failure.message());
        assert_eq!(failure.cause_count(), 1);
    }

    #[test]
    fn test_multiple_causes_message_and_order() {
        let failure = ProcessorFailure::build(&sender(), vec![timeout(), badsig()]).unwrap();

        assert_eq!(
            failure.message(),
            "SenderModule threw exceptions:\ntimeout\nat L1\nbadsig\nat L2"
        );
        assert_eq!(failure.causes(), vec![timeout(), badsig()]);
    }

    #[test]
    fn test_duplicate_causes_are_kept() {
        let failure = ProcessorFailure::build(&sender(), vec![timeout(), timeout()]).unwrap();

        assert_eq!(failure.cause_count(), 2);
        assert!(failure.message().starts_with("SenderModule threw exceptions:"));
    }

    #[test]
    fn test_empty_causes_rejected() {
        let result = ProcessorFailure::build(&sender(), Vec::new());
        assert_eq!(result.unwrap_err(), ContractViolation::NoCauses);
    }

    #[test]
    fn test_blank_processor_rejected() {
        let result = ProcessorFailure::build(&ProcessorRef::detached("  "), vec![timeout()]);
        assert_eq!(result.unwrap_err(), ContractViolation::MissingProcessor);
    }

    #[test]
    fn test_try_build_absent_inputs() {
        let causes = vec![timeout()];

        assert_eq!(
            ProcessorFailure::try_build(None, Some(causes.as_slice())).unwrap_err(),
            ContractViolation::MissingProcessor
        );
        assert_eq!(
            ProcessorFailure::try_build(Some(&sender()), None).unwrap_err(),
            ContractViolation::NoCauses
        );
        assert_eq!(
            ProcessorFailure::try_build(Some(&sender()), Some(&[][..])).unwrap_err(),
            ContractViolation::NoCauses
        );
        assert!(ProcessorFailure::try_build(Some(&sender()), Some(causes.as_slice())).is_ok());
    }

    #[test]
    fn test_caller_mutation_not_observable() {
        let mut causes = vec![timeout(), badsig()];
        let failure = ProcessorFailure::try_build(Some(&sender()), Some(causes.as_slice())).unwrap();
        let message = failure.message().to_string();

        causes.clear();
        causes.push(ModuleFailure::with_trace("other", "at L9"));

        assert_eq!(failure.causes(), vec![timeout(), badsig()]);
        assert_eq!(failure.message(), message);
    }

    #[test]
    fn test_causes_returns_independent_copies() {
        let failure = ProcessorFailure::build(&sender(), vec![timeout(), badsig()]).unwrap();

        let mut first = failure.causes();
        let second = failure.causes();
        first.remove(0);

        assert_eq!(first.len(), 1);
        assert_eq!(second, vec![timeout(), badsig()]);
        assert_eq!(failure.causes(), second);
    }

    #[test]
    fn test_accessors_are_idempotent() {
        let failure = ProcessorFailure::build(&sender(), vec![timeout()]).unwrap();

        assert_eq!(failure.processor(), failure.processor());
        assert_eq!(failure.causes(), failure.causes());
        assert_eq!(failure.message(), failure.message());
        assert_eq!(failure.processor().name(), "SenderModule");
    }

    #[test]
    fn test_source_is_first_cause() {
        use std::error::Error;

        let failure = ProcessorFailure::build(&sender(), vec![timeout(), badsig()]).unwrap();
        assert_eq!(failure.source().unwrap().to_string(), "timeout");
    }

    #[test]
    fn test_nested_failure_becomes_single_cause() {
        let inner = ProcessorFailure::build(
            &ProcessorRef::detached("SignerModule"),
            vec![badsig()],
        )
        .unwrap();
        let nested = ModuleFailure::from(inner);

        assert_eq!(nested.module(), "SignerModule");
        assert_eq!(nested.message(), "SignerModule threw exception:\nbadsig\nat L2");

        let outer = ProcessorFailure::build(&sender(), vec![nested, timeout()]).unwrap();
        assert_eq!(outer.cause_count(), 2);
        assert!(outer
            .message()
            .starts_with("SenderModule threw exceptions:\nSignerModule threw exception:\nbadsig"));
    }

    #[test]
    fn test_to_dict() {
        let failure = ProcessorFailure::build(
            &sender(),
            vec![timeout().in_module("http"), badsig()],
        )
        .unwrap();

        let dict = failure.to_dict();
        assert_eq!(dict.get("processor").unwrap(), "SenderModule");
        assert_eq!(dict.get("cause_count").unwrap(), 2);
        assert_eq!(dict["causes"][0]["module"], "http");
        assert_eq!(dict["causes"][1]["message"], "badsig");
    }
}
