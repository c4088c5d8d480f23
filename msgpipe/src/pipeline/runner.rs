//! The message-processing pipeline.
//!
//! Dispatches one request to every module that accepts it. A failing module
//! never stops the others: its failure is recorded and the run continues.
//! When every module has finished, the run ends with one [`RunOutcome`].

use super::{RunOutcome, RunSummary};
use crate::config::{ExecutionMode, PipelineConfig};
use crate::errors::PipelineError;
use crate::events::{names, EventSink};
use crate::failure::{FailureCollector, ModuleFailure, SharedFailureCollector};
use crate::modules::{Module, RunRequest};
use crate::processor::{Processor, ProcessorRef};
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Weak};
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{debug, error, warn, Instrument};
use uuid::Uuid;

/// A processor running an ordered list of modules against each request.
///
/// Created through [`PipelineBuilder`](super::PipelineBuilder).
pub struct Pipeline<M>
where
    M: Send + Sync + 'static,
{
    id: Uuid,
    config: PipelineConfig,
    modules: Vec<Arc<dyn Module<M>>>,
    event_sink: Arc<dyn EventSink>,
    self_ref: ProcessorRef,
}

impl<M> Pipeline<M>
where
    M: Send + Sync + 'static,
{
    pub(super) fn new_shared(
        config: PipelineConfig,
        modules: Vec<Arc<dyn Module<M>>>,
        event_sink: Arc<dyn EventSink>,
    ) -> Arc<Self> {
        let id = Uuid::new_v4();
        Arc::new_cyclic(|weak: &Weak<Self>| {
            let own: Weak<Self> = Weak::clone(weak);
            let target: Weak<dyn Processor> = own;
            Self {
                id,
                self_ref: ProcessorRef::from_weak(id, config.name.clone(), target),
                config,
                modules,
                event_sink,
            }
        })
    }

    /// Returns a non-owning handle on this pipeline.
    #[must_use]
    pub fn processor_ref(&self) -> &ProcessorRef {
        &self.self_ref
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Returns the module names, in declaration order.
    #[must_use]
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Runs every accepting module and returns the outcome of the run.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::NoModule`] if no module accepted the action
    /// and the pipeline requires a handler. Module failures are never
    /// returned here; they are reported in [`RunOutcome::Failed`].
    pub async fn run(&self, request: RunRequest<M>) -> Result<RunOutcome, PipelineError> {
        let span = tracing::info_span!(
            "pipeline.run",
            processor = %self.config.name,
            action = %request.action(),
            mode = %self.config.mode,
        );
        self.run_inner(request).instrument(span).await
    }

    /// Runs the pipeline and flattens the outcome into a `Result`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Failed`] carrying the aggregate failure, or
    /// any error of [`run`](Self::run).
    pub async fn handle(&self, request: RunRequest<M>) -> Result<RunSummary, PipelineError> {
        Ok(self.run(request).await?.into_result()?)
    }

    async fn run_inner(&self, request: RunRequest<M>) -> Result<RunOutcome, PipelineError> {
        let start = Instant::now();
        let mut summary = RunSummary::new(&self.config.name, request.action());

        self.event_sink.try_emit(
            names::PIPELINE_STARTED,
            Some(serde_json::json!({
                "processor": &self.config.name,
                "action": request.action(),
                "modules": self.modules.len(),
            })),
        );

        let mut accepted = Vec::new();
        for module in &self.modules {
            if module.can_handle(&request) {
                summary.handled.push(module.name().to_string());
                accepted.push(Arc::clone(module));
            } else {
                debug!(module = module.name(), "Module declined request");
                summary.skipped.push(module.name().to_string());
                self.event_sink.try_emit(
                    names::MODULE_SKIPPED,
                    Some(serde_json::json!({ "module": module.name() })),
                );
            }
        }

        let outcome = match self.config.mode {
            ExecutionMode::Sequential => {
                let failures = self.run_sequential(&accepted, &request).await;
                summary.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                failures.finish(&self.self_ref, summary)?
            }
            ExecutionMode::Concurrent => {
                let failures = self.run_concurrent(accepted, &request).await;
                summary.duration_ms = start.elapsed().as_secs_f64() * 1000.0;
                failures.finish(&self.self_ref, summary)?
            }
        };
        match &outcome {
            RunOutcome::Failed(failure) => {
                error!(
                    cause_count = failure.cause_count(),
                    "{}", failure.message()
                );
                self.event_sink.try_emit(
                    names::PIPELINE_FAILED,
                    Some(serde_json::json!(failure.to_dict())),
                );
            }
            RunOutcome::Success(summary) if !summary.was_handled() => {
                warn!("No module found for action '{}'", summary.action);
                if self.config.require_handler {
                    return Err(PipelineError::NoModule {
                        processor: self.config.name.clone(),
                        action: summary.action.clone(),
                    });
                }
                self.emit_completed(summary);
            }
            RunOutcome::Success(summary) => self.emit_completed(summary),
        }
        Ok(outcome)
    }

    fn emit_completed(&self, summary: &RunSummary) {
        self.event_sink.try_emit(
            names::PIPELINE_COMPLETED,
            Some(serde_json::json!({
                "processor": &summary.processor,
                "action": &summary.action,
                "handled": &summary.handled,
                "duration_ms": summary.duration_ms,
            })),
        );
    }

    async fn run_sequential(
        &self,
        modules: &[Arc<dyn Module<M>>],
        request: &RunRequest<M>,
    ) -> FailureCollector {
        let mut collector = FailureCollector::new();
        for module in modules {
            if let Err(failure) = run_module(module.as_ref(), request, self.event_sink.as_ref()).await
            {
                collector.record(failure);
            }
        }
        collector
    }

    async fn run_concurrent(
        &self,
        modules: Vec<Arc<dyn Module<M>>>,
        request: &RunRequest<M>,
    ) -> SharedFailureCollector {
        let collector = SharedFailureCollector::new();
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut tasks = FuturesUnordered::new();

        for module in modules {
            let name = module.name().to_string();
            let request = request.clone();
            let collector = collector.clone();
            let sink = Arc::clone(&self.event_sink);
            let semaphore = Arc::clone(&semaphore);
            let task = tokio::spawn(
                async move {
                    let _permit = semaphore.acquire_owned().await;
                    if let Err(failure) = run_module(module.as_ref(), &request, sink.as_ref()).await {
                        collector.record(failure);
                    }
                }
                .in_current_span(),
            );
            tasks.push(task.map(move |joined| (name, joined)));
        }

        // Every task must be joined before the collector is drained.
        while let Some((name, joined)) = tasks.next().await {
            if let Err(err) = joined {
                let failure = if err.is_panic() {
                    panic_failure(&name, err.into_panic().as_ref())
                } else {
                    ModuleFailure::with_trace(
                        "module task was cancelled",
                        format!("cancelled in module '{name}'"),
                    )
                    .in_module(name.as_str())
                };
                warn!(module = %name, "{}", failure.message());
                collector.record(failure);
            }
        }

        collector
    }
}

/// Runs one module, turning an error or a panic into a tagged failure.
async fn run_module<M>(
    module: &dyn Module<M>,
    request: &RunRequest<M>,
    sink: &dyn EventSink,
) -> Result<(), ModuleFailure>
where
    M: Send + Sync + 'static,
{
    let name = module.name();
    sink.try_emit(
        names::MODULE_STARTED,
        Some(serde_json::json!({ "module": name })),
    );
    let start = Instant::now();

    let result = match AssertUnwindSafe(module.handle(request)).catch_unwind().await {
        Ok(result) => result,
        Err(payload) => Err(panic_failure(name, payload.as_ref())),
    };
    let duration_ms = start.elapsed().as_secs_f64() * 1000.0;

    match result {
        Ok(()) => {
            debug!(module = name, duration_ms, "Module completed");
            sink.try_emit(
                names::MODULE_COMPLETED,
                Some(serde_json::json!({ "module": name, "duration_ms": duration_ms })),
            );
            Ok(())
        }
        Err(failure) => {
            let failure = if failure.module().is_empty() {
                failure.in_module(name)
            } else {
                failure
            };
            warn!(module = name, error = %failure.message(), "Module failed");
            sink.try_emit(
                names::MODULE_FAILED,
                Some(serde_json::json!({
                    "module": name,
                    "error": failure.message(),
                    "duration_ms": duration_ms,
                })),
            );
            Err(failure)
        }
    }
}

/// Records a caught panic.
///
/// The payload does not carry the panic location, so the trace is a
/// backtrace taken where the panic was caught when capture is enabled, and
/// the module name otherwise.
fn panic_failure(module: &str, payload: &(dyn Any + Send)) -> ModuleFailure {
    let backtrace = Backtrace::capture();
    let trace = match backtrace.status() {
        BacktraceStatus::Captured => backtrace.to_string().trim_end().to_string(),
        _ => format!("panicked in module '{module}'"),
    };
    ModuleFailure::with_trace(panic_message(payload), trace).in_module(module)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("module panicked: {detail}")
}

impl<M> Processor for Pipeline<M>
where
    M: Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.config.name
    }

    fn id(&self) -> Uuid {
        self.id
    }
}

impl<M> fmt::Debug for Pipeline<M>
where
    M: Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("modules", &self.module_names())
            .finish_non_exhaustive()
    }
}
