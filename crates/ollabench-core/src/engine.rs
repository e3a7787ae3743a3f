//! Sequential run orchestrator.
//!
//! Drives every model × task pair through `Pending → Invoked → Scored | Failed`
//! with one call in flight at a time. A failed pair never stops the run.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::TransportError;
use crate::model::{InvocationResult, ModelRef, PairState, Task, Verdict};
use crate::report::RunReport;
use crate::scoring::score;
use crate::traits::{GenerateRequest, InferenceClient};

/// Per-run settings threaded through the orchestrator.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Ceiling for a single inference call.
    pub timeout: Duration,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(300),
        }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_pair_start(&self, model: &ModelRef, task: &Task);
    fn on_pair_scored(&self, invocation: &InvocationResult, verdict: &Verdict);
    fn on_pair_failed(&self, invocation: &InvocationResult);
    fn on_run_complete(&self, report: &RunReport);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_pair_start(&self, _: &ModelRef, _: &Task) {}
    fn on_pair_scored(&self, _: &InvocationResult, _: &Verdict) {}
    fn on_pair_failed(&self, _: &InvocationResult) {}
    fn on_run_complete(&self, _: &RunReport) {}
}

/// Send one task to one model and time it.
///
/// Never fails: transport problems, including the timeout expiring, come back
/// as an [`InvocationResult`] with `transport_error` set.
pub async fn invoke(
    client: &dyn InferenceClient,
    model: &ModelRef,
    task: &Task,
    timeout: Duration,
) -> InvocationResult {
    let request = GenerateRequest {
        model: model.clone(),
        prompt: task.prompt.clone(),
        timeout,
    };

    let start = Instant::now();
    let outcome = match tokio::time::timeout(timeout, client.generate(&request)).await {
        Ok(result) => result,
        Err(_) => Err(TransportError::Timeout(timeout.as_secs())),
    };
    let latency_ms = start.elapsed().as_millis() as u64;

    match outcome {
        Ok(text) => InvocationResult::success(model.clone(), task, text, latency_ms),
        Err(e) => {
            warn!(model = %model, task = %task.id, "transport failure: {e}");
            InvocationResult::failure(model.clone(), task, &e, latency_ms)
        }
    }
}

fn advance(state: &mut PairState, next: PairState) {
    debug_assert!(
        state.can_transition_to(next),
        "illegal pair transition {state} -> {next}"
    );
    *state = next;
}

/// Runs the fixed task list against a list of models.
pub struct RunOrchestrator {
    client: Arc<dyn InferenceClient>,
    tasks: Vec<Task>,
    config: RunConfig,
}

impl RunOrchestrator {
    pub fn new(client: Arc<dyn InferenceClient>, tasks: Vec<Task>, config: RunConfig) -> Self {
        Self {
            client,
            tasks,
            config,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Run every model × task pair in enumerator × registry order.
    pub async fn run(&self, models: &[ModelRef], progress: &dyn ProgressReporter) -> RunReport {
        let start = Instant::now();
        let task_ids = self.tasks.iter().map(|t| t.id.clone()).collect();
        let mut report = RunReport::new(models.to_vec(), task_ids);

        info!(
            backend = self.client.name(),
            models = models.len(),
            tasks = self.tasks.len(),
            "starting benchmark run"
        );

        for model in models {
            info!(model = %model, "testing model");
            for task in &self.tasks {
                let mut state = PairState::Pending;
                progress.on_pair_start(model, task);

                let invocation =
                    invoke(self.client.as_ref(), model, task, self.config.timeout).await;
                advance(&mut state, PairState::Invoked);

                let verdict = invocation
                    .raw_text
                    .as_deref()
                    .map(|text| score(task, model, text));

                match verdict {
                    Some(verdict) => {
                        advance(&mut state, PairState::Scored);
                        info!(
                            model = %model,
                            task = %task.id,
                            passed = verdict.passed,
                            latency_ms = invocation.latency_ms,
                            "pair scored"
                        );
                        progress.on_pair_scored(&invocation, &verdict);
                        report.record_scored(invocation, verdict);
                    }
                    None => {
                        advance(&mut state, PairState::Failed);
                        progress.on_pair_failed(&invocation);
                        report.record_failed(invocation);
                    }
                }
                debug!(model = %model, task = %task.id, %state, "pair finished");
            }
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        progress.on_run_complete(&report);
        report
    }
}
