use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::SchedulerError;
use crate::events::TaskEvent;
use crate::executor::{ExecuteError, ExecutionContext, ProgressReporter};
use crate::task::{ExecutionResult, QueuedTask, TaskOutcome};

use super::Scheduler;

impl Scheduler {
    /// Run one scheduling pass.
    ///
    /// Admits as many eligible pending tasks as the concurrency budget
    /// allows, dispatches them onto the runtime, and waits for every one
    /// of them to retire. The returned list holds one result per task
    /// retired by this pass, in admission order, preceded by any tasks
    /// retired since the last pass because a dependency went unsatisfied.
    ///
    /// Concurrent passes are safe: admission is atomic, so two passes
    /// never admit the same task and together never exceed the budget.
    /// Callers that want completions as they happen subscribe to the
    /// event stream instead of waiting on this future.
    pub async fn process_queue(self: &Arc<Self>) -> Result<Vec<ExecutionResult>, SchedulerError> {
        let (mut results, admitted) = {
            let mut state = self
                .state
                .lock()
                .map_err(|e| SchedulerError::StatePoisoned(e.to_string()))?;
            let swept: Vec<ExecutionResult> = state.dependency_failures.drain(..).collect();
            let admitted = self.admit_up_to_budget(&mut state);
            (swept, admitted)
        };

        if admitted.is_empty() {
            return Ok(results);
        }

        debug!(admitted = admitted.len(), "scheduling pass dispatching");

        let mut dispatched = Vec::with_capacity(admitted.len());
        let mut handles = Vec::with_capacity(admitted.len());
        for (task, cancel) in admitted {
            self.emit(TaskEvent::Started {
                task_id: task.id,
                kind: task.action.kind,
            });
            dispatched.push(task.clone());
            let this = Arc::clone(self);
            handles.push(tokio::spawn(async move { this.dispatch(task, cancel).await }));
        }

        for (task, joined) in dispatched.into_iter().zip(join_all(handles).await) {
            match joined {
                Ok(result) => results.push(result),
                // An executor panicked mid-flight. Retire the task anyway
                // so its slot is freed and the pass still reports it.
                Err(e) => {
                    error!(task_id = %task.id, error = %e, "dispatched task panicked");
                    let outcome = TaskOutcome::Failed {
                        error: format!("executor panicked: {e}"),
                    };
                    self.retire(&task, &outcome, Duration::ZERO);
                    results.push(ExecutionResult {
                        task_id: task.id,
                        kind: task.action.kind,
                        outcome,
                        duration: Duration::ZERO,
                    });
                }
            }
        }

        Ok(results)
    }

    /// Execute one admitted task to retirement.
    async fn dispatch(&self, task: QueuedTask, cancel: CancellationToken) -> ExecutionResult {
        let start = Instant::now();
        let ctx = ExecutionContext {
            task_id: task.id,
            progress: ProgressReporter::new(task.id, Arc::clone(&self.state), self.events.clone()),
            cancel: cancel.clone(),
        };

        debug!(task_id = %task.id, kind = %task.action.kind, "executing task");

        let exec = self.executor.execute(&task.action, &ctx);
        let outcome = match task.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, exec).await {
                Ok(result) => Self::outcome_after(result, &cancel),
                Err(_) => {
                    // The executor future is dropped; fire the token for
                    // anything it spawned.
                    cancel.cancel();
                    TaskOutcome::TimedOut
                }
            },
            None => Self::outcome_after(exec.await, &cancel),
        };

        let duration = start.elapsed();
        self.retire(&task, &outcome, duration);

        ExecutionResult {
            task_id: task.id,
            kind: task.action.kind,
            outcome,
            duration,
        }
    }

    /// Map an executor return to an outcome. A fired token wins over
    /// whatever the executor returned: once cancellation was requested the
    /// task retires as cancelled.
    fn outcome_after(
        result: Result<HashMap<String, String>, ExecuteError>,
        cancel: &CancellationToken,
    ) -> TaskOutcome {
        if cancel.is_cancelled() {
            return TaskOutcome::Cancelled;
        }
        match result {
            Ok(output) => TaskOutcome::Completed { output },
            Err(ExecuteError::Cancelled) => TaskOutcome::Cancelled,
            Err(ExecuteError::Failed(error)) => TaskOutcome::Failed { error },
        }
    }

    /// Remove a finished task from the in-flight set, record its terminal
    /// status, update metrics, notify dependents, and emit the terminal
    /// event.
    fn retire(&self, task: &QueuedTask, outcome: &TaskOutcome, duration: Duration) {
        let status = outcome.final_status();
        let doomed = match self.state.lock() {
            Ok(mut state) => {
                state.in_flight.remove(&task.id);
                state.retired.put(task.id, status);
                if outcome.is_success() {
                    state.mark_satisfied(task.id);
                    Vec::new()
                } else {
                    state.fail_dependents(task.id)
                }
            }
            Err(_) => Vec::new(),
        };

        if let Ok(mut metrics) = self.metrics.write() {
            metrics.record_retirement(task.action.kind.as_str(), outcome, duration);
        }

        let elapsed_ms = duration.as_millis() as u64;
        match outcome {
            TaskOutcome::Completed { .. } => {
                info!(task_id = %task.id, kind = %task.action.kind, elapsed_ms, "task completed");
                self.emit(TaskEvent::Completed {
                    task_id: task.id,
                    duration_ms: elapsed_ms,
                });
            }
            TaskOutcome::Failed { error } => {
                warn!(task_id = %task.id, kind = %task.action.kind, error = %error, "task failed");
                self.emit(TaskEvent::Failed {
                    task_id: task.id,
                    error: error.clone(),
                });
            }
            TaskOutcome::Cancelled => {
                info!(task_id = %task.id, kind = %task.action.kind, "task cancelled");
                self.emit(TaskEvent::Cancelled {
                    task_id: task.id,
                    while_pending: false,
                });
            }
            TaskOutcome::TimedOut => {
                let deadline_ms = task
                    .deadline
                    .map(|d| d.as_millis() as u64)
                    .unwrap_or(elapsed_ms);
                warn!(task_id = %task.id, kind = %task.action.kind, deadline_ms, "task timed out");
                self.emit(TaskEvent::TimedOut {
                    task_id: task.id,
                    deadline_ms,
                });
            }
        }

        self.note_dependency_failures(&doomed);
    }

    /// Record and announce tasks retired because a dependency went
    /// unsatisfied.
    pub(super) fn note_dependency_failures(&self, doomed: &[ExecutionResult]) {
        if doomed.is_empty() {
            return;
        }
        if let Ok(mut metrics) = self.metrics.write() {
            metrics.failed_total += doomed.len() as u64;
        }
        for result in doomed {
            warn!(task_id = %result.task_id, kind = %result.kind, "task retired: dependency will never be satisfied");
            if let TaskOutcome::Failed { error } = &result.outcome {
                self.emit(TaskEvent::Failed {
                    task_id: result.task_id,
                    error: error.clone(),
                });
            }
        }
    }
}
