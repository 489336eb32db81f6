use std::collections::HashSet;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use uuid::Uuid;

use adjutant_core::TaskAction;

use crate::error::EnqueueError;
use crate::events::TaskEvent;
use crate::state::{InFlight, SchedulerState};
use crate::task::{QueuedTask, TaskStatus};
use crate::types::Priority;

use super::Scheduler;

impl Scheduler {
    /// Add a task to the pending queue.
    ///
    /// Dependencies must name tasks the scheduler knows: pending,
    /// in-flight, or remembered as completed. Ids that retired without
    /// success are rejected outright, since the task could never run.
    /// Uses the configured default deadline, if any.
    pub fn enqueue(
        &self,
        action: TaskAction,
        priority: Priority,
        dependencies: Vec<Uuid>,
    ) -> Result<QueuedTask, EnqueueError> {
        self.enqueue_with_deadline(action, priority, dependencies, self.config.default_deadline())
    }

    /// Add a task with an explicit execution deadline. `None` runs unbounded.
    pub fn enqueue_with_deadline(
        &self,
        action: TaskAction,
        priority: Priority,
        dependencies: Vec<Uuid>,
        deadline: Option<Duration>,
    ) -> Result<QueuedTask, EnqueueError> {
        let mut state = self
            .state
            .lock()
            .map_err(|e| EnqueueError::StatePoisoned(e.to_string()))?;

        let mut waiting_on = HashSet::new();
        for dep in &dependencies {
            if state.pending.iter().any(|t| t.id == *dep) || state.in_flight.contains_key(dep) {
                waiting_on.insert(*dep);
            } else {
                match state.retired.get(dep) {
                    // Already satisfied.
                    Some(TaskStatus::Completed) => {}
                    Some(status) => {
                        return Err(EnqueueError::DependencyFailed {
                            id: *dep,
                            status: *status,
                        })
                    }
                    None => return Err(EnqueueError::UnknownDependency(*dep)),
                }
            }
        }

        let seq = state.next_seq;
        state.next_seq += 1;

        let task = QueuedTask {
            id: Uuid::new_v4(),
            priority,
            dependencies: dependencies.into_iter().collect(),
            waiting_on,
            status: TaskStatus::Queued,
            progress: 0.0,
            enqueued_at: Utc::now(),
            started_at: None,
            completed_at: None,
            deadline,
            seq,
            action,
        };

        state.pending.push(task.clone());
        state.sort_pending();
        drop(state);

        debug!(task_id = %task.id, kind = %task.action.kind, ?priority, "task enqueued");
        self.emit(TaskEvent::Enqueued {
            task_id: task.id,
            kind: task.action.kind,
            priority,
        });
        Ok(task)
    }

    /// Request cancellation of a task.
    ///
    /// A pending task is removed from the queue immediately. An in-flight
    /// task is marked cancelled and its token fired, but it keeps its
    /// concurrency slot until the executor returns; this is a request, not
    /// preemption. Returns false for ids the scheduler is not tracking.
    pub fn cancel_task(&self, id: Uuid) -> bool {
        let Ok(mut state) = self.state.lock() else {
            return false;
        };

        if let Some(pos) = state.pending.iter().position(|t| t.id == id) {
            let task = state.pending.remove(pos);
            state.retired.put(id, TaskStatus::Cancelled);
            let doomed = state.fail_dependents(id);
            drop(state);

            info!(task_id = %id, kind = %task.action.kind, "pending task cancelled");
            self.emit(TaskEvent::Cancelled {
                task_id: id,
                while_pending: true,
            });
            self.note_dependency_failures(&doomed);
            return true;
        }

        if let Some(entry) = state.in_flight.get_mut(&id) {
            entry.task.status = TaskStatus::Cancelled;
            entry.cancel.cancel();
            drop(state);

            info!(task_id = %id, "cancellation requested for in-flight task");
            return true;
        }

        false
    }

    /// Store a progress value on an in-flight task, clamped to [0.0, 1.0].
    ///
    /// A no-op when the id is not currently executing.
    pub fn update_progress(&self, id: Uuid, value: f64) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let Some(progress) = state.set_progress(id, value) else {
            return;
        };
        drop(state);

        debug!(task_id = %id, progress, "progress updated");
        self.emit(TaskEvent::Progress {
            task_id: id,
            progress,
        });
    }

    /// Move eligible pending tasks into the in-flight set, highest
    /// priority first, FIFO within a priority, up to the concurrency
    /// budget. Eligible means every dependency has completed.
    pub(super) fn admit_up_to_budget(
        &self,
        state: &mut SchedulerState,
    ) -> Vec<(QueuedTask, CancellationToken)> {
        let budget = self
            .config
            .max_concurrent_tasks
            .saturating_sub(state.in_flight.len());

        let mut admitted = Vec::new();
        let mut i = 0;
        while admitted.len() < budget && i < state.pending.len() {
            if state.pending[i].waiting_on.is_empty() {
                let mut task = state.pending.remove(i);
                task.status = TaskStatus::Executing;
                task.started_at = Some(Utc::now());
                let cancel = CancellationToken::new();
                state.in_flight.insert(
                    task.id,
                    InFlight {
                        task: task.clone(),
                        cancel: cancel.clone(),
                    },
                );
                admitted.push((task, cancel));
            } else {
                i += 1;
            }
        }

        admitted
    }
}
