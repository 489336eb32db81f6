use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::time::Duration;

use chrono::Utc;
use lru::LruCache;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::task::{ExecutionResult, QueuedTask, TaskOutcome, TaskStatus};

/// A task that has been admitted and is executing.
pub(crate) struct InFlight {
    pub(crate) task: QueuedTask,
    /// Fired when cancellation is requested; the executor decides when to stop.
    pub(crate) cancel: CancellationToken,
}

/// Everything the scheduler mutates, behind one lock.
///
/// Invariant: a task id appears in at most one of `pending` and
/// `in_flight`; once retired it appears in neither and its terminal
/// status lives in `retired` until evicted.
pub(crate) struct SchedulerState {
    /// Pending tasks, kept sorted by (priority desc, seq asc).
    pub(crate) pending: Vec<QueuedTask>,
    pub(crate) in_flight: HashMap<Uuid, InFlight>,
    /// Terminal status of recently retired tasks, bounded.
    pub(crate) retired: LruCache<Uuid, TaskStatus>,
    /// Next enqueue sequence number.
    pub(crate) next_seq: u64,
    /// Tasks retired because a dependency went unsatisfied, waiting to be
    /// reported by the next scheduling pass.
    pub(crate) dependency_failures: Vec<ExecutionResult>,
}

impl SchedulerState {
    pub(crate) fn new(retired_capacity: NonZeroUsize) -> Self {
        Self {
            pending: Vec::new(),
            in_flight: HashMap::new(),
            retired: LruCache::new(retired_capacity),
            next_seq: 0,
            dependency_failures: Vec::new(),
        }
    }

    /// Restore pending order after an insert.
    pub(crate) fn sort_pending(&mut self) {
        self.pending
            .sort_by(|a, b| b.priority.cmp(&a.priority).then(a.seq.cmp(&b.seq)));
    }

    /// Clamp and store progress on an in-flight task.
    ///
    /// Returns the stored value, or None when the id is not in flight.
    pub(crate) fn set_progress(&mut self, id: Uuid, value: f64) -> Option<f64> {
        let entry = self.in_flight.get_mut(&id)?;
        let clamped = value.clamp(0.0, 1.0);
        entry.task.progress = clamped;
        Some(clamped)
    }

    /// Drop `done` from every pending task's wait set.
    pub(crate) fn mark_satisfied(&mut self, done: Uuid) {
        for task in &mut self.pending {
            task.waiting_on.remove(&done);
        }
    }

    /// Retire every pending task that depends, directly or transitively, on
    /// a task that went unsatisfied. The results are buffered in
    /// `dependency_failures` for the next scheduling pass and also returned
    /// so the caller can record metrics and emit events.
    pub(crate) fn fail_dependents(&mut self, root: Uuid) -> Vec<ExecutionResult> {
        let mut unsatisfied = vec![root];
        let mut doomed = Vec::new();

        while let Some(cause) = unsatisfied.pop() {
            let mut i = 0;
            while i < self.pending.len() {
                if self.pending[i].dependencies.contains(&cause) {
                    let mut task = self.pending.remove(i);
                    task.status = TaskStatus::Failed;
                    task.completed_at = Some(Utc::now());
                    self.retired.put(task.id, TaskStatus::Failed);
                    unsatisfied.push(task.id);
                    doomed.push(ExecutionResult {
                        task_id: task.id,
                        kind: task.action.kind,
                        outcome: TaskOutcome::Failed {
                            error: format!("dependency {cause} will never complete"),
                        },
                        duration: Duration::ZERO,
                    });
                } else {
                    i += 1;
                }
            }
        }

        self.dependency_failures.extend(doomed.iter().cloned());
        doomed
    }
}
