use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use adjutant_core::TaskAction;

use crate::events::TaskEvent;
use crate::state::SchedulerState;

/// Error type for task execution.
#[derive(Debug, thiserror::Error)]
pub enum ExecuteError {
    #[error("task failed: {0}")]
    Failed(String),
    #[error("task cancelled")]
    Cancelled,
}

/// Performs the work a task describes.
///
/// Implementations own the domain side of an action: the scheduler hands
/// over the action and a context and treats the returned output keys as
/// opaque. A failure is final; the scheduler never retries.
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(
        &self,
        action: &TaskAction,
        ctx: &ExecutionContext,
    ) -> Result<HashMap<String, String>, ExecuteError>;
}

/// Handle an executor uses to report completion fraction.
///
/// Values are clamped to [0.0, 1.0]; reports for a task that is no longer
/// in flight are dropped silently, so an executor racing its own
/// cancellation never has to check first.
#[derive(Clone)]
pub struct ProgressReporter {
    task_id: Uuid,
    state: Arc<Mutex<SchedulerState>>,
    events: broadcast::Sender<TaskEvent>,
}

impl ProgressReporter {
    pub(crate) fn new(
        task_id: Uuid,
        state: Arc<Mutex<SchedulerState>>,
        events: broadcast::Sender<TaskEvent>,
    ) -> Self {
        Self {
            task_id,
            state,
            events,
        }
    }

    pub fn report(&self, value: f64) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        let Some(progress) = state.set_progress(self.task_id, value) else {
            return;
        };
        drop(state);
        let _ = self.events.send(TaskEvent::Progress {
            task_id: self.task_id,
            progress,
        });
    }
}

/// What an executor can see about the task it is running.
pub struct ExecutionContext {
    pub task_id: Uuid,
    pub progress: ProgressReporter,
    /// Fires when cancellation has been requested. Cooperative: the
    /// executor should stop promptly, but nothing forces it to.
    pub cancel: CancellationToken,
}

impl ExecutionContext {
    /// True once cancellation has been requested for this task.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}
