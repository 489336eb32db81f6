use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use adjutant_core::{ActionKind, TaskAction};

use super::types::Priority;

/// Lifecycle state of a task.
///
/// `Queued` and `Executing` are live; the rest are terminal and never
/// transition again. A task cancelled while still pending skips
/// `Executing` and goes straight to `Cancelled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Queued,
    Executing,
    Completed,
    Failed,
    Cancelled,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskStatus::Completed | TaskStatus::Failed | TaskStatus::Cancelled
        )
    }
}

/// A task under the scheduler's control.
///
/// Identity, action, priority, and dependencies are fixed at enqueue;
/// the scheduler owns every later mutation of status and progress.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedTask {
    pub id: Uuid,
    pub action: TaskAction,
    pub priority: Priority,
    /// Tasks that must complete successfully before this one runs.
    pub dependencies: HashSet<Uuid>,
    /// The subset of `dependencies` not yet satisfied.
    pub waiting_on: HashSet<Uuid>,
    pub status: TaskStatus,
    /// Completion fraction in [0.0, 1.0].
    pub progress: f64,
    pub enqueued_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Execution deadline; None runs unbounded.
    pub deadline: Option<Duration>,
    /// Enqueue order, breaks ties between equal priorities.
    #[serde(skip)]
    pub(crate) seq: u64,
}

/// How an execution ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TaskOutcome {
    Completed { output: HashMap<String, String> },
    Failed { error: String },
    Cancelled,
    TimedOut,
}

impl TaskOutcome {
    /// The terminal status this outcome retires the task with.
    pub fn final_status(&self) -> TaskStatus {
        match self {
            TaskOutcome::Completed { .. } => TaskStatus::Completed,
            TaskOutcome::Failed { .. } | TaskOutcome::TimedOut => TaskStatus::Failed,
            TaskOutcome::Cancelled => TaskStatus::Cancelled,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Completed { .. })
    }
}

/// What a scheduling pass reports for each task it retired.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionResult {
    pub task_id: Uuid,
    /// Kind of the retired task's action.
    pub kind: ActionKind,
    pub outcome: TaskOutcome,
    /// Wall-clock execution time. Zero for tasks that never ran.
    pub duration: Duration,
}
