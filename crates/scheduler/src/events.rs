//! Live task notifications.
//!
//! Every queue transition is broadcast as a [`TaskEvent`] so observers can
//! follow execution without polling. The channel is `tokio::sync::broadcast`;
//! a slow or absent subscriber never blocks the scheduler, it just misses
//! events past the configured capacity.

use serde::Serialize;
use uuid::Uuid;

use adjutant_core::ActionKind;

use crate::types::Priority;

/// A queue transition, broadcast as it happens.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TaskEvent {
    Enqueued {
        task_id: Uuid,
        kind: ActionKind,
        priority: Priority,
    },
    Started {
        task_id: Uuid,
        kind: ActionKind,
    },
    Progress {
        task_id: Uuid,
        progress: f64,
    },
    Completed {
        task_id: Uuid,
        duration_ms: u64,
    },
    Failed {
        task_id: Uuid,
        error: String,
    },
    Cancelled {
        task_id: Uuid,
        /// True when the task never started executing.
        while_pending: bool,
    },
    TimedOut {
        task_id: Uuid,
        deadline_ms: u64,
    },
}

impl TaskEvent {
    /// The id of the task this event is about.
    pub fn task_id(&self) -> Uuid {
        match self {
            TaskEvent::Enqueued { task_id, .. }
            | TaskEvent::Started { task_id, .. }
            | TaskEvent::Progress { task_id, .. }
            | TaskEvent::Completed { task_id, .. }
            | TaskEvent::Failed { task_id, .. }
            | TaskEvent::Cancelled { task_id, .. }
            | TaskEvent::TimedOut { task_id, .. } => *task_id,
        }
    }
}
