use thiserror::Error;
use uuid::Uuid;

use crate::task::TaskStatus;

/// Errors that can occur in the scheduling layer.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("config error: {0}")]
    Config(String),

    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("config I/O error: {0}")]
    ConfigIo(#[from] std::io::Error),

    #[error("scheduler state poisoned: {0}")]
    StatePoisoned(String),
}

/// Why a task was refused at enqueue.
#[derive(Debug, Error)]
pub enum EnqueueError {
    #[error("unknown dependency: {0}")]
    UnknownDependency(Uuid),

    #[error("dependency {id} retired as {status:?} and will never be satisfied")]
    DependencyFailed { id: Uuid, status: TaskStatus },

    #[error("scheduler state poisoned: {0}")]
    StatePoisoned(String),
}
