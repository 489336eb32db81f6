//! Priority-ordered task scheduling with dependency gating and bounded
//! concurrency.
//!
//! The [`Scheduler`] owns a pending queue and an in-flight set. Callers
//! enqueue [`adjutant_core::TaskAction`]s with a [`Priority`] and optional
//! dependencies, then drive execution with [`Scheduler::process_queue`]:
//! each pass admits eligible tasks up to `max_concurrent_tasks`, runs them
//! through an injected [`TaskExecutor`], and reports one
//! [`ExecutionResult`] per retirement. Progress, cancellation, and live
//! [`TaskEvent`]s ride alongside.

pub mod error;
pub mod events;
pub mod executor;
pub mod metrics;
pub mod runner;
pub(crate) mod state;
pub mod task;
pub mod types;

pub use error::{EnqueueError, SchedulerError};
pub use events::TaskEvent;
pub use executor::{ExecuteError, ExecutionContext, ProgressReporter, TaskExecutor};
pub use metrics::SchedulerMetrics;
pub use runner::Scheduler;
pub use task::{ExecutionResult, QueuedTask, TaskOutcome, TaskStatus};
pub use types::{Priority, QueueStatus, SchedulerConfig};
