use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::broadcast;

use crate::events::TaskEvent;
use crate::executor::TaskExecutor;
use crate::metrics::SchedulerMetrics;
use crate::state::SchedulerState;
use crate::types::{QueueStatus, SchedulerConfig};

/// The task scheduler. Admits pending tasks by priority under a
/// concurrency budget, gates them on dependencies, and executes them
/// through an injected [`TaskExecutor`].
///
/// Construct one per queue; there is no global instance. Callers that
/// drive scheduling passes hold it in an `Arc`.
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    /// Strategy that performs the work tasks describe.
    pub(super) executor: Arc<dyn TaskExecutor>,
    /// Queue state. Lock sections stay short and never cross an await.
    pub(super) state: Arc<Mutex<SchedulerState>>,
    /// Scheduler metrics.
    pub(super) metrics: Arc<RwLock<SchedulerMetrics>>,
    /// Live event channel. Sending with no subscribers is fine.
    pub(super) events: broadcast::Sender<TaskEvent>,
}

impl Scheduler {
    /// Create a new scheduler with the given config and executor.
    pub fn new(config: SchedulerConfig, executor: Arc<dyn TaskExecutor>) -> Self {
        let retired_capacity =
            NonZeroUsize::new(config.retired_capacity).unwrap_or(NonZeroUsize::MIN);
        let (events, _) = broadcast::channel(config.event_capacity.max(1));
        Self {
            state: Arc::new(Mutex::new(SchedulerState::new(retired_capacity))),
            metrics: Arc::new(RwLock::new(SchedulerMetrics::default())),
            config,
            executor,
            events,
        }
    }

    /// Subscribe to live task events.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.events.subscribe()
    }

    /// Get a snapshot of the current scheduler metrics.
    pub fn metrics(&self) -> SchedulerMetrics {
        self.metrics.read().unwrap().clone()
    }

    /// Get a read-only snapshot of the queue.
    ///
    /// Never mutates anything; safe to call concurrently with every other
    /// operation.
    pub fn queue_status(&self) -> QueueStatus {
        let state = self.state.lock().unwrap();
        let pending: Vec<_> = state.pending.to_vec();
        let mut in_flight: Vec<_> = state
            .in_flight
            .values()
            .map(|entry| entry.task.clone())
            .collect();
        in_flight.sort_by_key(|task| task.seq);
        drop(state);

        let completed_total = self.metrics.read().unwrap().completed_total;
        QueueStatus {
            tracked: pending.len() + in_flight.len(),
            pending,
            in_flight,
            completed_total,
        }
    }

    /// The configured concurrency budget.
    pub fn max_concurrent_tasks(&self) -> usize {
        self.config.max_concurrent_tasks
    }

    pub(super) fn emit(&self, event: TaskEvent) {
        let _ = self.events.send(event);
    }
}
