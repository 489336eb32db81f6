use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::task::TaskOutcome;

/// Scheduler operational metrics.
///
/// The four `*_total` counters are disjoint: every retirement increments
/// exactly one of them.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SchedulerMetrics {
    /// Executions finished, by action kind label.
    pub tasks_executed: HashMap<String, u64>,
    /// Rolling average execution duration by action kind label.
    pub avg_task_duration: HashMap<String, Duration>,
    /// Last retirement time by action kind label.
    pub last_run: HashMap<String, DateTime<Utc>>,
    /// Tasks retired successfully.
    pub completed_total: u64,
    /// Tasks retired with an error, including dependency failures.
    pub failed_total: u64,
    /// Tasks cancelled while executing.
    pub cancelled_total: u64,
    /// Tasks that exceeded their deadline.
    pub timed_out_total: u64,
}

impl SchedulerMetrics {
    /// Record a retired execution.
    pub fn record_retirement(&mut self, kind: &str, outcome: &TaskOutcome, duration: Duration) {
        *self.tasks_executed.entry(kind.to_string()).or_default() += 1;
        self.last_run.insert(kind.to_string(), Utc::now());

        // Update rolling average duration
        let count = self.tasks_executed[kind];
        let prev_avg = self
            .avg_task_duration
            .get(kind)
            .copied()
            .unwrap_or_default();

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        let new_avg = if count == 1 {
            duration
        } else {
            let prev_nanos = prev_avg.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / count as f64;
            Duration::from_nanos(avg_nanos as u64)
        };

        self.avg_task_duration.insert(kind.to_string(), new_avg);

        match outcome {
            TaskOutcome::Completed { .. } => self.completed_total += 1,
            TaskOutcome::Failed { .. } => self.failed_total += 1,
            TaskOutcome::Cancelled => self.cancelled_total += 1,
            TaskOutcome::TimedOut => self.timed_out_total += 1,
        }
    }
}
