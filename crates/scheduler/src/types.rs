use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use adjutant_core::TaskAction;

use crate::error::SchedulerError;
use crate::task::QueuedTask;

/// Task scheduling priority. Higher urgency is admitted first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    /// Routine background work, runs when nothing else is waiting.
    Low = 0,
    /// Default for most tasks.
    Normal = 1,
    /// Runs ahead of routine work.
    High = 2,
    /// Jumps the queue entirely.
    Urgent = 3,
}

impl Priority {
    /// Default priority for an action. Approval-gated work runs ahead of
    /// routine work so a human is never waiting on the queue.
    pub fn for_action(action: &TaskAction) -> Priority {
        if action.requires_approval {
            Priority::High
        } else {
            Priority::Normal
        }
    }
}

/// Scheduler configuration, typically parsed from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Maximum number of tasks executing at once.
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_tasks: usize,
    /// How many retired task ids to remember for dependency validation.
    #[serde(default = "default_retired_capacity")]
    pub retired_capacity: usize,
    /// Buffered capacity of the task event channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    /// Default per-task deadline in seconds. 0 = no deadline.
    #[serde(default = "default_deadline_seconds")]
    pub default_deadline_seconds: u64,
}

fn default_max_concurrent() -> usize { 3 }
fn default_retired_capacity() -> usize { 1024 }
fn default_event_capacity() -> usize { 256 }
fn default_deadline_seconds() -> u64 { 0 }

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: default_max_concurrent(),
            retired_capacity: default_retired_capacity(),
            event_capacity: default_event_capacity(),
            default_deadline_seconds: default_deadline_seconds(),
        }
    }
}

impl SchedulerConfig {
    /// Parse config from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, SchedulerError> {
        let mut config: Self = toml::from_str(toml_str)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load config from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SchedulerError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml(&content)
    }

    /// The configured default deadline, if any.
    pub fn default_deadline(&self) -> Option<Duration> {
        if self.default_deadline_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.default_deadline_seconds))
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Convention: `ADJUTANT_KEY` overrides `key`.
    /// - `ADJUTANT_MAX_CONCURRENT_TASKS` -> `max_concurrent_tasks`
    /// - `ADJUTANT_RETIRED_CAPACITY` -> `retired_capacity`
    /// - `ADJUTANT_EVENT_CAPACITY` -> `event_capacity`
    /// - `ADJUTANT_DEFAULT_DEADLINE_SECONDS` -> `default_deadline_seconds`
    pub(crate) fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("ADJUTANT_MAX_CONCURRENT_TASKS") {
            if let Ok(n) = v.parse::<usize>() {
                self.max_concurrent_tasks = n;
            }
        }
        if let Ok(v) = std::env::var("ADJUTANT_RETIRED_CAPACITY") {
            if let Ok(n) = v.parse::<usize>() {
                self.retired_capacity = n;
            }
        }
        if let Ok(v) = std::env::var("ADJUTANT_EVENT_CAPACITY") {
            if let Ok(n) = v.parse::<usize>() {
                self.event_capacity = n;
            }
        }
        if let Ok(v) = std::env::var("ADJUTANT_DEFAULT_DEADLINE_SECONDS") {
            if let Ok(n) = v.parse::<u64>() {
                self.default_deadline_seconds = n;
            }
        }
    }

    /// Check the config for values the scheduler cannot run with.
    pub fn validate(&self) -> Result<(), SchedulerError> {
        if self.max_concurrent_tasks == 0 {
            return Err(SchedulerError::Config(
                "max_concurrent_tasks must be at least 1".to_string(),
            ));
        }
        if self.retired_capacity == 0 {
            return Err(SchedulerError::Config(
                "retired_capacity must be at least 1".to_string(),
            ));
        }
        if self.event_capacity == 0 {
            return Err(SchedulerError::Config(
                "event_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Point-in-time view of the queue.
///
/// Derived on demand and never mutated afterwards; repeated snapshots
/// without intervening queue activity are identical.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatus {
    /// Pending tasks in admission order.
    pub pending: Vec<QueuedTask>,
    /// Tasks currently executing, in admission order.
    pub in_flight: Vec<QueuedTask>,
    /// Pending plus in-flight.
    pub tracked: usize,
    /// Tasks that have ever completed successfully.
    pub completed_total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use adjutant_core::ActionKind;

    #[test]
    fn priority_ordering() {
        assert!(Priority::Low < Priority::Normal);
        assert!(Priority::Normal < Priority::High);
        assert!(Priority::High < Priority::Urgent);
    }

    #[test]
    fn priority_for_action_follows_approval() {
        let routine = TaskAction::new(ActionKind::GatherResearch, "Research");
        assert_eq!(Priority::for_action(&routine), Priority::Normal);

        let gated = TaskAction::new(ActionKind::SubmitForApproval, "Submit").with_approval();
        assert_eq!(Priority::for_action(&gated), Priority::High);
    }

    #[test]
    fn scheduler_config_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.max_concurrent_tasks, 3);
        assert_eq!(config.retired_capacity, 1024);
        assert_eq!(config.event_capacity, 256);
        assert_eq!(config.default_deadline_seconds, 0);
        assert_eq!(config.default_deadline(), None);
    }

    #[test]
    fn config_from_toml_fills_missing_fields() {
        let config = SchedulerConfig::from_toml("max_concurrent_tasks = 8\n").unwrap();
        assert_eq!(config.max_concurrent_tasks, 8);
        assert_eq!(config.retired_capacity, 1024);
    }

    #[test]
    fn config_rejects_zero_budget() {
        let err = SchedulerConfig::from_toml("max_concurrent_tasks = 0\n").unwrap_err();
        assert!(err.to_string().contains("max_concurrent_tasks"));
    }

    #[test]
    fn config_rejects_zero_history() {
        let mut config = SchedulerConfig::default();
        config.retired_capacity = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_deadline_from_seconds() {
        let mut config = SchedulerConfig::default();
        config.default_deadline_seconds = 90;
        assert_eq!(config.default_deadline(), Some(Duration::from_secs(90)));
    }
}
