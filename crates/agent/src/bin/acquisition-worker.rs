//! acquisition-worker — drives a simulated acquisition workflow through
//! the task scheduler.
//!
//! Enqueues the standard acquisition chain (research feeding documents
//! and vendor identification, reviews behind both, approval last) plus
//! an independent compliance check, then runs scheduling passes until
//! the queue drains. Task events stream to the log as they happen; the
//! final queue status and per-kind metrics are rendered when the run
//! completes.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use adjutant_agent::{enqueue_acquisition, SimulatedExecutor};
use adjutant_scheduler::{Scheduler, SchedulerConfig, TaskEvent};

// ── CLI ─────────────────────────────────────────────────────────────

/// Acquisition worker — schedules and executes the simulated acquisition chain.
#[derive(Parser, Debug)]
#[command(name = "acquisition-worker", version, about)]
struct Cli {
    /// Path to adjutant.toml config file.
    #[arg(long, env = "ADJUTANT_CONFIG", default_value = "config/adjutant.toml")]
    config: String,

    /// Simulated work per executor stage, in milliseconds.
    #[arg(long, env = "ADJUTANT_STEP_DELAY_MS", default_value_t = 200)]
    step_delay_ms: u64,
}

// ── event log ───────────────────────────────────────────────────────

fn log_event(event: &TaskEvent) {
    match event {
        TaskEvent::Enqueued {
            task_id,
            kind,
            priority,
        } => {
            info!(task_id = %task_id, kind = %kind, priority = ?priority, "task enqueued");
        }
        TaskEvent::Started { task_id, kind } => {
            info!(task_id = %task_id, kind = %kind, "task started");
        }
        TaskEvent::Progress { task_id, progress } => {
            info!(task_id = %task_id, progress, "task progress");
        }
        TaskEvent::Completed {
            task_id,
            duration_ms,
        } => {
            info!(task_id = %task_id, duration_ms, "task completed");
        }
        TaskEvent::Failed { task_id, error } => {
            warn!(task_id = %task_id, error = %error, "task failed");
        }
        TaskEvent::Cancelled {
            task_id,
            while_pending,
        } => {
            info!(task_id = %task_id, while_pending, "task cancelled");
        }
        TaskEvent::TimedOut {
            task_id,
            deadline_ms,
        } => {
            warn!(task_id = %task_id, deadline_ms, "task deadline exceeded");
        }
    }
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // Load scheduler config (fall back to defaults if file not found)
    let config = match SchedulerConfig::from_file(&cli.config) {
        Ok(cfg) => {
            info!(path = %cli.config, "loaded scheduler config");
            cfg
        }
        Err(e) => {
            warn!(
                error = %e,
                path = %cli.config,
                "failed to load config, using defaults"
            );
            SchedulerConfig::default()
        }
    };

    let executor = Arc::new(SimulatedExecutor::new(Duration::from_millis(
        cli.step_delay_ms,
    )));
    let scheduler = Arc::new(Scheduler::new(config, executor));

    // Stream task events to the log for the lifetime of the run.
    let mut events = scheduler.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    info!(
        budget = scheduler.max_concurrent_tasks(),
        "acquisition-worker starting"
    );

    let plan = enqueue_acquisition(&scheduler)?;
    info!(tasks = plan.task_count(), "acquisition workflow enqueued");

    let mut passes = 0u32;
    while scheduler.queue_status().tracked > 0 {
        let results = scheduler.process_queue().await?;
        passes += 1;
        if results.is_empty() {
            warn!(pass = passes, "no tasks admitted, queue stalled");
            break;
        }
        info!(pass = passes, retired = results.len(), "scheduling pass complete");
    }

    let status = scheduler.queue_status();
    println!("{}", serde_json::to_string_pretty(&status)?);

    let metrics = scheduler.metrics();
    for (kind, count) in &metrics.tasks_executed {
        let avg_ms = metrics
            .avg_task_duration
            .get(kind)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        info!(kind = %kind, count, avg_ms, "executions by kind");
    }
    info!(
        completed = metrics.completed_total,
        failed = metrics.failed_total,
        cancelled = metrics.cancelled_total,
        timed_out = metrics.timed_out_total,
        "acquisition-worker exited cleanly"
    );

    Ok(())
}
