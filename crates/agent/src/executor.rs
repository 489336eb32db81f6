use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};

use adjutant_core::{ActionKind, TaskAction};
use adjutant_scheduler::{ExecuteError, ExecutionContext, TaskExecutor};

/// Number of progress stages each simulated action runs through.
const STAGES: u32 = 4;

/// Executes acquisition actions by simulating timed work.
///
/// Every kind runs the same shape: log the in-progress message, sleep
/// through a fixed number of stages with a progress report at each
/// boundary, then return the canned result map for the kind. The
/// cancellation token is checked between stages.
pub struct SimulatedExecutor {
    step_delay: Duration,
}

impl SimulatedExecutor {
    pub fn new(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    /// Canned result payload for a finished action.
    fn output_for(kind: ActionKind) -> HashMap<String, String> {
        let mut output = HashMap::new();
        let summary = match kind {
            ActionKind::GatherResearch => {
                output.insert("market_data_collected".to_string(), "true".to_string());
                output.insert("sources".to_string(), "15".to_string());
                "Market research complete. Found relevant data from 15 sources."
            }
            ActionKind::GenerateDocuments => {
                output.insert("documents_generated".to_string(), "true".to_string());
                "Documents generated successfully. Ready for review."
            }
            ActionKind::IdentifyVendors => {
                output.insert("vendors_identified".to_string(), "8".to_string());
                "Identified 8 qualified vendors meeting requirements."
            }
            ActionKind::ScheduleReviews => {
                output.insert("review_request_sent".to_string(), "true".to_string());
                "Reviews scheduled with all stakeholders."
            }
            ActionKind::SubmitForApproval => {
                output.insert("tracking_number".to_string(), "AP-2025-0142".to_string());
                "Submitted for approval. Tracking number: AP-2025-0142"
            }
            ActionKind::MonitorCompliance => {
                output.insert("compliance_checked".to_string(), "true".to_string());
                "Compliance check complete. All requirements met."
            }
        };
        output.insert("summary".to_string(), summary.to_string());
        output
    }
}

#[async_trait]
impl TaskExecutor for SimulatedExecutor {
    async fn execute(
        &self,
        action: &TaskAction,
        ctx: &ExecutionContext,
    ) -> Result<HashMap<String, String>, ExecuteError> {
        info!(
            task_id = %ctx.task_id,
            kind = %action.kind,
            "{}",
            action.kind.in_progress_message()
        );

        for stage in 1..=STAGES {
            tokio::select! {
                _ = ctx.cancel.cancelled() => {
                    debug!(task_id = %ctx.task_id, stage, "stopping cancelled action");
                    return Err(ExecuteError::Cancelled);
                }
                _ = tokio::time::sleep(self.step_delay) => {}
            }
            ctx.progress.report(f64::from(stage) / f64::from(STAGES));
        }

        Ok(Self::output_for(action.kind))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use adjutant_scheduler::{Priority, Scheduler, SchedulerConfig, TaskOutcome};

    use super::*;

    fn fast_scheduler() -> Arc<Scheduler> {
        let executor = Arc::new(SimulatedExecutor::new(Duration::from_millis(5)));
        Arc::new(Scheduler::new(SchedulerConfig::default(), executor))
    }

    #[tokio::test]
    async fn research_produces_source_count() {
        let scheduler = fast_scheduler();
        scheduler
            .enqueue(
                TaskAction::new(ActionKind::GatherResearch, "collect research"),
                Priority::Normal,
                vec![],
            )
            .unwrap();

        let results = scheduler.process_queue().await.unwrap();
        assert_eq!(results.len(), 1);
        match &results[0].outcome {
            TaskOutcome::Completed { output } => {
                assert_eq!(output.get("sources").map(String::as_str), Some("15"));
                assert!(output["summary"].contains("15 sources"));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn approval_carries_tracking_number() {
        let scheduler = fast_scheduler();
        scheduler
            .enqueue(
                TaskAction::new(ActionKind::SubmitForApproval, "submit package").with_approval(),
                Priority::High,
                vec![],
            )
            .unwrap();

        let results = scheduler.process_queue().await.unwrap();
        match &results[0].outcome {
            TaskOutcome::Completed { output } => {
                assert_eq!(
                    output.get("tracking_number").map(String::as_str),
                    Some("AP-2025-0142")
                );
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_stops_between_stages() {
        let executor = Arc::new(SimulatedExecutor::new(Duration::from_millis(100)));
        let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default(), executor));
        let task = scheduler
            .enqueue(
                TaskAction::new(ActionKind::MonitorCompliance, "watch requirements"),
                Priority::Normal,
                vec![],
            )
            .unwrap();

        let background = scheduler.clone();
        let handle = tokio::spawn(async move { background.process_queue().await });
        tokio::time::sleep(Duration::from_millis(30)).await;

        assert!(scheduler.cancel_task(task.id));
        let results = handle.await.unwrap().unwrap();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0].outcome, TaskOutcome::Cancelled));
        // Stopped at the next stage boundary, well short of four full stages.
        assert!(results[0].duration < Duration::from_millis(300));
    }

    #[tokio::test]
    async fn progress_lands_on_stage_boundaries() {
        let scheduler = fast_scheduler();
        let mut rx = scheduler.subscribe();
        scheduler
            .enqueue(
                TaskAction::new(ActionKind::GenerateDocuments, "draft documents"),
                Priority::Normal,
                vec![],
            )
            .unwrap();
        scheduler.process_queue().await.unwrap();

        let mut reported = Vec::new();
        while let Ok(event) = rx.try_recv() {
            if let adjutant_scheduler::TaskEvent::Progress { progress, .. } = event {
                reported.push(progress);
            }
        }
        assert_eq!(reported, vec![0.25, 0.5, 0.75, 1.0]);
    }
}
