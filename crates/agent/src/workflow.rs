//! The standard acquisition workflow.

use adjutant_core::{ActionKind, TaskAction};
use adjutant_scheduler::{EnqueueError, Priority, QueuedTask, Scheduler};

/// Tasks enqueued for one acquisition run.
#[derive(Debug, Clone)]
pub struct AcquisitionPlan {
    pub research: QueuedTask,
    pub documents: QueuedTask,
    pub vendors: QueuedTask,
    pub reviews: QueuedTask,
    pub approval: QueuedTask,
    pub compliance: QueuedTask,
}

impl AcquisitionPlan {
    pub fn task_count(&self) -> usize {
        6
    }
}

/// Enqueue the standard acquisition chain.
///
/// Research feeds document generation and vendor identification, reviews
/// wait on both of those, and the approval submission goes last.
/// Compliance monitoring runs independently at low priority.
pub fn enqueue_acquisition(scheduler: &Scheduler) -> Result<AcquisitionPlan, EnqueueError> {
    let research = scheduler.enqueue(
        TaskAction::new(
            ActionKind::GatherResearch,
            "Collect market research for the acquisition",
        ),
        Priority::High,
        vec![],
    )?;

    let documents = scheduler.enqueue(
        TaskAction::new(
            ActionKind::GenerateDocuments,
            "Draft the acquisition document package",
        ),
        Priority::Normal,
        vec![research.id],
    )?;

    let vendors = scheduler.enqueue(
        TaskAction::new(ActionKind::IdentifyVendors, "Shortlist qualified vendors"),
        Priority::Normal,
        vec![research.id],
    )?;

    let reviews = scheduler.enqueue(
        TaskAction::new(ActionKind::ScheduleReviews, "Schedule stakeholder reviews"),
        Priority::Normal,
        vec![documents.id, vendors.id],
    )?;

    let approval_action = TaskAction::new(
        ActionKind::SubmitForApproval,
        "Submit the acquisition package for approval",
    )
    .with_approval();
    let approval_priority = Priority::for_action(&approval_action);
    let approval = scheduler.enqueue(approval_action, approval_priority, vec![reviews.id])?;

    let compliance = scheduler.enqueue(
        TaskAction::new(
            ActionKind::MonitorCompliance,
            "Monitor compliance requirements",
        ),
        Priority::Low,
        vec![],
    )?;

    Ok(AcquisitionPlan {
        research,
        documents,
        vendors,
        reviews,
        approval,
        compliance,
    })
}
