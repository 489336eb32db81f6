use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AdjutantError;

/// The kinds of acquisition work the system can run autonomously.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Collect market data for the acquisition.
    GatherResearch,
    /// Produce the acquisition document package.
    GenerateDocuments,
    /// Find vendors that meet the requirements.
    IdentifyVendors,
    /// Set up the required stakeholder reviews.
    ScheduleReviews,
    /// Submit the package for approval.
    SubmitForApproval,
    /// Check the acquisition against compliance requirements.
    MonitorCompliance,
}

impl ActionKind {
    /// Every kind, in workflow order.
    pub const ALL: [ActionKind; 6] = [
        ActionKind::GatherResearch,
        ActionKind::GenerateDocuments,
        ActionKind::IdentifyVendors,
        ActionKind::ScheduleReviews,
        ActionKind::SubmitForApproval,
        ActionKind::MonitorCompliance,
    ];

    /// Stable label used in logs, metrics keys, and serialized forms.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::GatherResearch => "gather_research",
            ActionKind::GenerateDocuments => "generate_documents",
            ActionKind::IdentifyVendors => "identify_vendors",
            ActionKind::ScheduleReviews => "schedule_reviews",
            ActionKind::SubmitForApproval => "submit_for_approval",
            ActionKind::MonitorCompliance => "monitor_compliance",
        }
    }

    /// Status line shown while a task of this kind is running.
    pub fn in_progress_message(&self) -> &'static str {
        match self {
            ActionKind::GatherResearch => "Gathering market research data...",
            ActionKind::GenerateDocuments => "Generating acquisition documents...",
            ActionKind::IdentifyVendors => "Identifying qualified vendors...",
            ActionKind::ScheduleReviews => "Scheduling required reviews...",
            ActionKind::SubmitForApproval => "Submitting for approval...",
            ActionKind::MonitorCompliance => "Monitoring compliance requirements...",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = AdjutantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AdjutantError::UnknownActionKind(s.to_string()))
    }
}

/// What a task should do, described independently of how it gets scheduled.
///
/// Parameters are an opaque string map interpreted by whichever executor
/// handles the action's kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskAction {
    pub kind: ActionKind,
    /// Human-readable description for status displays.
    pub description: String,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: HashMap<String, String>,
    /// Whether a human must sign off on the result.
    #[serde(default)]
    pub requires_approval: bool,
}

impl TaskAction {
    pub fn new(kind: ActionKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            params: HashMap::new(),
            requires_approval: false,
        }
    }

    /// Attach a parameter, replacing any previous value under the same key.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Mark the action as requiring human approval.
    pub fn with_approval(mut self) -> Self {
        self.requires_approval = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_round_trip() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_label_rejected() {
        let err = "launch_rockets".parse::<ActionKind>().unwrap_err();
        assert!(err.to_string().contains("launch_rockets"));
    }

    #[test]
    fn serde_uses_snake_case_labels() {
        let json = serde_json::to_string(&ActionKind::SubmitForApproval).unwrap();
        assert_eq!(json, "\"submit_for_approval\"");
    }

    #[test]
    fn action_builder() {
        let action = TaskAction::new(ActionKind::IdentifyVendors, "Find cloud vendors")
            .with_param("segment", "cloud")
            .with_approval();

        assert_eq!(action.kind, ActionKind::IdentifyVendors);
        assert_eq!(action.params["segment"], "cloud");
        assert!(action.requires_approval);
    }

    #[test]
    fn empty_params_omitted_from_json() {
        let action = TaskAction::new(ActionKind::GatherResearch, "Research");
        let json = serde_json::to_string(&action).unwrap();
        assert!(!json.contains("params"));
    }
}
