//! History entries: the append-only audit trail of a workflow
//!
//! Every engine operation writes exactly one entry. Entries carry the
//! step number at the time of the action and are never edited.

use crate::{UserId, WorkflowInstanceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One immutable line of a workflow's audit trail
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub instance_id: WorkflowInstanceId,
    /// Position in the instance's trail, assigned by the recorder
    #[serde(default)]
    pub sequence: u64,
    pub action: HistoryAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<UserId>,
    pub detail: String,
    pub step: u32,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(
        instance_id: WorkflowInstanceId,
        action: HistoryAction,
        step: u32,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            instance_id,
            sequence: 0,
            action,
            actor: None,
            detail: detail.into(),
            step,
            timestamp: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor: Option<UserId>) -> Self {
        self.actor = actor;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Action tags recorded in workflow history
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    WorkflowStarted,
    /// A non-final step was approved and the next one opened
    StepApproved,
    /// The final step was approved
    WorkflowCompleted,
    WorkflowRejected,
    WorkflowCancelled,
    ApprovalDelegated,
    Escalated,
    ReminderSent,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::WorkflowStarted => "workflow_started",
            Self::StepApproved => "step_approved",
            Self::WorkflowCompleted => "workflow_completed",
            Self::WorkflowRejected => "workflow_rejected",
            Self::WorkflowCancelled => "workflow_cancelled",
            Self::ApprovalDelegated => "approval_delegated",
            Self::Escalated => "escalated",
            Self::ReminderSent => "reminder_sent",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_builder() {
        let entry = HistoryEntry::new(
            WorkflowInstanceId::new("i-1"),
            HistoryAction::WorkflowCancelled,
            2,
            "Cancelled: superseded",
        )
        .with_actor(Some(UserId::new("admin")));
        assert_eq!(entry.step, 2);
        assert_eq!(entry.actor, Some(UserId::new("admin")));
        assert_eq!(entry.action.to_string(), "workflow_cancelled");
    }

    #[test]
    fn test_action_serde_matches_display() {
        let json = serde_json::to_string(&HistoryAction::ApprovalDelegated).unwrap();
        assert_eq!(json, format!("\"{}\"", HistoryAction::ApprovalDelegated));
    }
}
