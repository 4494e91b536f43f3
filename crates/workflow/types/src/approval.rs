//! Approvals: the per-step decision records
//!
//! The engine creates one approval per step, lazily, as the instance
//! advances. Delegation changes who holds an approval but never its
//! status. Cancellation voids a still-pending approval.

use crate::{due_after, UserId, WorkflowError, WorkflowInstanceId, WorkflowResult, WorkflowStep};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Unique identifier for an approval
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApprovalId(pub String);

impl ApprovalId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for ApprovalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decision record for one workflow step
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Approval {
    pub id: ApprovalId,
    pub instance_id: WorkflowInstanceId,
    /// Order of the step this approval belongs to
    pub step: u32,
    pub step_name: String,
    /// Current holder. `None` when no assignee could be resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<UserId>,
    pub status: ApprovalStatus,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub comments: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegated_to: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delegation_reason: String,

    /// created_at + step SLA
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Last due-soon reminder sent to the assignee
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reminded_at: Option<DateTime<Utc>>,
}

impl Approval {
    /// Create a pending approval for a step
    pub fn new(
        instance_id: WorkflowInstanceId,
        step: &WorkflowStep,
        assignee: Option<UserId>,
        sla_days: u32,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Self> {
        Ok(Self {
            id: ApprovalId::generate(),
            instance_id,
            step: step.order,
            step_name: step.name.clone(),
            assignee,
            status: ApprovalStatus::Pending,
            decided_by: None,
            decided_at: None,
            comments: String::new(),
            delegated_to: None,
            delegated_at: None,
            delegation_reason: String::new(),
            due_date: due_after(now, sla_days)?,
            created_at: now,
            reminded_at: None,
        })
    }

    /// Record an approve/reject decision
    pub fn decide(
        &mut self,
        decision: Decision,
        actor: UserId,
        comments: impl Into<String>,
        now: DateTime<Utc>,
    ) -> WorkflowResult<()> {
        self.ensure_pending()?;
        self.status = decision.into();
        self.decided_by = Some(actor);
        self.decided_at = Some(now);
        self.comments = comments.into();
        Ok(())
    }

    /// Hand the approval to another user. Status stays pending.
    pub fn delegate(
        &mut self,
        to: UserId,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> WorkflowResult<()> {
        self.ensure_pending()?;
        self.assignee = Some(to.clone());
        self.delegated_to = Some(to);
        self.delegated_at = Some(now);
        self.delegation_reason = reason.into();
        Ok(())
    }

    /// Close without a decision (workflow cancelled)
    pub fn void(&mut self, now: DateTime<Utc>) -> WorkflowResult<()> {
        self.ensure_pending()?;
        self.status = ApprovalStatus::Voided;
        self.decided_at = Some(now);
        Ok(())
    }

    pub fn is_pending(&self) -> bool {
        self.status == ApprovalStatus::Pending
    }

    /// Whether the approval was ever delegated
    pub fn is_delegated(&self) -> bool {
        self.delegated_to.is_some()
    }

    /// Pending and past its due date
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.is_pending() && self.due_date < now
    }

    pub fn ensure_pending(&self) -> WorkflowResult<()> {
        if !self.is_pending() {
            return Err(WorkflowError::InvalidState(format!(
                "approval {} is already {}",
                self.id, self.status
            )));
        }
        Ok(())
    }
}

/// Status of an approval
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
    /// Closed without a decision because the workflow was cancelled
    Voided,
}

impl std::fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Voided => "voided",
        };
        f.write_str(s)
    }
}

/// A decision an assignee can take
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for ApprovalStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ApprovalStatus::Approved,
            Decision::Rejected => ApprovalStatus::Rejected,
        }
    }
}

impl std::fmt::Display for Decision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        ApprovalStatus::from(*self).fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssigneeRule;
    use chrono::Duration;

    fn make_approval() -> Approval {
        let step = WorkflowStep::new(1, "Manager review", AssigneeRule::Manager);
        Approval::new(
            WorkflowInstanceId::new("inst-1"),
            &step,
            Some(UserId::new("mgr")),
            3,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_approval() {
        let approval = make_approval();
        assert!(approval.is_pending());
        assert_eq!(approval.step, 1);
        assert_eq!((approval.due_date - approval.created_at).num_days(), 3);
        assert!(!approval.is_delegated());
    }

    #[test]
    fn test_decide_sets_metadata() {
        let mut approval = make_approval();
        approval
            .decide(Decision::Approved, UserId::new("mgr"), "ok", Utc::now())
            .unwrap();
        assert_eq!(approval.status, ApprovalStatus::Approved);
        assert_eq!(approval.decided_by, Some(UserId::new("mgr")));
        assert_eq!(approval.comments, "ok");

        let again = approval.decide(Decision::Rejected, UserId::new("mgr"), "", Utc::now());
        assert!(matches!(again, Err(WorkflowError::InvalidState(_))));
        assert_eq!(approval.status, ApprovalStatus::Approved);
    }

    #[test]
    fn test_delegate_keeps_status() {
        let mut approval = make_approval();
        approval
            .delegate(UserId::new("deputy"), "on leave", Utc::now())
            .unwrap();
        assert!(approval.is_pending());
        assert!(approval.is_delegated());
        assert_eq!(approval.assignee, Some(UserId::new("deputy")));
        assert!(approval.decided_by.is_none());
    }

    #[test]
    fn test_void_is_distinct_from_delegation() {
        let mut approval = make_approval();
        approval.void(Utc::now()).unwrap();
        assert_eq!(approval.status, ApprovalStatus::Voided);
        assert!(!approval.is_delegated());
        assert!(approval.decided_by.is_none());
        assert!(approval.void(Utc::now()).is_err());
    }

    #[test]
    fn test_overdue_only_when_pending() {
        let mut approval = make_approval();
        let later = approval.due_date + Duration::hours(1);
        assert!(approval.is_overdue(later));
        assert!(!approval.is_overdue(approval.due_date));

        approval
            .decide(Decision::Rejected, UserId::new("mgr"), "no", Utc::now())
            .unwrap();
        assert!(!approval.is_overdue(later));
    }
}
