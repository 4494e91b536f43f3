//! Workflow instances: running approvals attached to a target
//!
//! An instance is born `InProgress` (the `Pending` state exists only for
//! records created outside the engine) and ends in exactly one terminal
//! state. Terminal instances are an immutable audit record.

use crate::{due_after, TargetRef, TemplateCode, UserId, WorkflowError, WorkflowResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Instance Identifier ──────────────────────────────────────────────

/// Unique identifier for a workflow instance
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorkflowInstanceId(pub String);

impl WorkflowInstanceId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn short(&self) -> &str {
        &self.0[..8.min(self.0.len())]
    }
}

impl std::fmt::Display for WorkflowInstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Workflow Instance ────────────────────────────────────────────────

/// A running (or finished) approval workflow for one target object
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowInstance {
    pub id: WorkflowInstanceId,
    /// The template this instance follows
    pub template: TemplateCode,
    /// The object under approval (title snapshot taken at start)
    pub target: TargetRef,
    pub status: InstanceStatus,
    /// 1-based index of the step currently awaiting a decision
    pub current_step: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initiator: Option<UserId>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// started_at + template default SLA
    pub due_date: DateTime<Utc>,
    /// Rejection or cancellation reason
    #[serde(default)]
    pub notes: String,
}

impl WorkflowInstance {
    /// Create an in-progress instance positioned at step 1.
    ///
    /// Fails with `Configuration` if the SLA pushes the due date off the calendar.
    pub fn new(
        template: TemplateCode,
        target: TargetRef,
        initiator: Option<UserId>,
        sla_days: u32,
        now: DateTime<Utc>,
    ) -> WorkflowResult<Self> {
        Ok(Self {
            id: WorkflowInstanceId::generate(),
            template,
            target,
            status: InstanceStatus::InProgress,
            current_step: 1,
            initiator,
            started_at: now,
            completed_at: None,
            due_date: due_after(now, sla_days)?,
            notes: String::new(),
        })
    }

    /// Move to the next step
    pub fn advance_to(&mut self, step: u32) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.current_step = step;
        Ok(())
    }

    /// Mark completed after the final approval
    pub fn complete(&mut self, now: DateTime<Utc>) -> WorkflowResult<()> {
        self.finish(InstanceStatus::Completed, now, String::new())
    }

    /// Mark rejected; the whole workflow ends
    pub fn reject(&mut self, now: DateTime<Utc>, reason: impl Into<String>) -> WorkflowResult<()> {
        self.finish(InstanceStatus::Rejected, now, reason.into())
    }

    /// Mark cancelled by an actor
    pub fn cancel(&mut self, now: DateTime<Utc>, reason: impl Into<String>) -> WorkflowResult<()> {
        self.finish(InstanceStatus::Cancelled, now, reason.into())
    }

    /// Check if the instance is terminal
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check if the instance is past its overall due date
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        !self.is_terminal() && now > self.due_date
    }

    pub fn ensure_active(&self) -> WorkflowResult<()> {
        if self.is_terminal() {
            return Err(WorkflowError::InvalidState(format!(
                "workflow {} is already {}",
                self.id, self.status
            )));
        }
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn finish(
        &mut self,
        status: InstanceStatus,
        now: DateTime<Utc>,
        notes: String,
    ) -> WorkflowResult<()> {
        self.ensure_active()?;
        self.status = status;
        self.completed_at = Some(now);
        self.notes = notes;
        Ok(())
    }
}

// ── Instance Status ──────────────────────────────────────────────────

/// Lifecycle status of a workflow instance
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Rejected,
    Cancelled,
}

impl InstanceStatus {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected | Self::Cancelled)
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// How a workflow ended, as reported to domain listeners
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowOutcome {
    Completed,
    Rejected,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ObjectKind, MAX_SLA_DAYS};
    use chrono::Duration;

    fn make_instance() -> WorkflowInstance {
        WorkflowInstance::new(
            TemplateCode::new("content-approval"),
            TargetRef::new(ObjectKind::Policy, 1, "Password policy"),
            Some(UserId::new("alice")),
            5,
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_new_instance_in_progress() {
        let inst = make_instance();
        assert_eq!(inst.status, InstanceStatus::InProgress);
        assert_eq!(inst.current_step, 1);
        assert!(inst.completed_at.is_none());
        assert_eq!((inst.due_date - inst.started_at).num_days(), 5);
    }

    #[test]
    fn test_due_date_overflow_is_an_error() {
        let result = WorkflowInstance::new(
            TemplateCode::new("content-approval"),
            TargetRef::new(ObjectKind::Policy, 1, "Password policy"),
            None,
            MAX_SLA_DAYS,
            DateTime::<Utc>::MAX_UTC,
        );
        assert!(matches!(result, Err(WorkflowError::Configuration(_))));
    }

    #[test]
    fn test_reject_records_reason() {
        let mut inst = make_instance();
        inst.reject(Utc::now(), "needs rework").unwrap();
        assert_eq!(inst.status, InstanceStatus::Rejected);
        assert_eq!(inst.notes, "needs rework");
        assert!(inst.completed_at.is_some());
    }

    #[test]
    fn test_terminal_is_immutable() {
        let mut inst = make_instance();
        inst.complete(Utc::now()).unwrap();

        assert!(matches!(
            inst.cancel(Utc::now(), "late"),
            Err(WorkflowError::InvalidState(_))
        ));
        assert!(inst.advance_to(2).is_err());
        assert_eq!(inst.status, InstanceStatus::Completed);
        assert_eq!(inst.current_step, 1);
    }

    #[test]
    fn test_overdue() {
        let inst = make_instance();
        assert!(!inst.is_overdue(inst.started_at));
        assert!(inst.is_overdue(inst.due_date + Duration::seconds(1)));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(InstanceStatus::InProgress.to_string(), "in_progress");
        assert!(InstanceStatus::Cancelled.is_terminal());
        assert!(!InstanceStatus::Pending.is_terminal());
    }
}
