//! Escalations: what happens when an approval sits past its SLA
//!
//! A breached approval is escalated once, at level 1, to its holder's
//! department manager. The record stays open (`Pending`, then
//! `Escalated` once the manager has been told) until the approval is
//! decided or the workflow is cancelled.

use crate::{ApprovalId, UserId, WorkflowInstanceId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The only escalation level raised for an SLA breach
pub const FIRST_ESCALATION_LEVEL: u32 = 1;

/// Unique identifier for an escalation record
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EscalationId(pub String);

impl EscalationId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl std::fmt::Display for EscalationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An SLA-breach escalation for one approval
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Escalation {
    pub id: EscalationId,
    pub approval_id: ApprovalId,
    pub instance_id: WorkflowInstanceId,
    /// Target title snapshot, for the escalation notice
    pub object_title: String,
    pub level: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalated_from: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub escalated_to: Option<UserId>,
    pub reason: String,
    pub status: EscalationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Escalation {
    /// Open a level-1 escalation
    pub fn open(
        approval_id: ApprovalId,
        instance_id: WorkflowInstanceId,
        object_title: impl Into<String>,
        escalated_from: Option<UserId>,
        escalated_to: Option<UserId>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EscalationId::generate(),
            approval_id,
            instance_id,
            object_title: object_title.into(),
            level: FIRST_ESCALATION_LEVEL,
            escalated_from,
            escalated_to,
            reason: reason.into(),
            status: EscalationStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this record still blocks a new escalation of its approval
    pub fn is_open(&self) -> bool {
        matches!(
            self.status,
            EscalationStatus::Pending | EscalationStatus::Escalated
        )
    }

    /// Transition to a new status
    pub fn set_status(&mut self, status: EscalationStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

/// Status of an escalation record
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    /// Raised, escalation target not yet notified
    #[default]
    Pending,
    /// Escalation target notified
    Escalated,
    /// The approval was decided
    Resolved,
    /// The workflow was cancelled
    Cancelled,
}
