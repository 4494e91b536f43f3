//! Escalation monitor: detects SLA breaches, due-soon approvals and
//! overdue tasks
//!
//! The monitor only looks. It reads the store and the templates and
//! returns decisions; the engine records and notifies. Running it twice
//! without intervening changes yields the same answer, and an approval
//! with an open escalation is never proposed again.

use crate::store::WorkflowStore;
use crate::template_registry::TemplateRegistry;
use chrono::{DateTime, Duration, Utc};
use grc_workflow_types::{ApprovalId, Task, UserId, WorkflowInstanceId};

/// Window ahead of the due date in which a reminder is sent
pub const REMINDER_WINDOW_HOURS: i64 = 24;

/// Minimum gap between two reminders for the same approval
pub const REMINDER_REPEAT_HOURS: i64 = 24;

/// A pending approval that should be escalated
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EscalationDecision {
    pub approval_id: ApprovalId,
    pub instance_id: WorkflowInstanceId,
    /// Holder of the approval at the time of the breach
    pub escalated_from: Option<UserId>,
    pub reason: String,
}

/// Result of one detection pass
#[derive(Clone, Debug, Default)]
pub struct MonitorScan {
    /// Pending approvals past their due date
    pub overdue: usize,
    pub decisions: Vec<EscalationDecision>,
}

/// Detects SLA breaches on pending approvals
#[derive(Clone, Debug, Default)]
pub struct EscalationMonitor;

impl EscalationMonitor {
    pub fn new() -> Self {
        Self
    }

    /// Find overdue approvals that need a new escalation.
    ///
    /// Skips approvals whose instance is terminal or whose template has
    /// escalation disabled, and those already carrying an open escalation.
    pub fn check_escalations(
        &self,
        store: &WorkflowStore,
        templates: &TemplateRegistry,
        now: DateTime<Utc>,
    ) -> MonitorScan {
        let mut scan = MonitorScan::default();

        for approval in store.overdue_approvals(now) {
            let instance = match store.instance(&approval.instance_id) {
                Some(i) if !i.is_terminal() => i,
                _ => continue,
            };
            scan.overdue += 1;

            let escalation_enabled = templates
                .get(&instance.template)
                .map(|t| t.escalation_enabled)
                .unwrap_or(false);
            if !escalation_enabled {
                continue;
            }

            if store.has_open_escalation(&approval.id) {
                continue;
            }

            scan.decisions.push(EscalationDecision {
                approval_id: approval.id.clone(),
                instance_id: instance.id.clone(),
                escalated_from: approval.assignee.clone(),
                reason: format!("SLA breached for approval step: {}", approval.step_name),
            });
        }

        scan
    }

    /// Pending, assigned approvals due within the reminder window that
    /// have not been reminded recently.
    pub fn due_for_reminder(&self, store: &WorkflowStore, now: DateTime<Utc>) -> Vec<ApprovalId> {
        let horizon = now + Duration::hours(REMINDER_WINDOW_HOURS);
        let quiet_since = now - Duration::hours(REMINDER_REPEAT_HOURS);

        store
            .pending_approvals()
            .into_iter()
            .filter(|a| a.assignee.is_some())
            .filter(|a| a.due_date >= now && a.due_date <= horizon)
            .filter(|a| a.reminded_at.map_or(true, |at| at < quiet_since))
            .filter(|a| {
                store
                    .instance(&a.instance_id)
                    .is_some_and(|i| !i.is_terminal())
            })
            .map(|a| a.id.clone())
            .collect()
    }

    /// Pending or in-progress tasks past their due date, earliest first
    pub fn overdue_tasks<'a>(
        &self,
        store: &'a WorkflowStore,
        now: DateTime<Utc>,
    ) -> Vec<&'a Task> {
        store.overdue_tasks(now)
    }
}
