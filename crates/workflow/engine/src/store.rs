//! Workflow store: instances, approvals, escalations and tasks
//!
//! The store is plain state with secondary indexes. It performs no
//! validation of its own; the engine decides what is legal and writes
//! the result here in one step. The active-target index is what makes
//! "one live workflow per object" cheap to enforce.

use chrono::{DateTime, Utc};
use grc_workflow_types::{
    Approval, ApprovalId, Escalation, EscalationId, EscalationStatus, TargetRef, Task, TaskId,
    TaskStatus, UserId, WorkflowInstance, WorkflowInstanceId,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// In-memory state of every workflow the engine knows about
#[derive(Clone, Debug, Default)]
pub struct WorkflowStore {
    instances: HashMap<WorkflowInstanceId, WorkflowInstance>,
    approvals: HashMap<ApprovalId, Approval>,
    escalations: HashMap<EscalationId, Escalation>,
    tasks: HashMap<TaskId, Task>,
    /// Non-terminal instance per target
    active_targets: HashMap<TargetRef, WorkflowInstanceId>,
    /// Approvals of each instance, in creation order
    approvals_by_instance: HashMap<WorkflowInstanceId, Vec<ApprovalId>>,
    /// Escalations of each approval, in creation order
    escalations_by_approval: HashMap<ApprovalId, Vec<EscalationId>>,
}

/// Serializable form of the store
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    #[serde(default)]
    pub instances: Vec<WorkflowInstance>,
    #[serde(default)]
    pub approvals: Vec<Approval>,
    #[serde(default)]
    pub escalations: Vec<Escalation>,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl WorkflowStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Insert or replace an instance, keeping the active-target index
    pub fn put_instance(&mut self, instance: WorkflowInstance) {
        if instance.is_terminal() {
            if self.active_targets.get(&instance.target) == Some(&instance.id) {
                self.active_targets.remove(&instance.target);
            }
        } else {
            self.active_targets
                .insert(instance.target.clone(), instance.id.clone());
        }
        self.instances.insert(instance.id.clone(), instance);
    }

    pub fn put_approval(&mut self, approval: Approval) {
        if !self.approvals.contains_key(&approval.id) {
            self.approvals_by_instance
                .entry(approval.instance_id.clone())
                .or_default()
                .push(approval.id.clone());
        }
        self.approvals.insert(approval.id.clone(), approval);
    }

    pub fn put_escalation(&mut self, escalation: Escalation) {
        if !self.escalations.contains_key(&escalation.id) {
            self.escalations_by_approval
                .entry(escalation.approval_id.clone())
                .or_default()
                .push(escalation.id.clone());
        }
        self.escalations.insert(escalation.id.clone(), escalation);
    }

    pub fn put_task(&mut self, task: Task) {
        self.tasks.insert(task.id.clone(), task);
    }

    // ── Instance queries ─────────────────────────────────────────────

    pub fn instance(&self, id: &WorkflowInstanceId) -> Option<&WorkflowInstance> {
        self.instances.get(id)
    }

    /// The non-terminal instance attached to a target
    pub fn active_for(&self, target: &TargetRef) -> Option<&WorkflowInstance> {
        self.active_targets
            .get(target)
            .and_then(|id| self.instances.get(id))
    }

    /// All non-terminal instances, oldest first
    pub fn active_instances(&self) -> Vec<&WorkflowInstance> {
        let mut active: Vec<_> = self
            .active_targets
            .values()
            .filter_map(|id| self.instances.get(id))
            .collect();
        active.sort_by_key(|i| i.started_at);
        active
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    // ── Approval queries ─────────────────────────────────────────────

    pub fn approval(&self, id: &ApprovalId) -> Option<&Approval> {
        self.approvals.get(id)
    }

    /// Approvals of an instance, ordered by step
    pub fn approvals_for(&self, instance_id: &WorkflowInstanceId) -> Vec<&Approval> {
        let mut approvals: Vec<_> = self
            .approvals_by_instance
            .get(instance_id)
            .map(|ids| ids.iter().filter_map(|id| self.approvals.get(id)).collect())
            .unwrap_or_default();
        approvals.sort_by_key(|a| a.step);
        approvals
    }

    /// The single pending approval of an instance, if any
    pub fn pending_approval_for(&self, instance_id: &WorkflowInstanceId) -> Option<&Approval> {
        self.approvals_by_instance
            .get(instance_id)?
            .iter()
            .filter_map(|id| self.approvals.get(id))
            .find(|a| a.is_pending())
    }

    /// Every pending approval, soonest due first
    pub fn pending_approvals(&self) -> Vec<&Approval> {
        let mut pending: Vec<_> = self.approvals.values().filter(|a| a.is_pending()).collect();
        pending.sort_by_key(|a| a.due_date);
        pending
    }

    /// Pending approvals held by a user, soonest due first
    pub fn pending_approvals_for_user(&self, user: &UserId) -> Vec<&Approval> {
        self.pending_approvals()
            .into_iter()
            .filter(|a| a.assignee.as_ref() == Some(user))
            .collect()
    }

    /// Pending approvals whose due date lies before `now`
    pub fn overdue_approvals(&self, now: DateTime<Utc>) -> Vec<&Approval> {
        self.pending_approvals()
            .into_iter()
            .filter(|a| a.is_overdue(now))
            .collect()
    }

    // ── Escalation queries ───────────────────────────────────────────

    pub fn escalation(&self, id: &EscalationId) -> Option<&Escalation> {
        self.escalations.get(id)
    }

    /// Escalations raised for an approval, oldest first
    pub fn escalations_for(&self, approval_id: &ApprovalId) -> Vec<&Escalation> {
        self.escalations_by_approval
            .get(approval_id)
            .map(|ids| ids.iter().filter_map(|id| self.escalations.get(id)).collect())
            .unwrap_or_default()
    }

    /// Whether the approval has an escalation still in flight
    pub fn has_open_escalation(&self, approval_id: &ApprovalId) -> bool {
        self.escalations_for(approval_id).iter().any(|e| e.is_open())
    }

    /// Escalations raised but whose target has not yet been notified
    pub fn pending_escalations(&self) -> Vec<&Escalation> {
        let mut pending: Vec<_> = self
            .escalations
            .values()
            .filter(|e| e.status == EscalationStatus::Pending)
            .collect();
        pending.sort_by_key(|e| e.created_at);
        pending
    }

    pub fn escalation_count(&self) -> usize {
        self.escalations.len()
    }

    // ── Task queries ─────────────────────────────────────────────────

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Tasks assigned to a user that are not completed, most urgent first:
    /// priority descending, then due date (undated last), then newest.
    pub fn tasks_for_user(&self, user: &UserId) -> Vec<&Task> {
        let mut tasks: Vec<_> = self
            .tasks
            .values()
            .filter(|t| t.assigned_to.as_ref() == Some(user))
            .filter(|t| t.status != TaskStatus::Completed)
            .collect();
        tasks.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then_with(|| match (a.due_date, b.due_date) {
                    (Some(x), Some(y)) => x.cmp(&y),
                    (Some(_), None) => std::cmp::Ordering::Less,
                    (None, Some(_)) => std::cmp::Ordering::Greater,
                    (None, None) => std::cmp::Ordering::Equal,
                })
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        tasks
    }

    /// Tasks attached to an instance, oldest first
    pub fn tasks_for_instance(&self, instance_id: &WorkflowInstanceId) -> Vec<&Task> {
        let mut tasks: Vec<_> = self
            .tasks
            .values()
            .filter(|t| t.instance_id.as_ref() == Some(instance_id))
            .collect();
        tasks.sort_by_key(|t| t.created_at);
        tasks
    }

    /// Open tasks whose due date lies before `now`
    pub fn overdue_tasks(&self, now: DateTime<Utc>) -> Vec<&Task> {
        let mut overdue: Vec<_> = self.tasks.values().filter(|t| t.is_overdue(now)).collect();
        overdue.sort_by_key(|t| t.due_date);
        overdue
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    // ── Snapshot ─────────────────────────────────────────────────────

    /// Copy the store into its serializable form
    pub fn snapshot(&self) -> StoreSnapshot {
        let mut instances: Vec<_> = self.instances.values().cloned().collect();
        instances.sort_by_key(|i| i.started_at);
        let mut approvals: Vec<_> = self.approvals.values().cloned().collect();
        approvals.sort_by_key(|a| a.created_at);
        let mut escalations: Vec<_> = self.escalations.values().cloned().collect();
        escalations.sort_by_key(|e| e.created_at);
        let mut tasks: Vec<_> = self.tasks.values().cloned().collect();
        tasks.sort_by_key(|t| t.created_at);

        StoreSnapshot {
            instances,
            approvals,
            escalations,
            tasks,
        }
    }

    /// Rebuild a store, including its indexes, from a snapshot
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut store = Self::new();
        for instance in snapshot.instances {
            store.put_instance(instance);
        }
        for approval in snapshot.approvals {
            store.put_approval(approval);
        }
        for escalation in snapshot.escalations {
            store.put_escalation(escalation);
        }
        for task in snapshot.tasks {
            store.put_task(task);
        }
        store
    }
}
