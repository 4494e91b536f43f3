//! Workflow listeners: how domain modules hear about lifecycle events
//!
//! Listeners run after an operation has been committed. Only the
//! terminal callback is required; the rest default to no-ops.

use grc_workflow_types::{
    Approval, Escalation, TargetRef, Task, UserId, WorkflowInstance, WorkflowOutcome,
};

/// Receives workflow lifecycle events
pub trait WorkflowListener: Send + Sync {
    /// The workflow reached `completed` or `rejected`
    fn on_workflow_terminated(&self, target: &TargetRef, outcome: WorkflowOutcome);

    fn on_workflow_started(&self, _instance: &WorkflowInstance) {}

    /// An approval was approved or rejected
    fn on_step_decided(&self, _instance: &WorkflowInstance, _approval: &Approval) {}

    fn on_approval_delegated(&self, _approval: &Approval, _to: &UserId) {}

    fn on_escalated(&self, _instance: &WorkflowInstance, _escalation: &Escalation) {}

    fn on_workflow_cancelled(&self, _instance: &WorkflowInstance) {}

    fn on_task_assigned(&self, _task: &Task) {}

    /// `actor` is whoever marked the task complete
    fn on_task_completed(&self, _task: &Task, _actor: &UserId) {}
}

/// Adapts a closure to the terminal callback
pub struct FnListener<F>
where
    F: Fn(&TargetRef, WorkflowOutcome) + Send + Sync,
{
    callback: F,
}

impl<F> FnListener<F>
where
    F: Fn(&TargetRef, WorkflowOutcome) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> WorkflowListener for FnListener<F>
where
    F: Fn(&TargetRef, WorkflowOutcome) + Send + Sync,
{
    fn on_workflow_terminated(&self, target: &TargetRef, outcome: WorkflowOutcome) {
        (self.callback)(target, outcome);
    }
}
