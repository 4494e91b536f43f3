//! Notifiers: best-effort delivery of workflow messages
//!
//! The engine composes messages and hands them to a [`Notifier`]. A
//! failed delivery is logged and dropped; it never fails the operation
//! that caused it.

use grc_workflow_types::{
    Approval, Escalation, Notification, NotificationRef, NotifyError, Priority, Task,
    TaskPriority, UserId, WorkflowInstance, WorkflowOutcome, WorkflowTemplate,
};
use parking_lot::RwLock;

/// Delivery channel for notifications
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Notifier that only writes to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %notification.recipient,
            priority = ?notification.priority,
            subject = %notification.subject,
            "Notification"
        );
        Ok(())
    }
}

/// Notifier that keeps every message in an outbox
pub struct MemoryNotifier {
    outbox: RwLock<Vec<Notification>>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self {
            outbox: RwLock::new(Vec::new()),
        }
    }

    /// All notifications sent so far
    pub fn sent(&self) -> Vec<Notification> {
        self.outbox.read().clone()
    }

    /// Notifications sent to one user
    pub fn sent_to(&self, user: &UserId) -> Vec<Notification> {
        self.outbox
            .read()
            .iter()
            .filter(|n| &n.recipient == user)
            .cloned()
            .collect()
    }

    pub fn count(&self) -> usize {
        self.outbox.read().len()
    }

    pub fn clear(&self) {
        self.outbox.write().clear();
    }
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.outbox.write().push(notification.clone());
        Ok(())
    }
}

// ── Messages ─────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

/// "Approval Required" for a newly created or delegated approval
pub(crate) fn approval_required(
    recipient: UserId,
    approval: &Approval,
    instance: &WorkflowInstance,
    template: &WorkflowTemplate,
) -> Notification {
    let instructions = template
        .step(approval.step)
        .map(|s| s.instructions.as_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Please review and take action.");

    let body = format!(
        "You have a pending approval request.\n\n\
         Workflow: {}\nItem: {}\nStep: {}\nDue Date: {}\n\n{}",
        template.name,
        instance.target.title,
        approval.step_name,
        approval.due_date.format(DATE_FORMAT),
        instructions,
    );

    Notification::new(
        recipient,
        format!("Approval Required: {}", instance.target.title),
        body,
        NotificationRef::Approval(approval.id.to_string()),
    )
}

/// Reminder for an approval falling due within a day
pub(crate) fn approval_reminder(
    recipient: UserId,
    approval: &Approval,
    instance: &WorkflowInstance,
    template: &WorkflowTemplate,
) -> Notification {
    let body = format!(
        "This is a reminder that you have a pending approval due soon.\n\n\
         Workflow: {}\nItem: {}\nStep: {}\nDue Date: {}\n\n\
         Please take action before the deadline to avoid escalation.",
        template.name,
        instance.target.title,
        approval.step_name,
        approval.due_date.format(DATE_FORMAT),
    );

    Notification::new(
        recipient,
        format!("Reminder: Approval Due Soon - {}", instance.target.title),
        body,
        NotificationRef::Approval(approval.id.to_string()),
    )
    .with_priority(Priority::High)
}

/// Notice to the escalation target about an SLA breach
pub(crate) fn escalation_notice(recipient: UserId, escalation: &Escalation) -> Notification {
    let from = escalation
        .escalated_from
        .as_ref()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "Unknown".to_string());

    let body = format!(
        "An item has been escalated to you due to SLA breach.\n\n\
         Item: {}\nReason: {}\nLevel: {}\nOriginally assigned to: {}\n\n\
         Please review and take appropriate action.",
        escalation.object_title, escalation.reason, escalation.level, from,
    );

    Notification::new(
        recipient,
        format!("Escalation: {}", escalation.object_title),
        body,
        NotificationRef::Escalation(escalation.id.to_string()),
    )
    .with_priority(Priority::Urgent)
}

/// Completion or rejection notice for the initiator
pub(crate) fn workflow_outcome(
    recipient: UserId,
    instance: &WorkflowInstance,
    template: &WorkflowTemplate,
    outcome: WorkflowOutcome,
) -> Notification {
    let label = match outcome {
        WorkflowOutcome::Completed => "Completed",
        WorkflowOutcome::Rejected => "Rejected",
    };
    let mut body = format!(
        "Workflow: {}\nItem: {}\nStatus: {}\nFinal Step: {}",
        template.name, instance.target.title, instance.status, instance.current_step,
    );
    if !instance.notes.is_empty() {
        body.push_str(&format!("\n\n{}", instance.notes));
    }

    Notification::new(
        recipient,
        format!("Workflow {}: {}", label, instance.target.title),
        body,
        NotificationRef::Instance(instance.id.to_string()),
    )
}

/// "New Task Assigned" for the task's assignee
pub(crate) fn task_assigned(recipient: UserId, task: &Task) -> Notification {
    let due = task
        .due_date
        .map(|d| d.format(DATE_FORMAT).to_string())
        .unwrap_or_else(|| "None".to_string());
    let mut body = format!(
        "You have been assigned a new task.\n\nTask: {}\nPriority: {:?}\nDue Date: {}",
        task.title, task.priority, due,
    );
    if !task.description.is_empty() {
        body.push_str(&format!("\n\n{}", task.description));
    }

    let priority = match task.priority {
        TaskPriority::Critical => Priority::Urgent,
        TaskPriority::High => Priority::High,
        TaskPriority::Medium | TaskPriority::Low => Priority::Normal,
    };

    Notification::new(
        recipient,
        format!("New Task Assigned: {}", task.title),
        body,
        NotificationRef::Task(task.id.to_string()),
    )
    .with_priority(priority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use grc_workflow_types::{AssigneeRule, ObjectKind, TargetRef, WorkflowStep};

    fn fixture() -> (WorkflowTemplate, WorkflowInstance, Approval) {
        let template = WorkflowTemplate::new("bcm-plan", "BCM plan sign-off").with_step(
            WorkflowStep::new(1, "Plan owner", AssigneeRule::Owner)
                .with_instructions("Check recovery objectives."),
        );
        let instance = WorkflowInstance::new(
            template.code.clone(),
            TargetRef::new(ObjectKind::BcmPlan, 11, "Data centre failover"),
            Some(UserId::new("ines")),
            5,
            Utc::now(),
        )
        .unwrap();
        let approval = Approval::new(
            instance.id.clone(),
            &template.steps[0],
            Some(UserId::new("omar")),
            5,
            Utc::now(),
        )
        .unwrap();
        (template, instance, approval)
    }

    #[test]
    fn test_memory_notifier_outbox() {
        let notifier = MemoryNotifier::new();
        let (template, instance, approval) = fixture();
        notifier
            .notify(&approval_required(
                UserId::new("omar"),
                &approval,
                &instance,
                &template,
            ))
            .unwrap();
        notifier
            .notify(&approval_reminder(
                UserId::new("omar"),
                &approval,
                &instance,
                &template,
            ))
            .unwrap();

        assert_eq!(notifier.count(), 2);
        assert_eq!(notifier.sent_to(&UserId::new("omar")).len(), 2);
        assert!(notifier.sent_to(&UserId::new("ines")).is_empty());

        notifier.clear();
        assert_eq!(notifier.count(), 0);
    }

    #[test]
    fn test_approval_required_message() {
        let (template, instance, approval) = fixture();
        let n = approval_required(UserId::new("omar"), &approval, &instance, &template);
        assert_eq!(n.subject, "Approval Required: Data centre failover");
        assert!(n.body.contains("Check recovery objectives."));
        assert_eq!(n.priority, Priority::Normal);
        assert_eq!(n.reference, NotificationRef::Approval(approval.id.to_string()));
    }

    #[test]
    fn test_reminder_and_escalation_priority() {
        let (template, instance, approval) = fixture();
        let reminder = approval_reminder(UserId::new("omar"), &approval, &instance, &template);
        assert_eq!(reminder.priority, Priority::High);

        let escalation = Escalation::open(
            approval.id.clone(),
            instance.id.clone(),
            instance.target.title.clone(),
            None,
            Some(UserId::new("boss")),
            "SLA breached",
            Utc::now(),
        );
        let notice = escalation_notice(UserId::new("boss"), &escalation);
        assert_eq!(notice.priority, Priority::Urgent);
        assert!(notice.body.contains("Originally assigned to: Unknown"));
    }

    #[test]
    fn test_outcome_message_includes_notes() {
        let (template, mut instance, _) = fixture();
        instance.reject(Utc::now(), "RTO too long").unwrap();
        let n = workflow_outcome(
            UserId::new("ines"),
            &instance,
            &template,
            WorkflowOutcome::Rejected,
        );
        assert_eq!(n.subject, "Workflow Rejected: Data centre failover");
        assert!(n.body.contains("RTO too long"));
        assert!(n.body.contains("Status: rejected"));
    }

    #[test]
    fn test_task_assigned_message() {
        let task = Task::new("Upload DR test report", Utc::now())
            .with_priority(TaskPriority::Critical)
            .with_description("Attach the signed report.");
        let n = task_assigned(UserId::new("omar"), &task);
        assert_eq!(n.subject, "New Task Assigned: Upload DR test report");
        assert_eq!(n.priority, Priority::Urgent);
        assert!(n.body.contains("Due Date: None"));
        assert!(n.body.contains("Attach the signed report."));
        assert_eq!(n.reference, NotificationRef::Task(task.id.to_string()));
    }
}
