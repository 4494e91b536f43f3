//! Workflow engine: the approval state machine
//!
//! The engine owns every instance, approval and escalation. Domain
//! modules start workflows against their objects and record decisions;
//! the engine resolves assignees, advances steps and tells listeners
//! when a workflow ends.
//!
//! Every mutating operation follows the same order:
//! 1. Validate and compute the new state on copies
//! 2. Record one history entry (abort on failure, nothing changed)
//! 3. Commit the new state to the store, then run the commit hook
//! 4. Notify, best-effort
//! 5. Call listeners
//!
//! Tasks follow the same order without the history entry; they are
//! not part of any workflow's audit trail.

use crate::{
    notifier, AssigneeResolver, EscalationDecision, EscalationMonitor, HistoryRecorder,
    MemoryHistory, Notifier, OrgDirectory, StoreSnapshot, TemplateRegistry, TracingNotifier,
    WorkflowListener, WorkflowStore,
};
use chrono::{DateTime, Utc};
use grc_workflow_types::*;
use std::sync::Arc;

/// What a decision did to its workflow
#[derive(Clone, Debug)]
pub struct DecisionOutcome {
    /// The decided approval
    pub approval: Approval,
    /// Approval opened for the next step, if the workflow advanced
    pub next_approval: Option<Approval>,
    /// Set when the decision ended the workflow
    pub outcome: Option<WorkflowOutcome>,
}

impl DecisionOutcome {
    /// Whether the decision ended the workflow
    pub fn terminated(&self) -> bool {
        self.outcome.is_some()
    }
}

/// Result of one escalation sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EscalationReport {
    /// Pending approvals past their due date
    pub overdue: usize,
    /// New escalations raised by this sweep
    pub escalated: usize,
    /// Escalations that could not be recorded
    pub failed: usize,
}

/// Called with the store after every committed change
pub type CommitHook = Box<dyn Fn(&WorkflowStore) + Send + Sync>;

/// The approval workflow engine
pub struct WorkflowEngine {
    templates: TemplateRegistry,
    store: WorkflowStore,
    resolver: AssigneeResolver,
    catalog: Arc<dyn ObjectCatalog>,
    history: Arc<dyn HistoryRecorder>,
    notifier: Arc<dyn Notifier>,
    listeners: Vec<Arc<dyn WorkflowListener>>,
    monitor: EscalationMonitor,
    on_commit: Option<CommitHook>,
}

impl WorkflowEngine {
    /// Create an engine with in-memory history and log-only notifications
    pub fn new(
        templates: TemplateRegistry,
        directory: Arc<dyn OrgDirectory>,
        catalog: Arc<dyn ObjectCatalog>,
    ) -> Self {
        Self {
            templates,
            store: WorkflowStore::new(),
            resolver: AssigneeResolver::new(directory),
            catalog,
            history: Arc::new(MemoryHistory::new()),
            notifier: Arc::new(TracingNotifier::new()),
            listeners: Vec::new(),
            monitor: EscalationMonitor::new(),
            on_commit: None,
        }
    }

    pub fn with_history(mut self, history: Arc<dyn HistoryRecorder>) -> Self {
        self.history = history;
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_listener(mut self, listener: Arc<dyn WorkflowListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    /// Run `hook` after each store commit, before notifications go out
    pub fn with_commit_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&WorkflowStore) + Send + Sync + 'static,
    {
        self.on_commit = Some(Box::new(hook));
        self
    }

    /// Resume from previously saved state
    pub fn with_store(mut self, store: WorkflowStore) -> Self {
        self.store = store;
        self
    }

    // ── Templates ────────────────────────────────────────────────────

    pub fn templates(&self) -> &TemplateRegistry {
        &self.templates
    }

    pub fn register_template(&mut self, template: WorkflowTemplate) -> WorkflowResult<()> {
        self.templates.register(template)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Start a workflow for a domain object.
    ///
    /// Creates the instance at step 1 together with its first approval.
    /// Fails if the template is unknown or inactive, does not apply to
    /// the object's kind, or the object already has a live workflow.
    pub fn start_workflow(
        &mut self,
        template_code: &TemplateCode,
        object: &dyn Approvable,
        initiator: Option<UserId>,
    ) -> WorkflowResult<WorkflowInstance> {
        let template = self.templates.get_active(template_code)?.clone();
        let target = object.target();

        if !template.applies_to(target.kind) {
            return Err(WorkflowError::NotApplicable {
                template: template.code.clone(),
                kind: target.kind,
            });
        }
        if let Some(existing) = self.store.active_for(&target) {
            return Err(WorkflowError::DuplicateInstance {
                target,
                existing: existing.id.clone(),
            });
        }

        let first = template.step(1).ok_or_else(|| {
            WorkflowError::Configuration(format!("template '{}' has no first step", template.code))
        })?;

        let now = Utc::now();
        let instance = WorkflowInstance::new(
            template.code.clone(),
            target,
            initiator.clone(),
            template.default_sla_days,
            now,
        )?;
        let assignee = self.resolver.resolve(first, &instance, &object.facts());
        let approval = Approval::new(
            instance.id.clone(),
            first,
            assignee,
            template.sla_days_for(first),
            now,
        )?;

        self.history.record(
            HistoryEntry::new(
                instance.id.clone(),
                HistoryAction::WorkflowStarted,
                instance.current_step,
                format!("Workflow '{}' started", template.name),
            )
            .with_actor(initiator)
            .at(now),
        )?;

        self.store.put_instance(instance.clone());
        self.store.put_approval(approval.clone());
        self.committed();

        tracing::info!(
            instance_id = %instance.id,
            template = %template.code,
            target = %instance.target,
            assignee = ?approval.assignee,
            "Workflow started"
        );

        self.notify_assignee(&approval, &instance, &template);
        for listener in &self.listeners {
            listener.on_workflow_started(&instance);
        }

        Ok(instance)
    }

    /// Approve or reject a pending approval.
    ///
    /// Approval advances to the next step or completes the workflow.
    /// Rejection at any step ends the workflow.
    pub fn decide(
        &mut self,
        approval_id: &ApprovalId,
        decision: Decision,
        actor: &UserId,
        comments: &str,
    ) -> WorkflowResult<DecisionOutcome> {
        let mut approval = self.load_approval(approval_id)?;
        let mut instance = self.load_instance(&approval.instance_id)?;
        instance.ensure_active()?;
        let template = self.templates.get(&instance.template)?.clone();

        let now = Utc::now();
        approval.decide(decision, actor.clone(), comments, now)?;

        let mut next_approval = None;
        let (action, mut detail, outcome) = match decision {
            Decision::Approved => match template.next_step(approval.step) {
                Some(step) => {
                    instance.advance_to(step.order)?;
                    let facts = self.catalog.find(&instance.target).unwrap_or_default();
                    let assignee = self.resolver.resolve(step, &instance, &facts);
                    next_approval = Some(Approval::new(
                        instance.id.clone(),
                        step,
                        assignee,
                        template.sla_days_for(step),
                        now,
                    )?);
                    (
                        HistoryAction::StepApproved,
                        format!("Step '{}' approved", approval.step_name),
                        None,
                    )
                }
                None => {
                    instance.complete(now)?;
                    (
                        HistoryAction::WorkflowCompleted,
                        format!("Step '{}' approved, workflow completed", approval.step_name),
                        Some(WorkflowOutcome::Completed),
                    )
                }
            },
            Decision::Rejected => {
                instance.reject(now, comments)?;
                (
                    HistoryAction::WorkflowRejected,
                    format!("Step '{}' rejected", approval.step_name),
                    Some(WorkflowOutcome::Rejected),
                )
            }
        };
        if !comments.is_empty() {
            detail.push_str(&format!(": {}", comments));
        }

        let resolved = self.close_open_escalations(&approval.id, EscalationStatus::Resolved, now);

        self.history.record(
            HistoryEntry::new(instance.id.clone(), action, approval.step, detail)
                .with_actor(Some(actor.clone()))
                .at(now),
        )?;

        self.store.put_approval(approval.clone());
        if let Some(next) = &next_approval {
            self.store.put_approval(next.clone());
        }
        for escalation in resolved {
            self.store.put_escalation(escalation);
        }
        self.store.put_instance(instance.clone());
        self.committed();

        tracing::info!(
            instance_id = %instance.id,
            approval_id = %approval.id,
            step = approval.step,
            decision = %decision,
            actor = %actor,
            status = %instance.status,
            "Approval decided"
        );

        if let Some(next) = &next_approval {
            self.notify_assignee(next, &instance, &template);
        }
        if let (Some(outcome), Some(initiator)) = (outcome, instance.initiator.clone()) {
            self.send(notifier::workflow_outcome(
                initiator, &instance, &template, outcome,
            ));
        }

        for listener in &self.listeners {
            listener.on_step_decided(&instance, &approval);
            if let Some(outcome) = outcome {
                listener.on_workflow_terminated(&instance.target, outcome);
            }
        }

        Ok(DecisionOutcome {
            approval,
            next_approval,
            outcome,
        })
    }

    /// Hand a pending approval to another user.
    ///
    /// The approval stays pending; only its holder changes.
    pub fn delegate(
        &mut self,
        approval_id: &ApprovalId,
        from: &UserId,
        to: UserId,
        reason: &str,
    ) -> WorkflowResult<Approval> {
        let mut approval = self.load_approval(approval_id)?;
        approval.ensure_pending()?;
        let instance = self.load_instance(&approval.instance_id)?;
        instance.ensure_active()?;
        let template = self.templates.get(&instance.template)?.clone();

        let allowed = template
            .step(approval.step)
            .map_or(true, |step| step.allow_delegation);
        if !allowed {
            return Err(WorkflowError::DelegationNotAllowed(format!(
                "step '{}' of template '{}' does not allow delegation",
                approval.step_name, template.code
            )));
        }

        let now = Utc::now();
        approval.delegate(to.clone(), reason, now)?;

        self.history.record(
            HistoryEntry::new(
                instance.id.clone(),
                HistoryAction::ApprovalDelegated,
                approval.step,
                format!("Delegated to {}: {}", to, reason),
            )
            .with_actor(Some(from.clone()))
            .at(now),
        )?;

        self.store.put_approval(approval.clone());
        self.committed();

        tracing::info!(
            instance_id = %instance.id,
            approval_id = %approval.id,
            from = %from,
            to = %to,
            "Approval delegated"
        );

        self.notify_assignee(&approval, &instance, &template);
        for listener in &self.listeners {
            listener.on_approval_delegated(&approval, &to);
        }

        Ok(approval)
    }

    /// Cancel a live workflow. The pending approval is voided.
    pub fn cancel(
        &mut self,
        instance_id: &WorkflowInstanceId,
        actor: Option<UserId>,
        reason: &str,
    ) -> WorkflowResult<WorkflowInstance> {
        let mut instance = self.load_instance(instance_id)?;
        let now = Utc::now();
        instance.cancel(now, reason)?;

        let mut voided = self.store.pending_approval_for(instance_id).cloned();
        let cancelled = match voided.as_mut() {
            Some(approval) => {
                approval.void(now)?;
                self.close_open_escalations(&approval.id, EscalationStatus::Cancelled, now)
            }
            None => Vec::new(),
        };

        self.history.record(
            HistoryEntry::new(
                instance.id.clone(),
                HistoryAction::WorkflowCancelled,
                instance.current_step,
                format!("Workflow cancelled: {}", reason),
            )
            .with_actor(actor.clone())
            .at(now),
        )?;

        if let Some(approval) = voided {
            self.store.put_approval(approval);
        }
        for escalation in cancelled {
            self.store.put_escalation(escalation);
        }
        self.store.put_instance(instance.clone());
        self.committed();

        tracing::info!(
            instance_id = %instance.id,
            actor = ?actor,
            reason = %reason,
            "Workflow cancelled"
        );

        for listener in &self.listeners {
            listener.on_workflow_cancelled(&instance);
        }

        Ok(instance)
    }

    // ── Escalation ───────────────────────────────────────────────────

    /// Escalate every overdue approval that has not been escalated yet
    pub fn tick(&mut self) -> EscalationReport {
        self.tick_at(Utc::now())
    }

    /// [`tick`](Self::tick) against an explicit clock
    pub fn tick_at(&mut self, now: DateTime<Utc>) -> EscalationReport {
        let scan = self
            .monitor
            .check_escalations(&self.store, &self.templates, now);

        let mut report = EscalationReport {
            overdue: scan.overdue,
            ..Default::default()
        };

        for decision in scan.decisions {
            let approval_id = decision.approval_id.clone();
            match self.apply_escalation(decision, now) {
                Ok(()) => report.escalated += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(
                        approval_id = %approval_id,
                        error = %e,
                        "Failed to escalate overdue approval"
                    );
                }
            }
        }

        tracing::info!(
            overdue = report.overdue,
            escalated = report.escalated,
            failed = report.failed,
            "Escalation sweep finished"
        );
        report
    }

    /// Notify the targets of escalations that are still pending.
    ///
    /// Returns how many escalations moved to `escalated`.
    pub fn process_escalations(&mut self) -> usize {
        self.process_escalations_at(Utc::now())
    }

    pub fn process_escalations_at(&mut self, now: DateTime<Utc>) -> usize {
        let pending: Vec<Escalation> = self
            .store
            .pending_escalations()
            .into_iter()
            .cloned()
            .collect();

        let mut processed = 0;
        for mut escalation in pending {
            if self.deliver_escalation_notice(&escalation) {
                escalation.set_status(EscalationStatus::Escalated, now);
                self.store.put_escalation(escalation);
                processed += 1;
            }
        }
        if processed > 0 {
            self.committed();
        }

        tracing::info!(processed, "Pending escalations processed");
        processed
    }

    /// Remind assignees of approvals falling due within a day
    pub fn send_reminders(&mut self) -> usize {
        self.send_reminders_at(Utc::now())
    }

    pub fn send_reminders_at(&mut self, now: DateTime<Utc>) -> usize {
        let due = self.monitor.due_for_reminder(&self.store, now);

        let mut sent = 0;
        for approval_id in due {
            match self.remind(&approval_id, now) {
                Ok(()) => sent += 1,
                Err(e) => tracing::error!(
                    approval_id = %approval_id,
                    error = %e,
                    "Failed to send reminder"
                ),
            }
        }

        tracing::info!(sent, "Reminder sweep finished");
        sent
    }

    // ── Tasks ────────────────────────────────────────────────────────

    /// Store a new task and notify its assignee.
    ///
    /// A task tied to a workflow must name an instance the engine knows.
    pub fn assign_task(&mut self, task: Task) -> WorkflowResult<Task> {
        if task.title.trim().is_empty() {
            return Err(WorkflowError::InvalidState(
                "task title must not be empty".to_string(),
            ));
        }
        if let Some(instance_id) = &task.instance_id {
            self.get_instance(instance_id)?;
        }
        if self.store.task(&task.id).is_some() {
            return Err(WorkflowError::InvalidState(format!(
                "task {} already exists",
                task.id
            )));
        }

        self.store.put_task(task.clone());
        self.committed();

        tracing::info!(
            task_id = %task.id,
            title = %task.title,
            assigned_to = ?task.assigned_to,
            priority = ?task.priority,
            "Task assigned"
        );

        if let Some(assignee) = &task.assigned_to {
            self.send(notifier::task_assigned(assignee.clone(), &task));
        }
        for listener in &self.listeners {
            listener.on_task_assigned(&task);
        }

        Ok(task)
    }

    /// Move a task to `in_progress`
    pub fn start_task(&mut self, task_id: &TaskId) -> WorkflowResult<Task> {
        let mut task = self.load_task(task_id)?;
        task.start(Utc::now())?;

        self.store.put_task(task.clone());
        self.committed();

        tracing::info!(task_id = %task.id, "Task started");
        Ok(task)
    }

    pub fn complete_task(
        &mut self,
        task_id: &TaskId,
        actor: &UserId,
        notes: &str,
    ) -> WorkflowResult<Task> {
        let mut task = self.load_task(task_id)?;
        task.complete(notes, Utc::now())?;

        self.store.put_task(task.clone());
        self.committed();

        tracing::info!(task_id = %task.id, actor = %actor, "Task completed");

        for listener in &self.listeners {
            listener.on_task_completed(&task, actor);
        }
        Ok(task)
    }

    pub fn cancel_task(&mut self, task_id: &TaskId) -> WorkflowResult<Task> {
        let mut task = self.load_task(task_id)?;
        task.cancel(Utc::now())?;

        self.store.put_task(task.clone());
        self.committed();

        tracing::info!(task_id = %task.id, "Task cancelled");
        Ok(task)
    }

    /// Flag open tasks past their due date as overdue
    pub fn mark_overdue_tasks(&mut self) -> usize {
        self.mark_overdue_tasks_at(Utc::now())
    }

    pub fn mark_overdue_tasks_at(&mut self, now: DateTime<Utc>) -> usize {
        let overdue: Vec<Task> = self
            .monitor
            .overdue_tasks(&self.store, now)
            .into_iter()
            .cloned()
            .collect();

        let mut marked = 0;
        for mut task in overdue {
            if task.mark_overdue(now) {
                tracing::warn!(
                    task_id = %task.id,
                    assigned_to = ?task.assigned_to,
                    "Task overdue"
                );
                self.store.put_task(task);
                marked += 1;
            }
        }
        if marked > 0 {
            self.committed();
        }

        tracing::info!(marked, "Task overdue sweep finished");
        marked
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The live workflow attached to an object, if any
    pub fn get_workflow_for_object(&self, target: &TargetRef) -> Option<&WorkflowInstance> {
        self.store.active_for(target)
    }

    pub fn get_instance(&self, id: &WorkflowInstanceId) -> WorkflowResult<&WorkflowInstance> {
        self.store
            .instance(id)
            .ok_or_else(|| WorkflowError::InstanceNotFound(id.clone()))
    }

    pub fn get_approval(&self, id: &ApprovalId) -> WorkflowResult<&Approval> {
        self.store
            .approval(id)
            .ok_or_else(|| WorkflowError::ApprovalNotFound(id.clone()))
    }

    /// All approvals of an instance, by step
    pub fn approvals_for(&self, instance_id: &WorkflowInstanceId) -> Vec<&Approval> {
        self.store.approvals_for(instance_id)
    }

    /// The approval currently awaiting a decision
    pub fn current_approval(&self, instance_id: &WorkflowInstanceId) -> Option<&Approval> {
        self.store.pending_approval_for(instance_id)
    }

    /// A user's pending approvals, soonest due first
    pub fn pending_approvals_for_user(&self, user: &UserId) -> Vec<&Approval> {
        self.store.pending_approvals_for_user(user)
    }

    pub fn escalations_for(&self, approval_id: &ApprovalId) -> Vec<&Escalation> {
        self.store.escalations_for(approval_id)
    }

    pub fn get_task(&self, id: &TaskId) -> WorkflowResult<&Task> {
        self.store
            .task(id)
            .ok_or_else(|| WorkflowError::TaskNotFound(id.clone()))
    }

    /// A user's tasks that are not completed, most urgent first
    pub fn tasks_for_user(&self, user: &UserId) -> Vec<&Task> {
        self.store.tasks_for_user(user)
    }

    pub fn tasks_for_instance(&self, instance_id: &WorkflowInstanceId) -> Vec<&Task> {
        self.store.tasks_for_instance(instance_id)
    }

    /// The audit trail of an instance
    pub fn history_for(&self, instance_id: &WorkflowInstanceId) -> WorkflowResult<Vec<HistoryEntry>> {
        Ok(self.history.entries_for(instance_id)?)
    }

    /// Total number of instances (live + terminal)
    pub fn instance_count(&self) -> usize {
        self.store.instance_count()
    }

    pub fn active_instances(&self) -> Vec<&WorkflowInstance> {
        self.store.active_instances()
    }

    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        self.store.snapshot()
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn load_instance(&self, id: &WorkflowInstanceId) -> WorkflowResult<WorkflowInstance> {
        self.get_instance(id).cloned()
    }

    fn load_approval(&self, id: &ApprovalId) -> WorkflowResult<Approval> {
        self.get_approval(id).cloned()
    }

    fn load_task(&self, id: &TaskId) -> WorkflowResult<Task> {
        self.get_task(id).cloned()
    }

    fn committed(&self) {
        if let Some(hook) = &self.on_commit {
            hook(&self.store);
        }
    }

    /// Copies of the approval's open escalations, moved to `status`
    fn close_open_escalations(
        &self,
        approval_id: &ApprovalId,
        status: EscalationStatus,
        now: DateTime<Utc>,
    ) -> Vec<Escalation> {
        self.store
            .escalations_for(approval_id)
            .into_iter()
            .filter(|e| e.is_open())
            .cloned()
            .map(|mut e| {
                e.set_status(status, now);
                e
            })
            .collect()
    }

    fn apply_escalation(
        &mut self,
        decision: EscalationDecision,
        now: DateTime<Utc>,
    ) -> WorkflowResult<()> {
        let instance = self.load_instance(&decision.instance_id)?;
        let approval = self.load_approval(&decision.approval_id)?;
        approval.ensure_pending()?;

        let escalated_to = self
            .resolver
            .escalation_target(decision.escalated_from.as_ref());
        let mut escalation = Escalation::open(
            approval.id.clone(),
            instance.id.clone(),
            instance.target.title.clone(),
            decision.escalated_from,
            escalated_to,
            decision.reason,
            now,
        );

        let detail = match &escalation.escalated_to {
            Some(to) => format!("Escalated to {} due to SLA breach", to),
            None => "Escalated due to SLA breach, no escalation target".to_string(),
        };
        self.history.record(
            HistoryEntry::new(instance.id.clone(), HistoryAction::Escalated, approval.step, detail)
                .at(now),
        )?;

        self.store.put_escalation(escalation.clone());

        tracing::warn!(
            instance_id = %instance.id,
            approval_id = %approval.id,
            escalated_from = ?escalation.escalated_from,
            escalated_to = ?escalation.escalated_to,
            "Approval escalated"
        );

        self.committed();

        if escalation.escalated_to.is_some() && self.deliver_escalation_notice(&escalation) {
            escalation.set_status(EscalationStatus::Escalated, now);
            self.store.put_escalation(escalation.clone());
            self.committed();
        }

        for listener in &self.listeners {
            listener.on_escalated(&instance, &escalation);
        }
        Ok(())
    }

    /// Tell the escalation target. Returns whether the escalation can
    /// move on to `escalated`.
    fn deliver_escalation_notice(&self, escalation: &Escalation) -> bool {
        match &escalation.escalated_to {
            Some(to) => self.send(notifier::escalation_notice(to.clone(), escalation)),
            None => true,
        }
    }

    fn remind(&mut self, approval_id: &ApprovalId, now: DateTime<Utc>) -> WorkflowResult<()> {
        let mut approval = self.load_approval(approval_id)?;
        let instance = self.load_instance(&approval.instance_id)?;
        let template = self.templates.get(&instance.template)?.clone();
        let Some(assignee) = approval.assignee.clone() else {
            return Ok(());
        };

        self.history.record(
            HistoryEntry::new(
                instance.id.clone(),
                HistoryAction::ReminderSent,
                approval.step,
                format!("Reminder sent to {}", assignee),
            )
            .at(now),
        )?;

        approval.reminded_at = Some(now);
        self.store.put_approval(approval.clone());
        self.committed();

        self.send(notifier::approval_reminder(
            assignee, &approval, &instance, &template,
        ));
        Ok(())
    }

    fn notify_assignee(
        &self,
        approval: &Approval,
        instance: &WorkflowInstance,
        template: &WorkflowTemplate,
    ) {
        if let Some(assignee) = &approval.assignee {
            self.send(notifier::approval_required(
                assignee.clone(),
                approval,
                instance,
                template,
            ));
        }
    }

    /// Deliver a notification, logging failures
    fn send(&self, notification: Notification) -> bool {
        match self.notifier.notify(&notification) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(
                    recipient = %notification.recipient,
                    subject = %notification.subject,
                    error = %e,
                    "Notification delivery failed"
                );
                false
            }
        }
    }
}

impl std::fmt::Debug for WorkflowEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowEngine")
            .field("templates", &self.templates.count())
            .field("instances", &self.store.instance_count())
            .field("listeners", &self.listeners.len())
            .field("commit_hook", &self.on_commit.is_some())
            .finish_non_exhaustive()
    }
}
