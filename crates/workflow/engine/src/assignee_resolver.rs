//! Assignee resolution: turns a step's rule into a concrete user
//!
//! Resolution is a pure read of the org directory and the target's live
//! facts. An unresolvable rule yields `None`, which is not an error: the
//! approval is created unassigned and nobody is notified.

use crate::directory::OrgDirectory;
use grc_workflow_types::{AssigneeRule, TargetFacts, UserId, WorkflowInstance, WorkflowStep};
use std::sync::Arc;

/// Maps assignee rules to users
#[derive(Clone)]
pub struct AssigneeResolver {
    directory: Arc<dyn OrgDirectory>,
}

impl AssigneeResolver {
    pub fn new(directory: Arc<dyn OrgDirectory>) -> Self {
        Self { directory }
    }

    /// The directory the resolver reads from
    pub fn directory(&self) -> &dyn OrgDirectory {
        self.directory.as_ref()
    }

    /// Resolve who must act on `step` of `instance`
    pub fn resolve(
        &self,
        step: &WorkflowStep,
        instance: &WorkflowInstance,
        facts: &TargetFacts,
    ) -> Option<UserId> {
        let assignee = match &step.assignee {
            AssigneeRule::User { user } => Some(user.clone()),
            AssigneeRule::Role { role } => self.directory.users_with_role(role).into_iter().min(),
            AssigneeRule::Manager => self.resolve_manager(instance, facts),
            AssigneeRule::Owner => facts.owner.clone(),
        };

        if assignee.is_none() {
            tracing::debug!(
                instance_id = %instance.id,
                step = step.order,
                rule = ?step.assignee,
                "No assignee resolved for step"
            );
        }
        assignee
    }

    /// Manager of whoever is currently holding an approval
    pub fn escalation_target(&self, holder: Option<&UserId>) -> Option<UserId> {
        holder.and_then(|user| self.directory.manager_for_user(user))
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Initiator's department manager; otherwise the target department's
    /// manager when the target has a department (even if that department
    /// has no manager); otherwise the owner's department manager.
    fn resolve_manager(&self, instance: &WorkflowInstance, facts: &TargetFacts) -> Option<UserId> {
        let from_initiator = instance
            .initiator
            .as_ref()
            .and_then(|initiator| self.directory.manager_for_user(initiator));
        if from_initiator.is_some() {
            return from_initiator;
        }

        match &facts.department {
            Some(dept) => self.directory.manager_of(dept),
            None => facts
                .owner
                .as_ref()
                .and_then(|owner| self.directory.manager_for_user(owner)),
        }
    }
}

impl std::fmt::Debug for AssigneeResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssigneeResolver").finish_non_exhaustive()
    }
}
