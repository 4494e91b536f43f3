//! Workflow templates: reusable approval shapes
//!
//! A WorkflowTemplate is static configuration. It names an ordered list
//! of steps, the SLA applied to each, and whether SLA breaches escalate.
//! Step orders must be unique and contiguous starting at 1; a template
//! that violates this is rejected when it is loaded, never at runtime.

use crate::{ObjectKind, RoleId, UserId, WorkflowError, WorkflowResult};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Longest SLA a template or step may declare, in days
pub const MAX_SLA_DAYS: u32 = 3650;

/// Due date `sla_days` after `now`
pub fn due_after(now: DateTime<Utc>, sla_days: u32) -> WorkflowResult<DateTime<Utc>> {
    now.checked_add_signed(Duration::days(i64::from(sla_days)))
        .ok_or_else(|| {
            WorkflowError::Configuration(format!("SLA of {} days overflows the calendar", sla_days))
        })
}

// ── Template Code ────────────────────────────────────────────────────

/// Unique, human-assigned code of a workflow template
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateCode(pub String);

impl TemplateCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TemplateCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Workflow Template ────────────────────────────────────────────────

/// A reusable approval workflow definition
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    /// Unique code used by domain modules to start workflows
    pub code: TemplateCode,
    /// Display name
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub workflow_type: WorkflowType,
    /// Ordered approval steps
    pub steps: Vec<WorkflowStep>,
    /// SLA for the whole workflow and for steps without their own
    #[serde(default = "default_sla_days")]
    pub default_sla_days: u32,
    /// Whether SLA breaches raise escalations
    #[serde(default = "default_true")]
    pub escalation_enabled: bool,
    /// Escalation delay in days (informational)
    #[serde(default = "default_escalation_days")]
    pub escalation_days: u32,
    /// Object kinds this template may be started for. Empty means any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub applicable_kinds: Vec<ObjectKind>,
    #[serde(default = "default_true")]
    pub active: bool,
}

impl WorkflowTemplate {
    /// Create an active template with default SLA and escalation settings
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: TemplateCode::new(code),
            name: name.into(),
            description: String::new(),
            workflow_type: WorkflowType::default(),
            steps: Vec::new(),
            default_sla_days: default_sla_days(),
            escalation_enabled: true,
            escalation_days: default_escalation_days(),
            applicable_kinds: Vec::new(),
            active: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_type(mut self, workflow_type: WorkflowType) -> Self {
        self.workflow_type = workflow_type;
        self
    }

    pub fn with_step(mut self, step: WorkflowStep) -> Self {
        self.steps.push(step);
        self
    }

    pub fn with_sla_days(mut self, days: u32) -> Self {
        self.default_sla_days = days;
        self
    }

    pub fn without_escalation(mut self) -> Self {
        self.escalation_enabled = false;
        self
    }

    pub fn applicable_to(mut self, kind: ObjectKind) -> Self {
        self.applicable_kinds.push(kind);
        self
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Get the step with the given 1-based order
    pub fn step(&self, order: u32) -> Option<&WorkflowStep> {
        self.steps.iter().find(|s| s.order == order)
    }

    /// Get the step following `order`, if any
    pub fn next_step(&self, order: u32) -> Option<&WorkflowStep> {
        self.step(order + 1)
    }

    /// Number of steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Effective SLA for a step: its own, else the template default
    pub fn sla_days_for(&self, step: &WorkflowStep) -> u32 {
        step.sla_days.unwrap_or(self.default_sla_days)
    }

    /// Whether a workflow may be started for this kind
    pub fn applies_to(&self, kind: ObjectKind) -> bool {
        self.applicable_kinds.is_empty() || self.applicable_kinds.contains(&kind)
    }

    /// Validate the template for structural correctness
    pub fn validate(&self) -> WorkflowResult<()> {
        if self.code.0.trim().is_empty() {
            return Err(WorkflowError::Configuration(
                "template code must not be empty".into(),
            ));
        }
        if self.steps.is_empty() {
            return Err(WorkflowError::Configuration(format!(
                "template '{}' has no steps",
                self.code
            )));
        }
        if self.default_sla_days == 0 {
            return Err(WorkflowError::Configuration(format!(
                "template '{}' has a zero default SLA",
                self.code
            )));
        }
        if self.default_sla_days > MAX_SLA_DAYS {
            return Err(WorkflowError::Configuration(format!(
                "template '{}' default SLA of {} days exceeds {}",
                self.code, self.default_sla_days, MAX_SLA_DAYS
            )));
        }

        let mut orders = BTreeSet::new();
        for step in &self.steps {
            if !orders.insert(step.order) {
                return Err(WorkflowError::Configuration(format!(
                    "template '{}' has duplicate step order {}",
                    self.code, step.order
                )));
            }
            step.validate(&self.code)?;
        }

        // Orders must be exactly 1..=n
        for (expected, actual) in (1..).zip(orders.iter()) {
            if *actual != expected {
                return Err(WorkflowError::Configuration(format!(
                    "template '{}' step orders must be contiguous from 1, found {} but expected {}",
                    self.code, actual, expected
                )));
            }
        }

        Ok(())
    }

    /// Sort steps by order. Called by the registry after validation.
    pub fn normalize(&mut self) {
        self.steps.sort_by_key(|s| s.order);
    }
}

/// Informational classification of a template
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowType {
    #[default]
    Approval,
    Review,
    Sequential,
    Parallel,
}

// ── Workflow Step ────────────────────────────────────────────────────

/// One gate of a workflow template
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// 1-based position within the template
    pub order: u32,
    pub name: String,
    #[serde(default)]
    pub kind: StepKind,
    /// Who must act on this step
    pub assignee: AssigneeRule,
    /// Overrides the template's default SLA
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sla_days: Option<u32>,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default = "default_true")]
    pub allow_delegation: bool,
    #[serde(default)]
    pub instructions: String,
}

impl WorkflowStep {
    pub fn new(order: u32, name: impl Into<String>, assignee: AssigneeRule) -> Self {
        Self {
            order,
            name: name.into(),
            kind: StepKind::default(),
            assignee,
            sla_days: None,
            required: true,
            allow_delegation: true,
            instructions: String::new(),
        }
    }

    pub fn with_kind(mut self, kind: StepKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_sla_days(mut self, days: u32) -> Self {
        self.sla_days = Some(days);
        self
    }

    pub fn without_delegation(mut self) -> Self {
        self.allow_delegation = false;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    fn validate(&self, code: &TemplateCode) -> WorkflowResult<()> {
        if self.order == 0 {
            return Err(WorkflowError::Configuration(format!(
                "template '{}' step '{}' has order 0",
                code, self.name
            )));
        }
        match self.sla_days {
            Some(0) => {
                return Err(WorkflowError::Configuration(format!(
                    "template '{}' step {} has a zero SLA",
                    code, self.order
                )));
            }
            Some(days) if days > MAX_SLA_DAYS => {
                return Err(WorkflowError::Configuration(format!(
                    "template '{}' step {} SLA of {} days exceeds {}",
                    code, self.order, days, MAX_SLA_DAYS
                )));
            }
            _ => {}
        }
        match &self.assignee {
            AssigneeRule::User { user } if user.0.is_empty() => {
                Err(WorkflowError::Configuration(format!(
                    "template '{}' step {} assigns an empty user",
                    code, self.order
                )))
            }
            AssigneeRule::Role { role } if role.0.is_empty() => {
                Err(WorkflowError::Configuration(format!(
                    "template '{}' step {} assigns an empty role",
                    code, self.order
                )))
            }
            _ => Ok(()),
        }
    }
}

/// What kind of work a step represents. Every kind is gated like an approval.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    #[default]
    Approval,
    Review,
    Notification,
    Task,
}

/// How a step's responsible party is found
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AssigneeRule {
    /// A fixed user
    User { user: UserId },
    /// The first holder of a role (lowest user id)
    Role { role: RoleId },
    /// The responsible department manager
    Manager,
    /// The target object's owner
    Owner,
}

impl AssigneeRule {
    pub fn user(user: impl Into<String>) -> Self {
        Self::User {
            user: UserId::new(user),
        }
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self::Role {
            role: RoleId::new(role),
        }
    }
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_sla_days() -> u32 {
    5
}

fn default_escalation_days() -> u32 {
    3
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_step() -> WorkflowTemplate {
        WorkflowTemplate::new("policy-approval", "Policy approval")
            .with_step(WorkflowStep::new(1, "Manager review", AssigneeRule::Manager))
            .with_step(
                WorkflowStep::new(2, "Compliance sign-off", AssigneeRule::role("compliance"))
                    .with_sla_days(2),
            )
    }

    #[test]
    fn test_valid_template() {
        let template = two_step();
        assert!(template.validate().is_ok());
        assert_eq!(template.step_count(), 2);
        assert_eq!(template.next_step(1).unwrap().name, "Compliance sign-off");
        assert!(template.next_step(2).is_none());
    }

    #[test]
    fn test_sla_override() {
        let template = two_step().with_sla_days(7);
        assert_eq!(template.sla_days_for(template.step(1).unwrap()), 7);
        assert_eq!(template.sla_days_for(template.step(2).unwrap()), 2);
    }

    #[test]
    fn test_sla_upper_bound() {
        let template = two_step().with_sla_days(MAX_SLA_DAYS);
        assert!(template.validate().is_ok());

        let huge_default = two_step().with_sla_days(200_000_000);
        assert!(matches!(
            huge_default.validate(),
            Err(WorkflowError::Configuration(_))
        ));

        let huge_step = WorkflowTemplate::new("huge-step", "Huge step").with_step(
            WorkflowStep::new(1, "Slow", AssigneeRule::Owner).with_sla_days(MAX_SLA_DAYS + 1),
        );
        let err = huge_step.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds"));
    }

    #[test]
    fn test_due_after_overflow_is_configuration_error() {
        let now = Utc::now();
        assert_eq!((due_after(now, 3).unwrap() - now).num_days(), 3);
        assert!(matches!(
            due_after(DateTime::<Utc>::MAX_UTC, 1),
            Err(WorkflowError::Configuration(_))
        ));
    }

    #[test]
    fn test_gap_in_orders_rejected() {
        let template = WorkflowTemplate::new("gappy", "Gappy")
            .with_step(WorkflowStep::new(1, "One", AssigneeRule::Owner))
            .with_step(WorkflowStep::new(3, "Three", AssigneeRule::Owner));
        let err = template.validate().unwrap_err();
        assert!(matches!(err, WorkflowError::Configuration(_)));
        assert!(err.to_string().contains("contiguous"));
    }

    #[test]
    fn test_duplicate_orders_rejected() {
        let template = WorkflowTemplate::new("dup", "Dup")
            .with_step(WorkflowStep::new(1, "A", AssigneeRule::Owner))
            .with_step(WorkflowStep::new(1, "B", AssigneeRule::Owner));
        assert!(matches!(
            template.validate(),
            Err(WorkflowError::Configuration(_))
        ));
    }

    #[test]
    fn test_orders_not_starting_at_one_rejected() {
        let template = WorkflowTemplate::new("late", "Late")
            .with_step(WorkflowStep::new(2, "B", AssigneeRule::Owner));
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_empty_template_rejected() {
        assert!(WorkflowTemplate::new("empty", "Empty").validate().is_err());
        assert!(WorkflowTemplate::new("  ", "Blank")
            .with_step(WorkflowStep::new(1, "A", AssigneeRule::Owner))
            .validate()
            .is_err());
    }

    #[test]
    fn test_zero_sla_rejected() {
        let template = WorkflowTemplate::new("fast", "Fast")
            .with_step(WorkflowStep::new(1, "A", AssigneeRule::Owner).with_sla_days(0));
        assert!(template.validate().is_err());
    }

    #[test]
    fn test_unordered_steps_normalize() {
        let mut template = WorkflowTemplate::new("shuffled", "Shuffled")
            .with_step(WorkflowStep::new(2, "Second", AssigneeRule::Owner))
            .with_step(WorkflowStep::new(1, "First", AssigneeRule::Owner));
        assert!(template.validate().is_ok());
        template.normalize();
        assert_eq!(template.steps[0].name, "First");
    }

    #[test]
    fn test_applicability() {
        let any = two_step();
        assert!(any.applies_to(ObjectKind::Audit));

        let policy_only = two_step().applicable_to(ObjectKind::Policy);
        assert!(policy_only.applies_to(ObjectKind::Policy));
        assert!(!policy_only.applies_to(ObjectKind::Risk));
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let doc = r#"
            code = "content-approval"
            name = "Content approval"

            [[steps]]
            order = 1
            name = "Manager sign-off"
            assignee = { type = "manager" }

            [[steps]]
            order = 2
            name = "Legal"
            assignee = { type = "user", user = "legal-1" }
            allow_delegation = false
        "#;
        let template: WorkflowTemplate = toml::from_str(doc).unwrap();
        assert_eq!(template.default_sla_days, 5);
        assert!(template.escalation_enabled);
        assert!(template.active);
        assert_eq!(template.steps[0].assignee, AssigneeRule::Manager);
        assert_eq!(template.steps[1].assignee, AssigneeRule::user("legal-1"));
        assert!(!template.steps[1].allow_delegation);
        assert_eq!(template.steps[0].kind, StepKind::Approval);
    }
}
