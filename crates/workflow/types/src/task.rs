//! Tasks: assigned work items, optionally tied to a workflow
//!
//! A task is lighter than an approval. It has an assignee, a priority
//! and an optional due date, and moves `pending → in_progress →
//! completed`. A task past its due date is flagged `overdue` by the
//! periodic sweep; an overdue task can still be started or completed.

use crate::{TargetRef, UserId, WorkflowError, WorkflowInstanceId, WorkflowResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Task Identifier ──────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl TaskId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Task ─────────────────────────────────────────────────────────────

/// A unit of assigned work
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub task_type: TaskType,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub status: TaskStatus,
    pub assigned_to: Option<UserId>,
    pub assigned_by: Option<UserId>,
    /// Object the task is about, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<TargetRef>,
    /// Workflow the task belongs to, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<WorkflowInstanceId>,
    pub due_date: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completion_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Create a pending, unassigned general task
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: TaskId::generate(),
            title: title.into(),
            description: String::new(),
            task_type: TaskType::default(),
            priority: TaskPriority::default(),
            status: TaskStatus::Pending,
            assigned_to: None,
            assigned_by: None,
            target: None,
            instance_id: None,
            due_date: None,
            started_at: None,
            completed_at: None,
            completion_notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_type(mut self, task_type: TaskType) -> Self {
        self.task_type = task_type;
        self
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn assigned_to(mut self, user: UserId) -> Self {
        self.assigned_to = Some(user);
        self
    }

    pub fn assigned_by(mut self, user: UserId) -> Self {
        self.assigned_by = Some(user);
        self
    }

    pub fn for_target(mut self, target: TargetRef) -> Self {
        self.target = Some(target);
        self
    }

    pub fn in_workflow(mut self, instance_id: WorkflowInstanceId) -> Self {
        self.instance_id = Some(instance_id);
        self
    }

    pub fn due(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Begin work
    pub fn start(&mut self, now: DateTime<Utc>) -> WorkflowResult<()> {
        self.ensure_open()?;
        self.status = TaskStatus::InProgress;
        self.started_at = Some(now);
        self.updated_at = now;
        Ok(())
    }

    pub fn complete(&mut self, notes: impl Into<String>, now: DateTime<Utc>) -> WorkflowResult<()> {
        self.ensure_open()?;
        self.status = TaskStatus::Completed;
        self.completed_at = Some(now);
        self.completion_notes = notes.into();
        self.updated_at = now;
        Ok(())
    }

    pub fn cancel(&mut self, now: DateTime<Utc>) -> WorkflowResult<()> {
        self.ensure_open()?;
        self.status = TaskStatus::Cancelled;
        self.updated_at = now;
        Ok(())
    }

    /// Flag as overdue; returns whether the status changed
    pub fn mark_overdue(&mut self, now: DateTime<Utc>) -> bool {
        if !self.is_overdue(now) {
            return false;
        }
        self.status = TaskStatus::Overdue;
        self.updated_at = now;
        true
    }

    /// Past due while still pending or in progress
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        matches!(self.status, TaskStatus::Pending | TaskStatus::InProgress)
            && self.due_date.is_some_and(|due| now > due)
    }

    /// Not completed or cancelled
    pub fn is_open(&self) -> bool {
        !matches!(self.status, TaskStatus::Completed | TaskStatus::Cancelled)
    }

    pub fn ensure_open(&self) -> WorkflowResult<()> {
        if !self.is_open() {
            return Err(WorkflowError::InvalidState(format!(
                "task {} is already {}",
                self.id, self.status
            )));
        }
        Ok(())
    }
}

// ── Enums ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
    Overdue,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Overdue => "overdue",
        };
        f.write_str(s)
    }
}

/// Task urgency; ordered from `Low` to `Critical`
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskType {
    #[default]
    General,
    Review,
    Assessment,
    Evidence,
    Audit,
    Remediation,
}
