//! Error types for the Workflow layer

use crate::{ApprovalId, ObjectKind, TargetRef, TaskId, TemplateCode, WorkflowInstanceId};

/// Errors that can occur in Workflow operations
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Workflow template not found or inactive: {0}")]
    TemplateNotFound(TemplateCode),

    #[error("Workflow instance not found: {0}")]
    InstanceNotFound(WorkflowInstanceId),

    #[error("Approval not found: {0}")]
    ApprovalNotFound(ApprovalId),

    #[error("Task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Delegation not allowed: {0}")]
    DelegationNotAllowed(String),

    #[error("Template {template} does not apply to {kind}")]
    NotApplicable {
        template: TemplateCode,
        kind: ObjectKind,
    },

    #[error("Target {target} already has an active workflow: {existing}")]
    DuplicateInstance {
        target: TargetRef,
        existing: WorkflowInstanceId,
    },

    #[error("History recording failed: {0}")]
    History(#[from] HistoryError),
}

/// Result type alias for workflow operations
pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Failure to append to the audit trail
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("History I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("History serialization error: {0}")]
    Serialization(String),

    #[error("History store unavailable: {0}")]
    Unavailable(String),
}

/// Failure to deliver a notification. Never surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("Notification channel unavailable: {0}")]
    Unavailable(String),

    #[error("Notification rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = WorkflowError::TemplateNotFound(TemplateCode::new("content-approval"));
        assert_eq!(
            err.to_string(),
            "Workflow template not found or inactive: content-approval"
        );

        let err = WorkflowError::NotApplicable {
            template: TemplateCode::new("bcm-review"),
            kind: ObjectKind::Risk,
        };
        assert_eq!(err.to_string(), "Template bcm-review does not apply to risk.risk");
    }

    #[test]
    fn test_history_error_converts() {
        let err: WorkflowError = HistoryError::Unavailable("disk full".into()).into();
        assert!(matches!(err, WorkflowError::History(_)));
    }
}
