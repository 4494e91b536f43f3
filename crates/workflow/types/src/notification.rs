//! Notifications emitted by the workflow engine

use crate::UserId;
use serde::{Deserialize, Serialize};

/// A message for one recipient
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub recipient: UserId,
    pub subject: String,
    pub body: String,
    /// The record the notification is about
    pub reference: NotificationRef,
    #[serde(default)]
    pub priority: Priority,
}

impl Notification {
    pub fn new(
        recipient: UserId,
        subject: impl Into<String>,
        body: impl Into<String>,
        reference: NotificationRef,
    ) -> Self {
        Self {
            recipient,
            subject: subject.into(),
            body: body.into(),
            reference,
            priority: Priority::Normal,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Typed pointer to the record a notification concerns
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum NotificationRef {
    Approval(String),
    Instance(String),
    Escalation(String),
    Task(String),
}

/// Delivery priority
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}
