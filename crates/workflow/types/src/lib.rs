//! Workflow Domain Types for GRC approvals
//!
//! Business objects in a governance-risk-compliance system (policies,
//! risks, audits, continuity plans) are published only after passing
//! through a **multi-step approval workflow**. This crate holds the data
//! model shared by the engine and by the domain modules that feed it.
//!
//! # Key Concepts
//!
//! - **WorkflowTemplate**: A reusable shape (ordered steps, SLA and
//!   escalation policy) identified by a unique code.
//! - **WorkflowStep**: One approval gate in a template, with an
//!   [`AssigneeRule`] deciding who must act.
//! - **WorkflowInstance**: A running workflow attached to one target
//!   object. At most one non-terminal instance exists per target.
//! - **Approval**: The per-step decision record. Created lazily, one at
//!   a time, as the instance advances.
//! - **Escalation**: Raised when a pending approval breaches its SLA.
//! - **HistoryEntry**: One immutable line of the audit trail.
//! - **Task**: An assigned work item with priority and due date,
//!   optionally tied to a workflow.
//! - **Approvable**: The capability a domain object implements to take
//!   part in workflows.
//!
//! # Design Principles
//!
//! 1. A rejection at any step ends the whole workflow.
//! 2. History is append-only. Entries are never edited or removed.
//! 3. Terminal instances are never mutated again.
//! 4. Notification is advisory, history is mandatory.

#![deny(unsafe_code)]

mod approval;
mod errors;
mod escalation;
mod history;
mod identity;
mod instance;
mod notification;
mod target;
mod task;
mod template;

pub use approval::*;
pub use errors::*;
pub use escalation::*;
pub use history::*;
pub use identity::*;
pub use instance::*;
pub use notification::*;
pub use target::*;
pub use task::*;
pub use template::*;
