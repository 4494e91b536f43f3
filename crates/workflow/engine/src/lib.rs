//! Approval Workflow Engine for the GRC platform
//!
//! The engine attaches multi-step approval workflows to business objects
//! (policies, risks, audits, continuity plans). It resolves who must act
//! at each step, advances or halts on each decision, escalates approvals
//! that breach their SLA, and tells the owning domain module when a
//! workflow ends.
//!
//! # Key Principle
//!
//! **History is mandatory, notification is advisory.**
//!
//! Every workflow operation writes exactly one history entry before any
//! state changes. If that write fails the operation fails and nothing
//! moves. Notifications are attempted after the commit and their
//! failures are only logged. An optional commit hook sees the store
//! after each change, which is where embedders persist it.
//!
//! # Architecture
//!
//! The [`WorkflowEngine`] composes specialized components:
//!
//! - [`TemplateRegistry`]: validated, read-only workflow templates
//! - [`AssigneeResolver`]: maps step rules to users through an [`OrgDirectory`]
//! - [`WorkflowStore`]: instances, approvals, escalations and tasks with indexes
//! - [`EscalationMonitor`]: detects SLA breaches, due-soon approvals and overdue tasks
//! - [`HistoryRecorder`] / [`Notifier`] / [`WorkflowListener`]: side-effect seams
//! - [`SweepScheduler`]: drives the periodic passes on a tokio runtime
//!
//! # Example
//!
//! ```rust
//! use grc_workflow_engine::*;
//! use grc_workflow_types::*;
//! use std::sync::Arc;
//!
//! struct Policy;
//!
//! impl Approvable for Policy {
//!     fn target(&self) -> TargetRef {
//!         TargetRef::new(ObjectKind::Policy, 1, "Acceptable Use Policy")
//!     }
//! }
//!
//! let mut templates = TemplateRegistry::new();
//! templates
//!     .register(
//!         WorkflowTemplate::new("policy-approval", "Policy approval")
//!             .with_step(WorkflowStep::new(1, "Compliance", AssigneeRule::user("cora"))),
//!     )
//!     .unwrap();
//!
//! let mut engine = WorkflowEngine::new(
//!     templates,
//!     Arc::new(InMemoryDirectory::new()),
//!     Arc::new(MemoryCatalog::new()),
//! );
//!
//! let instance = engine
//!     .start_workflow(&TemplateCode::new("policy-approval"), &Policy, None)
//!     .unwrap();
//! let approval = engine.current_approval(&instance.id).unwrap().id.clone();
//!
//! let outcome = engine
//!     .decide(&approval, Decision::Approved, &UserId::new("cora"), "Looks good")
//!     .unwrap();
//! assert_eq!(outcome.outcome, Some(WorkflowOutcome::Completed));
//! ```

#![deny(unsafe_code)]

pub mod assignee_resolver;
pub mod catalog;
pub mod directory;
pub mod engine;
pub mod escalation_monitor;
pub mod history_recorder;
pub mod listener;
pub mod notifier;
pub mod scheduler;
pub mod store;
pub mod template_registry;

// Re-export main types
pub use assignee_resolver::AssigneeResolver;
pub use catalog::MemoryCatalog;
pub use directory::{InMemoryDirectory, OrgDirectory};
pub use engine::{CommitHook, DecisionOutcome, EscalationReport, WorkflowEngine};
pub use escalation_monitor::{EscalationDecision, EscalationMonitor, MonitorScan};
pub use history_recorder::{HistoryRecorder, JsonlHistory, MemoryHistory};
pub use listener::{FnListener, WorkflowListener};
pub use notifier::{MemoryNotifier, Notifier, TracingNotifier};
pub use scheduler::{SchedulerConfig, SweepScheduler};
pub use store::{StoreSnapshot, WorkflowStore};
pub use template_registry::TemplateRegistry;
