//! Workflow targets: the business objects approvals are attached to
//!
//! The set of participating domain kinds is closed. A target is
//! identified by `(kind, object_id)`; its title is a snapshot taken when
//! the workflow starts, since the object may be renamed or deleted later.

use crate::{DepartmentId, UserId};
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// Maximum length (in characters) of a cached target title
pub const MAX_TITLE_CHARS: usize = 500;

// ── Object Kind ──────────────────────────────────────────────────────

/// The domain kinds that can run through an approval workflow
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    Policy,
    Procedure,
    Risk,
    Control,
    ComplianceAssessment,
    Audit,
    BcmPlan,
    Framework,
}

impl ObjectKind {
    /// Qualified `module.kind` tag, used in notification references
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Policy => "governance.policy",
            Self::Procedure => "governance.procedure",
            Self::Risk => "risk.risk",
            Self::Control => "risk.control",
            Self::ComplianceAssessment => "compliance.assessment",
            Self::Audit => "compliance.audit",
            Self::BcmPlan => "bcm.plan",
            Self::Framework => "frameworks.framework",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Target Reference ─────────────────────────────────────────────────

/// Reference to a workflow target with a cached display title.
///
/// Equality and hashing only consider `(kind, object_id)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TargetRef {
    pub kind: ObjectKind,
    pub object_id: u64,
    pub title: String,
}

impl TargetRef {
    /// Create a reference; the title is truncated to [`MAX_TITLE_CHARS`]
    pub fn new(kind: ObjectKind, object_id: u64, title: impl Into<String>) -> Self {
        let title: String = title.into();
        let title = match title.char_indices().nth(MAX_TITLE_CHARS) {
            Some((idx, _)) => title[..idx].to_string(),
            None => title,
        };
        Self {
            kind,
            object_id,
            title,
        }
    }
}

impl PartialEq for TargetRef {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.object_id == other.object_id
    }
}

impl Eq for TargetRef {}

impl Hash for TargetRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.object_id.hash(state);
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.object_id)
    }
}

// ── Capabilities ─────────────────────────────────────────────────────

/// Live ownership facts about a target, used for assignee resolution
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TargetFacts {
    pub owner: Option<UserId>,
    pub department: Option<DepartmentId>,
}

/// A domain object that can be routed through an approval workflow
pub trait Approvable {
    /// Identity and current title of the object
    fn target(&self) -> TargetRef;

    /// The object's owner, if it has one
    fn owner(&self) -> Option<UserId> {
        None
    }

    /// The department responsible for the object, if any
    fn department(&self) -> Option<DepartmentId> {
        None
    }

    fn facts(&self) -> TargetFacts {
        TargetFacts {
            owner: self.owner(),
            department: self.department(),
        }
    }
}

/// Looks up live targets by reference.
///
/// The engine consults the catalog whenever a later step needs an
/// assignee, so owner or department changes made mid-workflow are seen.
/// A vanished object yields `None`.
pub trait ObjectCatalog: Send + Sync {
    fn find(&self, target: &TargetRef) -> Option<TargetFacts>;
}
