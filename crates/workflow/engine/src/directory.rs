//! Organization directory: who works where, who manages what
//!
//! The engine never owns org structure. It reads it through
//! [`OrgDirectory`] whenever an assignee or escalation target has to be
//! resolved, so changes made by the org module are seen immediately.

use grc_workflow_types::{DepartmentId, RoleId, UserId, WorkflowError, WorkflowResult};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Read access to users, departments and role membership
pub trait OrgDirectory: Send + Sync {
    /// The department a user belongs to
    fn department_of(&self, user: &UserId) -> Option<DepartmentId>;

    /// The manager of a department
    fn manager_of(&self, department: &DepartmentId) -> Option<UserId>;

    /// All users holding a role, in ascending id order
    fn users_with_role(&self, role: &RoleId) -> Vec<UserId>;

    /// Manager of the user's department
    fn manager_for_user(&self, user: &UserId) -> Option<UserId> {
        self.department_of(user)
            .and_then(|dept| self.manager_of(&dept))
    }
}

// ── In-memory directory ──────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
struct UserRecord {
    department: Option<DepartmentId>,
    roles: BTreeSet<RoleId>,
}

/// A directory held entirely in memory
#[derive(Clone, Debug, Default)]
pub struct InMemoryDirectory {
    users: BTreeMap<UserId, UserRecord>,
    managers: BTreeMap<DepartmentId, UserId>,
}

#[derive(Debug, Deserialize)]
struct DirectoryFile {
    #[serde(default)]
    departments: Vec<DepartmentEntry>,
    #[serde(default)]
    users: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
struct DepartmentEntry {
    id: DepartmentId,
    manager: Option<UserId>,
}

#[derive(Debug, Deserialize)]
struct UserEntry {
    id: UserId,
    department: Option<DepartmentId>,
    #[serde(default)]
    roles: Vec<RoleId>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user with an optional department and a set of roles
    pub fn with_user<I, R>(mut self, user: impl Into<String>, department: Option<&str>, roles: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        self.add_user(
            UserId::new(user),
            department.map(DepartmentId::new),
            roles.into_iter().map(RoleId::new).collect(),
        );
        self
    }

    /// Add a department and its manager
    pub fn with_department(mut self, department: impl Into<String>, manager: impl Into<String>) -> Self {
        self.managers
            .insert(DepartmentId::new(department), UserId::new(manager));
        self
    }

    pub fn add_user(&mut self, user: UserId, department: Option<DepartmentId>, roles: Vec<RoleId>) {
        let record = self.users.entry(user).or_default();
        record.department = department;
        record.roles.extend(roles);
    }

    /// Replace the department of an existing user
    pub fn move_user(&mut self, user: &UserId, department: Option<DepartmentId>) {
        if let Some(record) = self.users.get_mut(user) {
            record.department = department;
        }
    }

    pub fn set_manager(&mut self, department: DepartmentId, manager: UserId) {
        self.managers.insert(department, manager);
    }

    pub fn user_count(&self) -> usize {
        self.users.len()
    }

    pub fn department_count(&self) -> usize {
        self.managers.len()
    }

    /// Parse a TOML document with `[[departments]]` and `[[users]]` tables
    pub fn from_toml_str(doc: &str) -> WorkflowResult<Self> {
        let file: DirectoryFile = toml::from_str(doc)
            .map_err(|e| WorkflowError::Configuration(format!("invalid directory file: {}", e)))?;

        let mut directory = Self::new();
        for dept in file.departments {
            if let Some(manager) = dept.manager {
                directory.set_manager(dept.id, manager);
            }
        }
        for user in file.users {
            directory.add_user(user.id, user.department, user.roles);
        }

        tracing::debug!(
            users = directory.user_count(),
            departments = directory.department_count(),
            "Org directory loaded"
        );
        Ok(directory)
    }

    pub fn load_file(path: impl AsRef<Path>) -> WorkflowResult<Self> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path).map_err(|e| {
            WorkflowError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&doc)
    }
}

impl OrgDirectory for InMemoryDirectory {
    fn department_of(&self, user: &UserId) -> Option<DepartmentId> {
        self.users.get(user).and_then(|r| r.department.clone())
    }

    fn manager_of(&self, department: &DepartmentId) -> Option<UserId> {
        self.managers.get(department).cloned()
    }

    fn users_with_role(&self, role: &RoleId) -> Vec<UserId> {
        // BTreeMap iteration is already in ascending id order
        self.users
            .iter()
            .filter(|(_, record)| record.roles.contains(role))
            .map(|(user, _)| user.clone())
            .collect()
    }
}
