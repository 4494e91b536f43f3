//! Template registry: stores and retrieves workflow templates
//!
//! Templates are configuration data. They are validated when they enter
//! the registry, so a malformed template can never back an instance.
//! Once registered a template is read-only.

use grc_workflow_types::{TemplateCode, WorkflowError, WorkflowResult, WorkflowTemplate};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Registry of workflow templates, keyed by code
#[derive(Clone, Debug, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<TemplateCode, WorkflowTemplate>,
}

/// On-disk shape of a template file
#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<WorkflowTemplate>,
}

impl TemplateRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template
    ///
    /// Validates the template and rejects duplicate codes.
    pub fn register(&mut self, mut template: WorkflowTemplate) -> WorkflowResult<()> {
        template.validate()?;
        if self.templates.contains_key(&template.code) {
            return Err(WorkflowError::Configuration(format!(
                "duplicate template code '{}'",
                template.code
            )));
        }
        template.normalize();

        tracing::info!(
            template = %template.code,
            steps = template.step_count(),
            active = template.active,
            "Workflow template registered"
        );
        self.templates.insert(template.code.clone(), template);
        Ok(())
    }

    /// Build a registry from a TOML document with `[[templates]]` tables.
    ///
    /// The load is all-or-nothing: one invalid template fails it.
    pub fn from_toml_str(doc: &str) -> WorkflowResult<Self> {
        let file: TemplateFile = toml::from_str(doc)
            .map_err(|e| WorkflowError::Configuration(format!("invalid template file: {}", e)))?;

        let mut registry = Self::new();
        for template in file.templates {
            registry.register(template)?;
        }
        Ok(registry)
    }

    /// Load templates from a TOML file
    pub fn load_file(path: impl AsRef<Path>) -> WorkflowResult<Self> {
        let path = path.as_ref();
        let doc = std::fs::read_to_string(path).map_err(|e| {
            WorkflowError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&doc)
    }

    /// Get a template by code, whether active or not
    pub fn get(&self, code: &TemplateCode) -> WorkflowResult<&WorkflowTemplate> {
        self.templates
            .get(code)
            .ok_or_else(|| WorkflowError::TemplateNotFound(code.clone()))
    }

    /// Get a template that may be used to start new workflows
    pub fn get_active(&self, code: &TemplateCode) -> WorkflowResult<&WorkflowTemplate> {
        match self.templates.get(code) {
            Some(template) if template.active => Ok(template),
            _ => Err(WorkflowError::TemplateNotFound(code.clone())),
        }
    }

    /// List all registered templates
    pub fn list(&self) -> Vec<&WorkflowTemplate> {
        self.templates.values().collect()
    }

    /// Total number of registered templates
    pub fn count(&self) -> usize {
        self.templates.len()
    }

    /// Check if a template exists
    pub fn contains(&self, code: &TemplateCode) -> bool {
        self.templates.contains_key(code)
    }
}
