//! In-memory object catalog

use grc_workflow_types::{Approvable, ObjectCatalog, TargetFacts, TargetRef};
use parking_lot::RwLock;
use std::collections::HashMap;

/// Catalog of live targets held in memory.
///
/// Domain modules register objects as they are created and update them
/// when ownership changes. Targets that were never registered, or were
/// removed, resolve to no facts.
pub struct MemoryCatalog {
    objects: RwLock<HashMap<TargetRef, TargetFacts>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
        }
    }

    /// Register or refresh an object
    pub fn register(&self, object: &dyn Approvable) {
        self.update(object.target(), object.facts());
    }

    pub fn update(&self, target: TargetRef, facts: TargetFacts) {
        self.objects.write().insert(target, facts);
    }

    /// Forget an object; returns whether it was known
    pub fn remove(&self, target: &TargetRef) -> bool {
        self.objects.write().remove(target).is_some()
    }

    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

impl Default for MemoryCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectCatalog for MemoryCatalog {
    fn find(&self, target: &TargetRef) -> Option<TargetFacts> {
        self.objects.read().get(target).cloned()
    }
}
