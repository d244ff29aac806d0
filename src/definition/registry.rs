//! DefinitionRegistry - validated, insertion-ordered store of definitions.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::{flog, flog_debug};

use super::{validate, DefinitionInput, WorkflowDefinition};

/// Owns every accepted [`WorkflowDefinition`].
///
/// Definitions are handed out as `Arc`s; once accepted they are never
/// mutated, so readers never need to hold the registry lock.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    definitions: RwLock<IndexMap<String, Arc<WorkflowDefinition>>>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a definition.
    ///
    /// The id check, graph validation and insert all happen under the
    /// write lock, so concurrent registrations of one id cannot both win.
    /// On failure nothing is stored.
    pub fn register(&self, input: DefinitionInput) -> Result<Arc<WorkflowDefinition>> {
        let mut definitions = self.definitions.write();

        if input.id.is_empty() || definitions.contains_key(&input.id) {
            flog_debug!("Rejected definition id={:?}: duplicate or empty", input.id);
            return Err(Error::DuplicateDefinition(input.id));
        }

        if let Err(e) = validate(&input) {
            flog_debug!("Rejected definition id={}: {}", input.id, e);
            return Err(e);
        }

        let definition = Arc::new(WorkflowDefinition::from_validated(input));
        definitions.insert(definition.id.clone(), Arc::clone(&definition));
        flog!(
            "Registered definition id={} states={} actions={}",
            definition.id,
            definition.states().count(),
            definition.actions().count()
        );
        Ok(definition)
    }

    pub fn get(&self, id: &str) -> Result<Arc<WorkflowDefinition>> {
        self.definitions
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::DefinitionNotFound(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.definitions.read().contains_key(id)
    }

    /// All definitions in registration order.
    ///
    /// The iterator walks a snapshot taken at call time and can be cloned
    /// to restart it.
    pub fn list(&self) -> impl Iterator<Item = Arc<WorkflowDefinition>> + Clone {
        let snapshot: Vec<_> = self.definitions.read().values().cloned().collect();
        snapshot.into_iter()
    }

    pub fn len(&self) -> usize {
        self.definitions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.read().is_empty()
    }
}
