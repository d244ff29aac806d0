//! InstanceEngine - creates instances and drives them through transitions.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::{Mutex, RwLock};

use crate::definition::{Action, DefinitionRegistry, WorkflowDefinition};
use crate::error::{Error, Result};
use crate::{flog, flog_debug};

use super::{InstanceId, InstanceSummary, WorkflowInstance};

type InstanceHandle = Arc<Mutex<WorkflowInstance>>;

/// Stores instances and applies actions to them.
///
/// The map lock is only held long enough to find or insert a handle;
/// each instance has its own mutex, so transitions on one instance are
/// serialized without blocking work on others.
#[derive(Debug)]
pub struct InstanceEngine {
    registry: Arc<DefinitionRegistry>,
    instances: RwLock<IndexMap<InstanceId, InstanceHandle>>,
}

impl InstanceEngine {
    pub fn new(registry: Arc<DefinitionRegistry>) -> Self {
        Self {
            registry,
            instances: RwLock::new(IndexMap::new()),
        }
    }

    pub fn registry(&self) -> &Arc<DefinitionRegistry> {
        &self.registry
    }

    /// Start a new instance at the definition's initial state.
    ///
    /// A missing or empty `instance_id` is replaced by a generated one.
    pub fn start(
        &self,
        definition_id: &str,
        instance_id: Option<InstanceId>,
    ) -> Result<WorkflowInstance> {
        let definition = self.registry.get(definition_id)?;
        let initial = definition
            .initial_state()
            .ok_or_else(|| Error::InitialStateCount {
                definition_id: definition.id.clone(),
                found: 0,
            })?;

        let id = instance_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(InstanceId::generate);

        let mut instances = self.instances.write();
        if instances.contains_key(&id) {
            flog_debug!("Rejected instance id={}: already exists", id);
            return Err(Error::DuplicateInstanceId(id.to_string()));
        }

        let instance = WorkflowInstance::new(id.clone(), &definition.id, initial);
        instances.insert(id, Arc::new(Mutex::new(instance.clone())));
        flog!(
            "Started instance id={} definition={} state={}",
            instance.id().short(),
            definition.id,
            instance.current_state_id()
        );
        Ok(instance)
    }

    fn handle(&self, instance_id: &str) -> Result<InstanceHandle> {
        self.instances
            .read()
            .get(instance_id)
            .cloned()
            .ok_or_else(|| Error::InstanceNotFound(instance_id.to_string()))
    }

    fn definition_for(&self, instance: &WorkflowInstance) -> Result<Arc<WorkflowDefinition>> {
        self.registry.get(instance.definition_id())
    }

    /// Apply `action_id` to the instance and return its new snapshot.
    ///
    /// The instance stays locked from the legality checks through the
    /// update, and is left untouched on failure.
    pub fn execute(&self, instance_id: &str, action_id: &str) -> Result<WorkflowInstance> {
        self.apply(instance_id, action_id).map(|(instance, _)| instance)
    }

    /// Like [`Self::execute`], returning a summary of the new snapshot.
    pub fn execute_summary(&self, instance_id: &str, action_id: &str) -> Result<InstanceSummary> {
        let (instance, definition) = self.apply(instance_id, action_id)?;
        Ok(InstanceSummary::new(instance, &definition))
    }

    fn apply(
        &self,
        instance_id: &str,
        action_id: &str,
    ) -> Result<(WorkflowInstance, Arc<WorkflowDefinition>)> {
        let handle = self.handle(instance_id)?;
        let mut instance = handle.lock();
        let definition = self.definition_for(&instance)?;

        match instance.transition(&definition, action_id, Utc::now()) {
            Ok(entry) => flog!(
                "Instance id={} action={} {} -> {}",
                instance_id,
                action_id,
                entry.from_state_id,
                entry.to_state_id
            ),
            Err(e) => {
                flog_debug!("Instance id={} action={} rejected: {}", instance_id, action_id, e);
                return Err(e);
            }
        }
        Ok((instance.clone(), definition))
    }

    /// Dry run of [`Self::execute`]: same checks, no mutation.
    pub fn can_execute(&self, instance_id: &str, action_id: &str) -> Result<()> {
        let handle = self.handle(instance_id)?;
        let instance = handle.lock();
        let definition = self.definition_for(&instance)?;
        instance.check_action(&definition, action_id).map(|_| ())
    }

    pub fn available_actions(&self, instance_id: &str) -> Result<Vec<Action>> {
        let handle = self.handle(instance_id)?;
        let instance = handle.lock();
        let definition = self.definition_for(&instance)?;
        Ok(instance
            .available_actions(&definition)
            .into_iter()
            .cloned()
            .collect())
    }

    pub fn get(&self, instance_id: &str) -> Result<InstanceSummary> {
        let handle = self.handle(instance_id)?;
        let instance = handle.lock().clone();
        self.summarize(instance)
    }

    /// Summaries of every instance, in start order.
    pub fn list(&self) -> Result<Vec<InstanceSummary>> {
        let handles: Vec<InstanceHandle> = self.instances.read().values().cloned().collect();
        handles
            .iter()
            .map(|handle| {
                let instance = handle.lock().clone();
                self.summarize(instance)
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.instances.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.read().is_empty()
    }

    fn summarize(&self, instance: WorkflowInstance) -> Result<InstanceSummary> {
        let definition = self.definition_for(&instance)?;
        Ok(InstanceSummary::new(instance, &definition))
    }
}
