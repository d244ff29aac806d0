//! WorkflowService - the operations a transport layer binds to.
//!
//! Each operation takes an explicit input struct. Field-level checks
//! happen here, so the registry and engine only ever see well-formed
//! data and concern themselves with the graph.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::definition::{Action, DefinitionInput, DefinitionRegistry, WorkflowDefinition};
use crate::instance::{InstanceEngine, InstanceId, InstanceSummary, WorkflowInstance};
use crate::{flog_debug, flog_warn, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartInstanceInput {
    pub definition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteActionInput {
    pub instance_id: String,
    pub action_id: String,
}

#[derive(Debug)]
pub struct WorkflowService {
    registry: Arc<DefinitionRegistry>,
    engine: InstanceEngine,
}

impl Default for WorkflowService {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowService {
    pub fn new() -> Self {
        let registry = Arc::new(DefinitionRegistry::new());
        let engine = InstanceEngine::new(Arc::clone(&registry));
        Self { registry, engine }
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    pub fn engine(&self) -> &InstanceEngine {
        &self.engine
    }

    pub fn register_definition(&self, input: DefinitionInput) -> Result<Arc<WorkflowDefinition>> {
        input.check_fields()?;
        self.registry.register(input)
    }

    pub fn get_definition(&self, id: &str) -> Result<Arc<WorkflowDefinition>> {
        self.registry.get(id)
    }

    pub fn list_definitions(&self) -> Vec<Arc<WorkflowDefinition>> {
        self.registry.list().collect()
    }

    pub fn start_instance(&self, input: StartInstanceInput) -> Result<WorkflowInstance> {
        if input.definition_id.trim().is_empty() {
            return Err(Error::invalid_field(
                "definition_id",
                "must be a non-empty string",
            ));
        }
        self.engine
            .start(&input.definition_id, input.instance_id.map(InstanceId::from))
    }

    pub fn get_instance(&self, id: &str) -> Result<InstanceSummary> {
        self.engine.get(id)
    }

    pub fn list_instances(&self) -> Result<Vec<InstanceSummary>> {
        self.engine.list()
    }

    pub fn get_available_actions(&self, instance_id: &str) -> Result<Vec<Action>> {
        self.engine.available_actions(instance_id)
    }

    pub fn execute_action(&self, input: ExecuteActionInput) -> Result<InstanceSummary> {
        if input.action_id.trim().is_empty() {
            return Err(Error::invalid_field("action_id", "must be a non-empty string"));
        }
        self.engine
            .execute_summary(&input.instance_id, &input.action_id)
    }

    /// Register every `*.json` / `*.toml` definition in `dir`, in file name
    /// order. Files that fail to load or register are skipped with a warning
    /// and reported back alongside the accepted definitions.
    pub fn load_dir(&self, dir: &Path) -> Result<LoadReport> {
        let mut paths: Vec<_> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| definition_format(p).is_some())
            .collect();
        paths.sort();

        let mut report = LoadReport::default();
        for path in paths {
            match load_definition_file(&path).and_then(|input| self.register_definition(input)) {
                Ok(def) => {
                    flog_debug!("Loaded definition {} from {}", def.id, path.display());
                    report.loaded.push(def.id.clone());
                }
                Err(e) => {
                    flog_warn!("Skipping {}: {}", path.display(), e);
                    report.failed.push((path.display().to_string(), e));
                }
            }
        }
        Ok(report)
    }
}

/// Outcome of [`WorkflowService::load_dir`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<String>,
    pub failed: Vec<(String, Error)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn definition_format(path: &Path) -> Option<Format> {
    match path.extension()?.to_str()? {
        "json" => Some(Format::Json),
        "toml" => Some(Format::Toml),
        _ => None,
    }
}

/// Read a definition from a `.json` or `.toml` file.
pub fn load_definition_file(path: &Path) -> Result<DefinitionInput> {
    let format = definition_format(path).ok_or_else(|| {
        Error::invalid_field(
            path.display().to_string(),
            "definition files must end in .json or .toml",
        )
    })?;
    let contents = fs::read_to_string(path)?;
    match format {
        Format::Json => DefinitionInput::from_json(&contents),
        Format::Toml => DefinitionInput::from_toml(&contents),
    }
}
