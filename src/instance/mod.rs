//! Workflow instances: running executions of a definition.

mod engine;
mod types;

pub use engine::InstanceEngine;
pub use types::{HistoryEntry, InstanceId, InstanceSummary, WorkflowInstance};
