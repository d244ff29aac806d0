//! flowstate - finite-state-machine workflows with validated transitions.
//!
//! A [`definition::DefinitionRegistry`] accepts workflow definitions only
//! when their state/action graph is well-formed. An
//! [`instance::InstanceEngine`] starts instances against those definitions
//! and applies actions to them, recording history. [`WorkflowService`]
//! bundles both behind the operations a transport layer exposes.

pub mod config;
pub mod definition;
pub mod error;
pub mod instance;
pub mod log;
pub mod service;

pub use definition::{Action, DefinitionInput, DefinitionRegistry, State, WorkflowDefinition};
pub use error::{Error, ErrorCategory, ErrorKind, Result};
pub use instance::{HistoryEntry, InstanceEngine, InstanceId, InstanceSummary, WorkflowInstance};
pub use service::{ExecuteActionInput, StartInstanceInput, WorkflowService};
