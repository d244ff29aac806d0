//! Workflow definitions: the static declaration of states and actions.
//!
//! Candidates arrive as [`DefinitionInput`], are checked by [`validate`]
//! and become immutable [`WorkflowDefinition`]s owned by the
//! [`DefinitionRegistry`].

mod registry;
mod types;
mod validate;

pub use registry::DefinitionRegistry;
pub use types::{Action, DefinitionInput, State, WorkflowDefinition};
pub use validate::validate;
