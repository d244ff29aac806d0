use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Definition-time
    #[error("Workflow definition '{0}' already exists or has an empty id")]
    DuplicateDefinition(String),

    #[error("Workflow definition '{0}' declares no states")]
    MissingStates(String),

    #[error("Duplicate state id '{state_id}' in definition '{definition_id}'")]
    DuplicateStateId {
        definition_id: String,
        state_id: String,
    },

    #[error("Workflow definition '{definition_id}' must have exactly one initial state, found {found}")]
    InitialStateCount { definition_id: String, found: usize },

    #[error("Duplicate action id '{action_id}' in definition '{definition_id}'")]
    DuplicateActionId {
        definition_id: String,
        action_id: String,
    },

    #[error("Action '{action_id}' references non-existent state '{state_id}'")]
    UnknownStateReference { action_id: String, state_id: String },

    // Lookup
    #[error("Workflow definition not found: {0}")]
    DefinitionNotFound(String),

    #[error("Workflow instance not found: {0}")]
    InstanceNotFound(String),

    #[error("Action '{action_id}' does not exist in workflow definition '{definition_id}'")]
    ActionNotFound {
        definition_id: String,
        action_id: String,
    },

    // Transition-time
    #[error("Action '{0}' is disabled")]
    ActionDisabled(String),

    #[error("Cannot execute actions from final state '{state_id}' (instance '{instance_id}')")]
    InstanceAlreadyFinal {
        instance_id: String,
        state_id: String,
    },

    #[error("Action '{action_id}' cannot be executed from state '{state_id}'")]
    InvalidSourceState { action_id: String, state_id: String },

    #[error("Workflow instance already exists: {0}")]
    DuplicateInstanceId(String),

    // Boundary
    #[error("Invalid field '{field}': {reason}")]
    InvalidField { field: String, reason: String },

    // Infrastructure (CLI and config only)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("No home directory")]
    NoHomeDir,
}

pub type Result<T> = std::result::Result<T, Error>;

/// Stable, copyable name for each failure, for transports that map
/// failures onto their own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    DuplicateDefinition,
    MissingStates,
    DuplicateStateId,
    InitialStateCount,
    DuplicateActionId,
    UnknownStateReference,
    DefinitionNotFound,
    InstanceNotFound,
    ActionNotFound,
    ActionDisabled,
    InstanceAlreadyFinal,
    InvalidSourceState,
    DuplicateInstanceId,
    InvalidField,
    Io,
    Json,
    Toml,
    NoHomeDir,
}

/// Coarse grouping of [`ErrorKind`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Definition,
    Lookup,
    Transition,
    Boundary,
    Infrastructure,
}

impl ErrorKind {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ErrorKind::DuplicateDefinition
            | ErrorKind::MissingStates
            | ErrorKind::DuplicateStateId
            | ErrorKind::InitialStateCount
            | ErrorKind::DuplicateActionId
            | ErrorKind::UnknownStateReference => ErrorCategory::Definition,
            ErrorKind::DefinitionNotFound
            | ErrorKind::InstanceNotFound
            | ErrorKind::ActionNotFound => ErrorCategory::Lookup,
            ErrorKind::ActionDisabled
            | ErrorKind::InstanceAlreadyFinal
            | ErrorKind::InvalidSourceState
            | ErrorKind::DuplicateInstanceId => ErrorCategory::Transition,
            ErrorKind::InvalidField => ErrorCategory::Boundary,
            ErrorKind::Io | ErrorKind::Json | ErrorKind::Toml | ErrorKind::NoHomeDir => {
                ErrorCategory::Infrastructure
            }
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::DuplicateDefinition => "duplicate_definition",
            ErrorKind::MissingStates => "missing_states",
            ErrorKind::DuplicateStateId => "duplicate_state_id",
            ErrorKind::InitialStateCount => "initial_state_count",
            ErrorKind::DuplicateActionId => "duplicate_action_id",
            ErrorKind::UnknownStateReference => "unknown_state_reference",
            ErrorKind::DefinitionNotFound => "definition_not_found",
            ErrorKind::InstanceNotFound => "instance_not_found",
            ErrorKind::ActionNotFound => "action_not_found",
            ErrorKind::ActionDisabled => "action_disabled",
            ErrorKind::InstanceAlreadyFinal => "instance_already_final",
            ErrorKind::InvalidSourceState => "invalid_source_state",
            ErrorKind::DuplicateInstanceId => "duplicate_instance_id",
            ErrorKind::InvalidField => "invalid_field",
            ErrorKind::Io => "io",
            ErrorKind::Json => "json",
            ErrorKind::Toml => "toml",
            ErrorKind::NoHomeDir => "no_home_dir",
        };
        write!(f, "{}", name)
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateDefinition(_) => ErrorKind::DuplicateDefinition,
            Error::MissingStates(_) => ErrorKind::MissingStates,
            Error::DuplicateStateId { .. } => ErrorKind::DuplicateStateId,
            Error::InitialStateCount { .. } => ErrorKind::InitialStateCount,
            Error::DuplicateActionId { .. } => ErrorKind::DuplicateActionId,
            Error::UnknownStateReference { .. } => ErrorKind::UnknownStateReference,
            Error::DefinitionNotFound(_) => ErrorKind::DefinitionNotFound,
            Error::InstanceNotFound(_) => ErrorKind::InstanceNotFound,
            Error::ActionNotFound { .. } => ErrorKind::ActionNotFound,
            Error::ActionDisabled(_) => ErrorKind::ActionDisabled,
            Error::InstanceAlreadyFinal { .. } => ErrorKind::InstanceAlreadyFinal,
            Error::InvalidSourceState { .. } => ErrorKind::InvalidSourceState,
            Error::DuplicateInstanceId(_) => ErrorKind::DuplicateInstanceId,
            Error::InvalidField { .. } => ErrorKind::InvalidField,
            Error::Io(_) => ErrorKind::Io,
            Error::Json(_) => ErrorKind::Json,
            Error::TomlParse(_) | Error::TomlSerialize(_) => ErrorKind::Toml,
            Error::NoHomeDir => ErrorKind::NoHomeDir,
        }
    }

    pub(crate) fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
