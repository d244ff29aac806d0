//! Workflow definition types.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

fn default_enabled() -> bool {
    true
}

/// A node of the workflow state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_initial: bool,
    /// Final states are terminal: no action may leave them.
    #[serde(default)]
    pub is_final: bool,
    /// Stored and reported, but not consulted by the transition engine.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl State {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            is_initial: false,
            is_final: false,
            enabled: true,
            description: None,
        }
    }

    pub fn initial(mut self) -> Self {
        self.is_initial = true;
        self
    }

    pub fn final_state(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A directed transition from any of `from_states` into `to_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub id: String,
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    pub from_states: Vec<String>,
    pub to_state: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Action {
    pub fn new<I, S>(
        id: impl Into<String>,
        name: impl Into<String>,
        from_states: I,
        to_state: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            enabled: true,
            from_states: from_states.into_iter().map(Into::into).collect(),
            to_state: to_state.into(),
            description: None,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn can_execute_from(&self, state_id: &str) -> bool {
        self.from_states.iter().any(|s| s == state_id)
    }
}

/// A candidate definition as received from a caller.
///
/// States and actions are kept as lists so duplicate ids survive
/// deserialization and can be reported by the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionInput {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub states: Vec<State>,
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl DefinitionInput {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            states: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn state(mut self, state: State) -> Self {
        self.states.push(state);
        self
    }

    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_toml(s: &str) -> Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Structural checks on individual fields, run before graph validation.
    ///
    /// The definition id itself is left to the registry, which reports a
    /// blank id as a duplicate.
    pub fn check_fields(&self) -> Result<()> {
        require_non_blank("name", &self.name)?;
        for (i, state) in self.states.iter().enumerate() {
            require_non_blank(&format!("states[{}].id", i), &state.id)?;
            require_non_blank(&format!("states[{}].name", i), &state.name)?;
        }
        for (i, action) in self.actions.iter().enumerate() {
            require_non_blank(&format!("actions[{}].id", i), &action.id)?;
            require_non_blank(&format!("actions[{}].name", i), &action.name)?;
            require_non_blank(&format!("actions[{}].to_state", i), &action.to_state)?;
            if action.from_states.is_empty() {
                return Err(Error::invalid_field(
                    format!("actions[{}].from_states", i),
                    "must list at least one source state",
                ));
            }
        }
        Ok(())
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_field(field, "must be a non-empty string"));
    }
    Ok(())
}

/// An accepted, immutable workflow definition.
///
/// Only the registry constructs these, after validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    states: IndexMap<String, State>,
    actions: IndexMap<String, Action>,
}

impl WorkflowDefinition {
    /// Build from an input that has already passed validation.
    pub(crate) fn from_validated(input: DefinitionInput) -> Self {
        Self {
            id: input.id,
            name: input.name,
            description: input.description,
            states: input
                .states
                .into_iter()
                .map(|s| (s.id.clone(), s))
                .collect(),
            actions: input
                .actions
                .into_iter()
                .map(|a| (a.id.clone(), a))
                .collect(),
        }
    }

    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.states.values()
    }

    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.actions.values()
    }

    pub fn state(&self, id: &str) -> Option<&State> {
        self.states.get(id)
    }

    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.get(id)
    }

    /// The unique initial state. Always present on accepted definitions.
    pub fn initial_state(&self) -> Option<&State> {
        self.states.values().find(|s| s.is_initial)
    }

    pub fn final_states(&self) -> impl Iterator<Item = &State> {
        self.states.values().filter(|s| s.is_final)
    }
}
