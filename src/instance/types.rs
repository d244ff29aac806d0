//! Workflow instance types and the transition function.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::definition::{Action, State, WorkflowDefinition};
use crate::error::{Error, Result};

/// Identifier of a workflow instance.
///
/// Callers may supply any string; generated ids are UUID v4.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Create a fresh, collision-resistant identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First 8 characters, for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for InstanceId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<&str> for InstanceId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for InstanceId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::borrow::Borrow<str> for InstanceId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A record of one applied action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action_id: String,
    pub timestamp: DateTime<Utc>,
    pub from_state_id: String,
    pub to_state_id: String,
}

/// A running execution of a workflow definition.
///
/// The definition is referenced by id, not owned. State only changes
/// through [`WorkflowInstance::transition`], which appends to the history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowInstance {
    id: InstanceId,
    definition_id: String,
    current_state_id: String,
    history: Vec<HistoryEntry>,
    created_at: DateTime<Utc>,
}

impl WorkflowInstance {
    /// Create an instance positioned at `initial`.
    pub fn new(id: InstanceId, definition_id: impl Into<String>, initial: &State) -> Self {
        Self {
            id,
            definition_id: definition_id.into(),
            current_state_id: initial.id.clone(),
            history: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    pub fn definition_id(&self) -> &str {
        &self.definition_id
    }

    pub fn current_state_id(&self) -> &str {
        &self.current_state_id
    }

    /// History of applied actions, oldest first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn current_state<'d>(&self, definition: &'d WorkflowDefinition) -> Option<&'d State> {
        definition.state(&self.current_state_id)
    }

    pub fn is_final(&self, definition: &WorkflowDefinition) -> bool {
        self.current_state(definition)
            .map(|s| s.is_final)
            .unwrap_or(false)
    }

    /// Decide whether `action_id` may fire from the current state.
    ///
    /// Checks run in order and the first failure is returned:
    /// action exists, action enabled, current state not final, current
    /// state among the action's sources, target state exists.
    pub fn check_action<'d>(
        &self,
        definition: &'d WorkflowDefinition,
        action_id: &str,
    ) -> Result<&'d Action> {
        let action = definition
            .action(action_id)
            .ok_or_else(|| Error::ActionNotFound {
                definition_id: definition.id.clone(),
                action_id: action_id.to_string(),
            })?;

        if !action.enabled {
            return Err(Error::ActionDisabled(action.id.clone()));
        }

        if self.is_final(definition) {
            return Err(Error::InstanceAlreadyFinal {
                instance_id: self.id.to_string(),
                state_id: self.current_state_id.clone(),
            });
        }

        if !action.can_execute_from(&self.current_state_id) {
            return Err(Error::InvalidSourceState {
                action_id: action.id.clone(),
                state_id: self.current_state_id.clone(),
            });
        }

        if definition.state(&action.to_state).is_none() {
            return Err(Error::UnknownStateReference {
                action_id: action.id.clone(),
                state_id: action.to_state.clone(),
            });
        }

        Ok(action)
    }

    /// Apply `action_id`, stamping the history entry with `at`.
    ///
    /// Nothing changes unless every check in [`Self::check_action`] passes.
    pub fn transition(
        &mut self,
        definition: &WorkflowDefinition,
        action_id: &str,
        at: DateTime<Utc>,
    ) -> Result<&HistoryEntry> {
        let action = self.check_action(definition, action_id)?;
        let entry = HistoryEntry {
            action_id: action.id.clone(),
            timestamp: at,
            from_state_id: self.current_state_id.clone(),
            to_state_id: action.to_state.clone(),
        };

        self.current_state_id = action.to_state.clone();
        self.history.push(entry);
        Ok(&self.history[self.history.len() - 1])
    }

    /// Actions that could fire right now. Empty in a final state.
    pub fn available_actions<'d>(&self, definition: &'d WorkflowDefinition) -> Vec<&'d Action> {
        if self.is_final(definition) {
            return Vec::new();
        }
        definition
            .actions()
            .filter(|a| a.enabled && a.can_execute_from(&self.current_state_id))
            .collect()
    }
}

/// An instance together with its resolved current state and the actions
/// available from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceSummary {
    pub instance: WorkflowInstance,
    pub current_state: Option<State>,
    pub available_actions: Vec<Action>,
    pub is_final: bool,
}

impl InstanceSummary {
    pub fn new(instance: WorkflowInstance, definition: &WorkflowDefinition) -> Self {
        let current_state = instance.current_state(definition).cloned();
        let available_actions = instance
            .available_actions(definition)
            .into_iter()
            .cloned()
            .collect();
        let is_final = instance.is_final(definition);
        Self {
            instance,
            current_state,
            available_actions,
            is_final,
        }
    }
}
