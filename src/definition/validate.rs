//! Graph validation for candidate definitions.
//!
//! Checks run in a fixed order and the first failure is returned. The
//! registry runs the id-uniqueness check itself before calling in here,
//! since that one needs the registry's contents.

use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::flog_trace;

use super::DefinitionInput;

pub fn validate(input: &DefinitionInput) -> Result<()> {
    flog_trace!(
        "validate definition={} states={} actions={}",
        input.id,
        input.states.len(),
        input.actions.len()
    );

    if input.states.is_empty() {
        return Err(Error::MissingStates(input.id.clone()));
    }

    let mut state_ids = HashSet::with_capacity(input.states.len());
    for state in &input.states {
        if !state_ids.insert(state.id.as_str()) {
            return Err(Error::DuplicateStateId {
                definition_id: input.id.clone(),
                state_id: state.id.clone(),
            });
        }
    }

    let initial = input.states.iter().filter(|s| s.is_initial).count();
    if initial != 1 {
        return Err(Error::InitialStateCount {
            definition_id: input.id.clone(),
            found: initial,
        });
    }

    let mut action_ids = HashSet::with_capacity(input.actions.len());
    for action in &input.actions {
        if !action_ids.insert(action.id.as_str()) {
            return Err(Error::DuplicateActionId {
                definition_id: input.id.clone(),
                action_id: action.id.clone(),
            });
        }
    }

    for action in &input.actions {
        let unknown = action
            .from_states
            .iter()
            .chain(std::iter::once(&action.to_state))
            .find(|id| !state_ids.contains(id.as_str()));
        if let Some(state_id) = unknown {
            return Err(Error::UnknownStateReference {
                action_id: action.id.clone(),
                state_id: state_id.clone(),
            });
        }
    }

    Ok(())
}
