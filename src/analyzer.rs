//! This module provides the checks run over a machine definition. The fatal checks enforce the
//! construction invariants of a [`Definition`] and run inside [`DefinitionBuilder::build`]; the
//! lints report suspicious but legal definitions, such as unreachable states.

use std::collections::{BTreeSet, HashSet};

use crate::definition::{Definition, DefinitionBuilder};
use crate::types::ConfigurationError;

/// Non-fatal observations about a valid definition.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Lint {
    /// States that no sequence of transitions can reach from the initial state.
    UnreachableStates(Vec<String>),
    /// Accept states with outgoing rules. These never fire, because a run stops as soon as
    /// it enters an accept state.
    AcceptStateTransitions(Vec<String>),
}

impl std::fmt::Display for Lint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lint::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {}", states.join(", "))
            }
            Lint::AcceptStateTransitions(states) => write!(
                f,
                "Transitions out of accept states are never used: {}",
                states.join(", ")
            ),
        }
    }
}

/// Checks every construction invariant of a definition, in a fixed order.
///
/// # Returns
///
/// * `Ok(())` if no invariant is violated.
/// * `Err(ConfigurationError)` for the first violated invariant.
pub(crate) fn validate(builder: &DefinitionBuilder) -> Result<(), ConfigurationError> {
    [
        check_states,
        check_initial_state,
        check_accept_states,
        check_input_alphabet,
        check_blank,
        check_transitions,
        check_duplicate_transitions,
    ]
    .iter()
    .try_for_each(|check| check(builder))
}

/// Runs all lints over a built definition.
///
/// The result is empty for a definition with nothing to report.
pub fn lint(definition: &Definition) -> Vec<Lint> {
    [check_unreachable_states, check_accept_state_transitions]
        .iter()
        .filter_map(|f| f(definition))
        .collect()
}

fn check_states(builder: &DefinitionBuilder) -> Result<(), ConfigurationError> {
    if builder.states.is_empty() {
        return Err(ConfigurationError::EmptyStates);
    }

    Ok(())
}

fn check_initial_state(builder: &DefinitionBuilder) -> Result<(), ConfigurationError> {
    if !builder.states.contains(&builder.initial_state) {
        return Err(ConfigurationError::UnknownInitialState(
            builder.initial_state.clone(),
        ));
    }

    Ok(())
}

fn check_accept_states(builder: &DefinitionBuilder) -> Result<(), ConfigurationError> {
    let unknown: Vec<String> = builder
        .accept_states
        .difference(&builder.states)
        .cloned()
        .collect();

    if !unknown.is_empty() {
        return Err(ConfigurationError::UnknownAcceptStates(unknown));
    }

    Ok(())
}

fn check_input_alphabet(builder: &DefinitionBuilder) -> Result<(), ConfigurationError> {
    let outside: Vec<char> = builder
        .input_alphabet
        .difference(&builder.tape_alphabet)
        .copied()
        .collect();

    if !outside.is_empty() {
        return Err(ConfigurationError::InputAlphabetNotSubset(outside));
    }

    Ok(())
}

fn check_blank(builder: &DefinitionBuilder) -> Result<(), ConfigurationError> {
    if !builder.tape_alphabet.contains(&builder.blank) {
        return Err(ConfigurationError::BlankNotInTapeAlphabet(builder.blank));
    }

    Ok(())
}

/// Checks that every state and symbol mentioned by a rule is declared.
fn check_transitions(builder: &DefinitionBuilder) -> Result<(), ConfigurationError> {
    for raw in &builder.transitions {
        for state in [&raw.state, &raw.action.next_state] {
            if !builder.states.contains(state) {
                return Err(ConfigurationError::UnknownTransitionState {
                    state: raw.state.clone(),
                    symbol: raw.read,
                    unknown: state.clone(),
                });
            }
        }

        for symbol in [raw.read, raw.action.write] {
            if !builder.tape_alphabet.contains(&symbol) {
                return Err(ConfigurationError::UnknownTransitionSymbol {
                    state: raw.state.clone(),
                    symbol: raw.read,
                    unknown: symbol,
                });
            }
        }
    }

    Ok(())
}

/// Checks that the transition function stays a function: one rule per (state, symbol).
fn check_duplicate_transitions(builder: &DefinitionBuilder) -> Result<(), ConfigurationError> {
    let mut seen = HashSet::new();

    for raw in &builder.transitions {
        if !seen.insert((raw.state.as_str(), raw.read)) {
            return Err(ConfigurationError::DuplicateTransition(
                raw.state.clone(),
                raw.read,
            ));
        }
    }

    Ok(())
}

/// Finds states unreachable from the initial state with a depth-first traversal of the
/// transition graph.
fn check_unreachable_states(definition: &Definition) -> Option<Lint> {
    let mut visited = BTreeSet::new();
    let mut queue = vec![definition.initial_state()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for (from, _, action) in definition.transitions() {
            if from == state && !visited.contains(action.next_state.as_str()) {
                queue.push(action.next_state.as_str());
            }
        }
    }

    let unreachable: Vec<String> = definition
        .states()
        .iter()
        .filter(|state| !visited.contains(state.as_str()))
        .cloned()
        .collect();

    (!unreachable.is_empty()).then_some(Lint::UnreachableStates(unreachable))
}

fn check_accept_state_transitions(definition: &Definition) -> Option<Lint> {
    let states: BTreeSet<String> = definition
        .transitions()
        .filter(|(state, _, _)| definition.is_accepting(state))
        .map(|(state, _, _)| state.to_string())
        .collect();

    (!states.is_empty()).then(|| Lint::AcceptStateTransitions(states.into_iter().collect()))
}
