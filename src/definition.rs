//! This module defines the immutable machine `Definition` and the `DefinitionBuilder` used to
//! construct one. A `Definition` can only be obtained through [`DefinitionBuilder::build`],
//! which rejects every configuration that violates the formal invariants of the machine.

use std::collections::{BTreeSet, HashMap};

use crate::analyzer::validate;
use crate::types::{Action, ConfigurationError, Direction, DEFAULT_BLANK_SYMBOL};

/// The formal description of a single-tape deterministic Turing machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Definition {
    name: String,
    states: BTreeSet<String>,
    input_alphabet: BTreeSet<char>,
    tape_alphabet: BTreeSet<char>,
    blank: char,
    initial_state: String,
    accept_states: BTreeSet<String>,
    transitions: HashMap<String, HashMap<char, Action>>,
}

impl Definition {
    /// Starts a new builder with the default blank symbol and no states or rules.
    pub fn builder() -> DefinitionBuilder {
        DefinitionBuilder::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    pub fn input_alphabet(&self) -> &BTreeSet<char> {
        &self.input_alphabet
    }

    pub fn tape_alphabet(&self) -> &BTreeSet<char> {
        &self.tape_alphabet
    }

    pub fn blank(&self) -> char {
        self.blank
    }

    pub fn initial_state(&self) -> &str {
        &self.initial_state
    }

    pub fn accept_states(&self) -> &BTreeSet<String> {
        &self.accept_states
    }

    /// Returns `true` if `state` is one of the accept states.
    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    /// Looks up the action for `state` reading `symbol`.
    ///
    /// # Returns
    ///
    /// * `Some(&Action)` if a rule is defined for the pair.
    /// * `None` if the transition function is undefined there, which halts the machine.
    pub fn transition(&self, state: &str, symbol: char) -> Option<&Action> {
        self.transitions.get(state)?.get(&symbol)
    }

    /// Iterates over every rule as `(state, read, action)`, in no particular order.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, char, &Action)> {
        self.transitions.iter().flat_map(|(state, actions)| {
            actions
                .iter()
                .map(move |(&read, action)| (state.as_str(), read, action))
        })
    }

    /// Returns the total number of rules.
    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(HashMap::len).sum()
    }
}

/// A single rule as supplied to the builder, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawTransition {
    pub state: String,
    pub read: char,
    pub action: Action,
}

/// Collects the parts of a [`Definition`] and validates them on [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct DefinitionBuilder {
    pub(crate) name: Option<String>,
    pub(crate) states: BTreeSet<String>,
    pub(crate) input_alphabet: BTreeSet<char>,
    pub(crate) tape_alphabet: BTreeSet<char>,
    pub(crate) blank: char,
    pub(crate) initial_state: String,
    pub(crate) accept_states: BTreeSet<String>,
    pub(crate) transitions: Vec<RawTransition>,
}

impl Default for DefinitionBuilder {
    fn default() -> Self {
        Self {
            name: None,
            states: BTreeSet::new(),
            input_alphabet: BTreeSet::new(),
            tape_alphabet: BTreeSet::new(),
            blank: DEFAULT_BLANK_SYMBOL,
            initial_state: String::new(),
            accept_states: BTreeSet::new(),
            transitions: Vec::new(),
        }
    }
}

impl DefinitionBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    pub fn input_alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.input_alphabet.extend(symbols);
        self
    }

    pub fn tape_alphabet(mut self, symbols: impl IntoIterator<Item = char>) -> Self {
        self.tape_alphabet.extend(symbols);
        self
    }

    pub fn blank(mut self, blank: char) -> Self {
        self.blank = blank;
        self
    }

    pub fn initial_state(mut self, state: impl Into<String>) -> Self {
        self.initial_state = state.into();
        self
    }

    pub fn accept_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept_states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Adds the rule `(state, read) -> (write, direction, next_state)`.
    pub fn transition(
        mut self,
        state: impl Into<String>,
        read: char,
        write: char,
        direction: Direction,
        next_state: impl Into<String>,
    ) -> Self {
        self.transitions.push(RawTransition {
            state: state.into(),
            read,
            action: Action {
                write,
                direction,
                next_state: next_state.into(),
            },
        });
        self
    }

    /// Validates the collected parts and produces an immutable [`Definition`].
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if every construction invariant holds.
    /// * `Err(ConfigurationError)` describing the first violation found.
    pub fn build(self) -> Result<Definition, ConfigurationError> {
        validate(&self)?;

        let mut transitions: HashMap<String, HashMap<char, Action>> = HashMap::new();
        for raw in self.transitions {
            transitions
                .entry(raw.state)
                .or_default()
                .insert(raw.read, raw.action);
        }

        Ok(Definition {
            name: self.name.unwrap_or_else(|| "untitled".to_string()),
            states: self.states,
            input_alphabet: self.input_alphabet,
            tape_alphabet: self.tape_alphabet,
            blank: self.blank,
            initial_state: self.initial_state,
            accept_states: self.accept_states,
            transitions,
        })
    }
}
