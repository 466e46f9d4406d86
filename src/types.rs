//! This module defines the core data structures and types shared across the simulator,
//! including head directions, transition actions, run outcomes, and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The blank symbol assumed when a definition does not declare one.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The maximum allowed size for a machine definition in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB
/// The number of steps a run may execute before it is halted.
pub const DEFAULT_STEP_LIMIT: u64 = 1000;

/// Represents the possible directions the head can move after a transition.
///
/// There is no "stay" action in this model: every step moves the head.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// Returns the signed offset applied to the head position.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }
}

impl FromStr for Direction {
    type Err = ConfigurationError;

    /// Accepts `L`/`R` in either case, `Left`/`Right`, and `<`/`>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "L" | "LEFT" | "<" => Ok(Direction::Left),
            "R" | "RIGHT" | ">" => Ok(Direction::Right),
            _ => Err(ConfigurationError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// The right-hand side of a transition: what to write, where to move, and which state to enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The symbol written under the head.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine enters.
    pub next_state: String,
}

/// Why a run stopped without accepting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    /// No transition is defined for the current state and the symbol under the head.
    NoTransition,
    /// The run reached the configured step limit.
    StepLimitExceeded,
}

/// The terminal classification of a run.
///
/// Halting without acceptance is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The machine entered one of its accept states.
    Accepted { state: String },
    /// The machine stopped in `state` reading `symbol` without accepting.
    Halted {
        reason: HaltReason,
        state: String,
        symbol: char,
    },
}

impl Outcome {
    /// Returns `true` if the run ended in an accept state.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted { .. })
    }

    /// Returns the halt reason, or `None` for an accepted run.
    pub fn halt_reason(&self) -> Option<HaltReason> {
        match self {
            Outcome::Accepted { .. } => None,
            Outcome::Halted { reason, .. } => Some(*reason),
        }
    }

    /// Returns the state the machine was in when the run ended.
    pub fn state(&self) -> &str {
        match self {
            Outcome::Accepted { state } | Outcome::Halted { state, .. } => state,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Accepted { state } => {
                write!(f, "ACCEPT: halted in accepting state '{state}'")
            }
            Outcome::Halted {
                reason: HaltReason::NoTransition,
                state,
                symbol,
            } => write!(
                f,
                "HALT: no transition rule for state '{state}' and symbol '{symbol}'"
            ),
            Outcome::Halted {
                reason: HaltReason::StepLimitExceeded,
                state,
                ..
            } => write!(f, "HALT: exceeded maximum steps in state '{state}'"),
        }
    }
}

/// The result of a single call to [`crate::TuringMachine::run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// How the run ended.
    pub outcome: Outcome,
    /// The number of transitions executed.
    pub step_count: u64,
    /// The written region of the tape with leading and trailing blanks removed.
    pub final_tape: String,
}

impl fmt::Display for RunResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} after {} steps", self.outcome, self.step_count)?;
        write!(f, "Final tape content: {}", self.final_tape)
    }
}

/// Errors raised while building a machine definition.
///
/// These are detected eagerly, before any engine exists, and never during a run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("The set of states is empty")]
    EmptyStates,
    #[error("Initial state '{0}' is not in the set of states")]
    UnknownInitialState(String),
    #[error("Accept states {0:?} are not in the set of states")]
    UnknownAcceptStates(Vec<String>),
    #[error("Input symbols {0:?} are not in the tape alphabet")]
    InputAlphabetNotSubset(Vec<char>),
    #[error("Blank symbol '{0}' is not in the tape alphabet")]
    BlankNotInTapeAlphabet(char),
    #[error("Transition ({state}, '{symbol}') references unknown state '{unknown}'")]
    UnknownTransitionState {
        state: String,
        symbol: char,
        unknown: String,
    },
    #[error("Transition ({state}, '{symbol}') references symbol '{unknown}' outside the tape alphabet")]
    UnknownTransitionSymbol {
        state: String,
        symbol: char,
        unknown: char,
    },
    #[error("Transition ({0}, '{1}') is defined more than once")]
    DuplicateTransition(String, char),
    #[error("Invalid direction '{0}': expected L or R")]
    InvalidDirection(String),
}

/// Represents the errors surfaced by the library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The input string contains a character outside the tape alphabet.
    #[error("Symbol '{symbol}' at position {position} is not in the tape alphabet")]
    InvalidSymbol { symbol: char, position: usize },
    /// The machine definition violates one of its construction invariants.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    /// The definition text does not follow the grammar.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// A definition file or directory could not be read.
    #[error("File error: {0}")]
    FileError(String),
    /// No built-in machine matches the requested name or index.
    #[error("Unknown built-in machine: {0}")]
    UnknownMachine(String),
}
