//! This crate provides the core logic for a single-tape deterministic Turing machine simulator.
//! It includes modules for defining and validating machines, parsing definition files,
//! simulating runs over a sparse tape, observing their progress, and a handful of built-in
//! machines.

pub mod analyzer;
pub mod config;
pub mod definition;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod trace;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `lint` function and `Lint` enum from the analyzer module.
pub use analyzer::{lint, Lint};
/// Re-exports the engine configuration.
pub use config::EngineConfig;
/// Re-exports the immutable definition and its builder.
pub use definition::{Definition, DefinitionBuilder};
/// Re-exports the `DefinitionLoader` struct from the loader module.
pub use loader::DefinitionLoader;
/// Re-exports the `TuringMachine` engine from the machine module.
pub use machine::TuringMachine;
/// Re-exports the parsing entry points from the parser module.
pub use parser::{parse, parse_rule, parse_states, parse_symbols, TransitionRule};
/// Re-exports `MachineCatalog`, `MachineInfo`, and `MACHINES` from the programs module.
pub use programs::{MachineCatalog, MachineInfo, MACHINES};
/// Re-exports the sparse `Tape`.
pub use tape::Tape;
/// Re-exports the observer interface and the bundled observers.
pub use trace::{NoopObserver, Observer, Recorder, Snapshot, TraceWriter};
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Action, ConfigurationError, Direction, HaltReason, Outcome, RunResult, TuringMachineError,
    DEFAULT_STEP_LIMIT, MAX_DEFINITION_SIZE,
};
