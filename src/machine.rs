//! This module defines the `TuringMachine` engine, which executes a single-tape deterministic
//! machine over an input string. It owns the immutable definition, resets its run state at the
//! start of every run, and drives the transition loop until the machine accepts, finds no
//! applicable rule, or reaches the configured step limit.

use tracing::{debug, trace};

use crate::config::EngineConfig;
use crate::definition::Definition;
use crate::tape::Tape;
use crate::trace::{NoopObserver, Observer, Snapshot};
use crate::types::{HaltReason, Outcome, RunResult, TuringMachineError};

/// The outcome of executing a single step.
#[derive(Debug, Clone, PartialEq)]
enum Step {
    /// A transition was applied.
    Continue,
    /// No transition applies; the run is over.
    Halt(Outcome),
}

/// Mutable per-run state, rebuilt at the start of every run.
#[derive(Debug, Clone, PartialEq, Eq)]
struct RunState {
    state: String,
    head_position: i64,
    step_count: u64,
}

impl RunState {
    fn new(initial_state: &str) -> Self {
        Self {
            state: initial_state.to_string(),
            head_position: 0,
            step_count: 0,
        }
    }
}

/// The simulation engine for a single-tape deterministic Turing machine.
///
/// Each call to [`run`](Self::run) is independent: the tape and run state are rebuilt from the
/// definition and the input, and nothing from a previous run influences the next one.
#[derive(Debug, Clone)]
pub struct TuringMachine {
    definition: Definition,
    config: EngineConfig,
    tape: Tape,
    run: RunState,
}

impl TuringMachine {
    /// Creates an engine with the default configuration.
    pub fn new(definition: Definition) -> Self {
        Self::with_config(definition, EngineConfig::default())
    }

    /// Creates an engine with an explicit configuration. A step limit of zero is raised to one.
    pub fn with_config(definition: Definition, config: EngineConfig) -> Self {
        let config = EngineConfig::with_step_limit(config.step_limit);

        Self {
            tape: Tape::new(definition.blank()),
            run: RunState::new(definition.initial_state()),
            definition,
            config,
        }
    }

    pub fn definition(&self) -> &Definition {
        &self.definition
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the tape as left by the most recent successful run.
    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    /// Runs the machine on `input` to completion without observing it.
    ///
    /// # Returns
    ///
    /// * `Ok(RunResult)` for every run that starts, whatever its outcome.
    /// * `Err(TuringMachineError::InvalidSymbol)` if `input` contains a character outside the
    ///   tape alphabet. No step is executed and the engine remains usable.
    pub fn run(&mut self, input: &str) -> Result<RunResult, TuringMachineError> {
        self.run_observed(input, &mut NoopObserver)
    }

    /// Runs the machine on `input` to completion, notifying `observer` of the initial
    /// configuration, of every step, and of the final result.
    pub fn run_observed(
        &mut self,
        input: &str,
        observer: &mut dyn Observer,
    ) -> Result<RunResult, TuringMachineError> {
        let mut tape = Tape::new(self.definition.blank());
        tape.load(input, self.definition.tape_alphabet())?;

        self.tape = tape;
        self.run = RunState::new(self.definition.initial_state());

        debug!(
            machine = self.definition.name(),
            input,
            step_limit = self.config.step_limit,
            "starting run"
        );

        self.notify(observer);

        let outcome = loop {
            if self.definition.is_accepting(&self.run.state) {
                break Outcome::Accepted {
                    state: self.run.state.clone(),
                };
            }

            if let Step::Halt(outcome) = self.step() {
                break outcome;
            }

            self.notify(observer);

            if self.run.step_count >= self.config.step_limit {
                break Outcome::Halted {
                    reason: HaltReason::StepLimitExceeded,
                    state: self.run.state.clone(),
                    symbol: self.tape.read(self.run.head_position),
                };
            }
        };

        let result = RunResult {
            outcome,
            step_count: self.run.step_count,
            final_tape: self.tape.trimmed(),
        };

        debug!(
            machine = self.definition.name(),
            steps = result.step_count,
            accepted = result.outcome.is_accepted(),
            "run finished"
        );

        observer.on_halt(&result);

        Ok(result)
    }

    /// Executes one transition: read, look up, write, move, change state.
    fn step(&mut self) -> Step {
        let head = self.run.head_position;
        let symbol = self.tape.read(head);

        let Some(action) = self.definition.transition(&self.run.state, symbol) else {
            return Step::Halt(Outcome::Halted {
                reason: HaltReason::NoTransition,
                state: self.run.state.clone(),
                symbol,
            });
        };

        self.tape.write(head, action.write);
        self.run.head_position = head + action.direction.offset();
        self.run.state.clone_from(&action.next_state);
        self.run.step_count += 1;

        trace!(
            step = self.run.step_count,
            read = %symbol,
            write = %action.write,
            direction = %action.direction,
            state = %self.run.state,
            "applied transition"
        );

        Step::Continue
    }

    fn notify(&self, observer: &mut dyn Observer) {
        if observer.is_enabled() {
            observer.on_step(&self.snapshot());
        }
    }

    /// Captures the current configuration with a tape window spanning every written cell and
    /// the head, plus one cell on each side.
    fn snapshot(&self) -> Snapshot {
        let head = self.run.head_position;
        let (min, max) = self.tape.occupied_bounds().unwrap_or((head, head));
        let start = min.min(head) - 1;
        let end = max.max(head) + 1;

        Snapshot {
            step_count: self.run.step_count,
            state: self.run.state.clone(),
            head_position: head,
            window_start: start,
            tape_window: self.tape.extract(start..=end),
        }
    }
}
