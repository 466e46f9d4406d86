//! This module defines the observer interface through which the engine reports each
//! configuration of a run, along with the observers shipped with the crate.
//!
//! Observers only watch. Nothing they do feeds back into the simulation.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::RunResult;

/// A configuration of the machine, captured after initialization and after every step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step_count: u64,
    pub state: String,
    pub head_position: i64,
    /// Tape position of the first symbol in `tape_window`.
    pub window_start: i64,
    /// Symbols covering every written cell and the head, padded by one cell on each side.
    pub tape_window: Vec<char>,
}

impl Snapshot {
    /// Returns the symbol under the head.
    pub fn head_symbol(&self) -> Option<char> {
        let offset = usize::try_from(self.head_position - self.window_start).ok()?;
        self.tape_window.get(offset).copied()
    }
}

/// Receives the configurations of a run as the engine produces them.
pub trait Observer {
    /// Called with the initial configuration (step 0) and after every executed step.
    fn on_step(&mut self, snapshot: &Snapshot);

    /// Called once when the run has concluded.
    fn on_halt(&mut self, _result: &RunResult) {}

    /// Returns `false` if the observer ignores snapshots, letting the engine skip building
    /// them.
    fn is_enabled(&self) -> bool {
        true
    }
}

/// An observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn on_step(&mut self, _snapshot: &Snapshot) {}

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Keeps every snapshot and the final result in memory.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub snapshots: Vec<Snapshot>,
    pub result: Option<RunResult>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Observer for Recorder {
    fn on_step(&mut self, snapshot: &Snapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn on_halt(&mut self, result: &RunResult) {
        self.result = Some(result.clone());
    }
}

/// Renders a human-readable trace of a run to any writer.
///
/// ```text
/// --- Step: 1 ---
/// State: q1
/// Tape: ..._X011_...
/// Head:      ^
/// ```
///
/// Write failures never interrupt the run. The first one is kept and can be retrieved with
/// [`TraceWriter::take_error`] once the run returns.
#[derive(Debug)]
pub struct TraceWriter<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TraceWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Returns the first I/O error encountered while writing, if any.
    pub fn take_error(&mut self) -> Option<io::Error> {
        self.error.take()
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn render_step(&mut self, snapshot: &Snapshot) -> io::Result<()> {
        let tape: String = snapshot.tape_window.iter().collect();
        let offset = usize::try_from(snapshot.head_position - snapshot.window_start).unwrap_or(0);

        writeln!(self.out)?;
        writeln!(self.out, "--- Step: {} ---", snapshot.step_count)?;
        writeln!(self.out, "State: {}", snapshot.state)?;
        writeln!(self.out, "Tape: ...{tape}...")?;
        writeln!(self.out, "Head:    {}^", " ".repeat(offset))
    }

    fn render_halt(&mut self, result: &RunResult) -> io::Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", result.outcome)?;
        writeln!(self.out, "Final tape content: {}", result.final_tape)?;
        self.out.flush()
    }

    fn record(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            if self.error.is_none() {
                warn!(error = %e, "failed to write trace output");
                self.error = Some(e);
            }
        }
    }
}

impl<W: Write> Observer for TraceWriter<W> {
    fn on_step(&mut self, snapshot: &Snapshot) {
        let result = self.render_step(snapshot);
        self.record(result);
    }

    fn on_halt(&mut self, result: &RunResult) {
        let written = self.render_halt(result);
        self.record(written);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Outcome;

    fn snapshot() -> Snapshot {
        Snapshot {
            step_count: 2,
            state: "q1".to_string(),
            head_position: 1,
            window_start: -1,
            tape_window: vec!['_', 'X', '0', '1', '_'],
        }
    }

    #[test]
    fn test_head_symbol() {
        assert_eq!(snapshot().head_symbol(), Some('0'));
    }

    #[test]
    fn test_trace_writer_renders_step() {
        let mut writer = TraceWriter::new(Vec::new());
        writer.on_step(&snapshot());

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(
            output,
            "\n--- Step: 2 ---\nState: q1\nTape: ..._X01_...\nHead:      ^\n"
        );
    }

    #[test]
    fn test_trace_writer_renders_halt() {
        let mut writer = TraceWriter::new(Vec::new());
        writer.on_halt(&RunResult {
            outcome: Outcome::Accepted {
                state: "qf".to_string(),
            },
            step_count: 3,
            final_tape: "X0".to_string(),
        });

        let output = String::from_utf8(writer.into_inner()).unwrap();
        assert!(output.contains("ACCEPT: halted in accepting state 'qf'"));
        assert!(output.contains("Final tape content: X0"));
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_trace_writer_keeps_first_error() {
        let mut writer = TraceWriter::new(FailingWriter);
        writer.on_step(&snapshot());
        writer.on_step(&snapshot());

        let error = writer.take_error().unwrap();
        assert_eq!(error.kind(), io::ErrorKind::BrokenPipe);
        assert!(writer.take_error().is_none());
    }

    #[test]
    fn test_recorder_collects() {
        let mut recorder = Recorder::new();
        recorder.on_step(&snapshot());

        assert_eq!(recorder.snapshots.len(), 1);
        assert!(recorder.result.is_none());
        assert!(recorder.is_enabled());
        assert!(!NoopObserver.is_enabled());
    }
}
