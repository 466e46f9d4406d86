//! This module defines the `Tape`, a sparse and bidirectionally unbounded store of symbols.
//!
//! Only written cells are materialized. Every other position reads as the blank symbol, so
//! the head can wander arbitrarily far in either direction without any allocation tied to
//! the distance travelled.

use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use crate::types::TuringMachineError;

/// A single tape addressed by signed integer positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: BTreeMap<i64, char>,
    blank: char,
}

impl Tape {
    /// Creates an empty tape where every position reads as `blank`.
    pub fn new(blank: char) -> Self {
        Self {
            cells: BTreeMap::new(),
            blank,
        }
    }

    /// Returns the blank symbol of this tape.
    pub fn blank(&self) -> char {
        self.blank
    }

    /// Returns the symbol at `position`, or the blank symbol if the cell was never written.
    ///
    /// Reading never materializes a cell.
    pub fn read(&self, position: i64) -> char {
        self.cells.get(&position).copied().unwrap_or(self.blank)
    }

    /// Stores `symbol` at `position`, overwriting any previous value.
    pub fn write(&mut self, position: i64, symbol: char) {
        self.cells.insert(position, symbol);
    }

    /// Writes `input` at consecutive positions starting from 0.
    ///
    /// Every character is checked against `alphabet` before anything is written, so a
    /// rejected input leaves the tape untouched.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if every character belongs to `alphabet`.
    /// * `Err(TuringMachineError::InvalidSymbol)` naming the first offending character.
    pub fn load(
        &mut self,
        input: &str,
        alphabet: &BTreeSet<char>,
    ) -> Result<(), TuringMachineError> {
        if let Some((position, symbol)) = input
            .chars()
            .enumerate()
            .find(|(_, c)| !alphabet.contains(c))
        {
            return Err(TuringMachineError::InvalidSymbol { symbol, position });
        }

        for (position, symbol) in (0_i64..).zip(input.chars()) {
            self.write(position, symbol);
        }

        Ok(())
    }

    /// Returns the symbols over an inclusive range of positions, substituting the blank
    /// symbol for unwritten cells.
    pub fn extract(&self, range: RangeInclusive<i64>) -> Vec<char> {
        range.map(|position| self.read(position)).collect()
    }

    /// Returns the smallest and largest positions ever written, or `None` for a fresh tape.
    pub fn occupied_bounds(&self) -> Option<(i64, i64)> {
        let (&min, _) = self.cells.first_key_value()?;
        let (&max, _) = self.cells.last_key_value()?;
        Some((min, max))
    }

    /// Returns `true` if no cell has been written.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the written region with leading and trailing blank runs removed.
    ///
    /// Blanks between two non-blank symbols are kept. Only cells equal to this tape's blank
    /// symbol are stripped.
    pub fn trimmed(&self) -> String {
        let Some((min, max)) = self.occupied_bounds() else {
            return String::new();
        };

        let symbols = self.extract(min..=max);
        let start = symbols.iter().position(|&c| c != self.blank);
        let end = symbols.iter().rposition(|&c| c != self.blank);

        match (start, end) {
            (Some(start), Some(end)) => symbols[start..=end].iter().collect(),
            _ => String::new(),
        }
    }
}
