//! Built-in machine definitions, embedded at compile time and parsed on first use.

use crate::definition::Definition;
use crate::parser::parse;
use crate::types::TuringMachineError;
use tracing::warn;

// Embedded definition texts
const MACHINE_TEXTS: [&str; 3] = [
    include_str!("../machines/equal-counts.tm"),
    include_str!("../machines/binary-increment.tm"),
    include_str!("../machines/even-ones.tm"),
];

lazy_static::lazy_static! {
    /// The built-in definitions that parsed successfully, in embedding order.
    pub static ref MACHINES: Vec<(&'static str, Definition)> = MACHINE_TEXTS
        .iter()
        .filter_map(|text| match parse(text) {
            Ok(definition) => Some((*text, definition)),
            Err(e) => {
                warn!(error = %e, "failed to parse built-in machine");
                None
            }
        })
        .collect();
}

/// Summary of a built-in machine, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub state_count: usize,
    pub transition_count: usize,
}

/// Read-only access to the built-in machines.
pub struct MachineCatalog;

impl MachineCatalog {
    /// Returns the number of available machines.
    pub fn count() -> usize {
        MACHINES.len()
    }

    /// Returns a machine by its index.
    pub fn get_by_index(index: usize) -> Result<Definition, TuringMachineError> {
        MACHINES
            .get(index)
            .map(|(_, definition)| definition.clone())
            .ok_or_else(|| TuringMachineError::UnknownMachine(format!("index {index}")))
    }

    /// Returns a machine by name, ignoring case and treating `-` like a space, so
    /// `binary-increment` finds "Binary increment".
    pub fn get_by_name(name: &str) -> Result<Definition, TuringMachineError> {
        let wanted = normalize(name);

        MACHINES
            .iter()
            .find(|(_, definition)| normalize(definition.name()) == wanted)
            .map(|(_, definition)| definition.clone())
            .ok_or_else(|| TuringMachineError::UnknownMachine(format!("'{name}'")))
    }

    /// Lists all machine names.
    pub fn names() -> Vec<String> {
        MACHINES
            .iter()
            .map(|(_, definition)| definition.name().to_string())
            .collect()
    }

    /// Returns the definition text a machine was parsed from.
    pub fn text_by_index(index: usize) -> Result<&'static str, TuringMachineError> {
        MACHINES
            .get(index)
            .map(|(text, _)| *text)
            .ok_or_else(|| TuringMachineError::UnknownMachine(format!("index {index}")))
    }

    /// Returns summary information about a machine.
    pub fn info(index: usize) -> Result<MachineInfo, TuringMachineError> {
        let definition = Self::get_by_index(index)?;

        Ok(MachineInfo {
            index,
            name: definition.name().to_string(),
            initial_state: definition.initial_state().to_string(),
            state_count: definition.states().len(),
            transition_count: definition.transition_count(),
        })
    }
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace('-', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::TuringMachine;

    #[test]
    fn test_all_builtins_parse() {
        assert_eq!(MachineCatalog::count(), MACHINE_TEXTS.len());
        assert_eq!(
            MachineCatalog::names(),
            vec!["Equal counts", "Binary increment", "Even ones"]
        );
    }

    #[test]
    fn test_get_by_name() {
        let definition = MachineCatalog::get_by_name("binary-increment").unwrap();
        assert_eq!(definition.name(), "Binary increment");

        assert!(MachineCatalog::get_by_name("EQUAL COUNTS").is_ok());
        assert!(MachineCatalog::get_by_name("busy beaver").is_err());
    }

    #[test]
    fn test_get_by_index_out_of_range() {
        assert!(MachineCatalog::get_by_index(99).is_err());
        assert!(MachineCatalog::text_by_index(99).is_err());
    }

    #[test]
    fn test_info() {
        let info = MachineCatalog::info(0).unwrap();

        assert_eq!(info.name, "Equal counts");
        assert_eq!(info.initial_state, "q0");
        assert_eq!(info.state_count, 5);
        assert_eq!(info.transition_count, 14);
        assert!(MachineCatalog::text_by_index(0)
            .unwrap()
            .contains("name: Equal counts"));
    }

    #[test]
    fn test_binary_increment() {
        let mut machine =
            TuringMachine::new(MachineCatalog::get_by_name("binary increment").unwrap());

        let result = machine.run("1011").unwrap();
        assert!(result.outcome.is_accepted());
        assert_eq!(result.step_count, 8);
        assert_eq!(result.final_tape, "1100");

        assert_eq!(machine.run("111").unwrap().final_tape, "1000");
        assert_eq!(machine.run("").unwrap().final_tape, "1");
    }

    #[test]
    fn test_even_ones() {
        let mut machine = TuringMachine::new(MachineCatalog::get_by_name("even ones").unwrap());

        assert!(machine.run("1010").unwrap().outcome.is_accepted());
        assert!(machine.run("").unwrap().outcome.is_accepted());
        assert!(!machine.run("10").unwrap().outcome.is_accepted());
    }

    #[test]
    fn test_equal_counts() {
        let mut machine =
            TuringMachine::new(MachineCatalog::get_by_name("equal counts").unwrap());

        assert!(machine.run("0011").unwrap().outcome.is_accepted());
        assert!(!machine.run("001").unwrap().outcome.is_accepted());
    }
}
