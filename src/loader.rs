//! This module provides the `DefinitionLoader` struct, responsible for loading machine
//! definitions from files, strings, and directories of `.tm` files.

use crate::definition::Definition;
use crate::parser::parse;
use crate::types::TuringMachineError;
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of machine definition files.
pub const DEFINITION_EXTENSION: &str = "tm";

/// `DefinitionLoader` is a utility struct for loading machine definitions.
pub struct DefinitionLoader;

impl DefinitionLoader {
    /// Loads a single definition from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(Definition)` if the file is read, parsed, and validated.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ParseError)` or `Err(TuringMachineError::Configuration)`
    ///   if the content is not a valid definition.
    pub fn load_definition(path: &Path) -> Result<Definition, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        parse(&content)
    }

    /// Loads a single definition from string content, e.g. text piped on stdin.
    pub fn load_definition_from_string(content: &str) -> Result<Definition, TuringMachineError> {
        parse(content)
    }

    /// Loads every `.tm` file in `directory`.
    ///
    /// Subdirectories and files with other extensions are skipped. Each element of the result
    /// reports one file, so a single broken definition does not hide the others.
    pub fn load_definitions(
        directory: &Path,
    ) -> Vec<Result<(PathBuf, Definition), TuringMachineError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let path = match entry {
                    Ok(entry) => entry.path(),
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                if path.is_dir()
                    || path
                        .extension()
                        .map_or(true, |ext| ext != DEFINITION_EXTENSION)
                {
                    return None;
                }

                Some(Self::load_definition(&path).map(|definition| (path, definition)))
            })
            .collect();

        // Directory order is platform dependent.
        results.sort_by_key(|result| result.as_ref().ok().map(|(path, _)| path.clone()));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID: &str = "name: Flip\nstates: q0, qf\ntape: a, b, _\nstart: q0\naccept: qf\nrules:\n  q0, a, b, R, qf";

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_valid_definition() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "flip.tm", VALID);

        let definition = DefinitionLoader::load_definition(&path).unwrap();
        assert_eq!(definition.name(), "Flip");
        assert_eq!(definition.transition_count(), 1);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = DefinitionLoader::load_definition(&dir.path().join("absent.tm"));

        assert!(matches!(result, Err(TuringMachineError::FileError(_))));
    }

    #[test]
    fn test_load_invalid_definition() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "invalid.tm", "This is not a valid definition");

        assert!(DefinitionLoader::load_definition(&path).is_err());
    }

    #[test]
    fn test_load_from_string() {
        let definition = DefinitionLoader::load_definition_from_string(VALID).unwrap();
        assert_eq!(definition.initial_state(), "q0");
    }

    #[test]
    fn test_load_definitions_from_directory() {
        let dir = tempdir().unwrap();
        write_file(dir.path(), "valid.tm", VALID);
        write_file(dir.path(), "invalid.tm", "This is not a valid definition");
        write_file(dir.path(), "ignored.txt", "This file should be ignored");

        let results = DefinitionLoader::load_definitions(dir.path());

        assert_eq!(results.len(), 2);
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 1);
    }

    #[test]
    fn test_load_definitions_missing_directory() {
        let dir = tempdir().unwrap();
        let results = DefinitionLoader::load_definitions(&dir.path().join("nope"));

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(TuringMachineError::FileError(_))));
    }
}
