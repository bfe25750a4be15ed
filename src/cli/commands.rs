//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::HarnessConfig;
use crate::scaffold::{GenerateOutcome, SolutionGenerator, validate_problem_name};

use super::test_runner;
use super::{CliError, CliResult, ExitCode};

/// Read the process working directory once, at the CLI boundary.
pub fn current_dir() -> CliResult<PathBuf> {
    env::current_dir().map_err(|e| CliError::fatal(format!("Cannot read current directory: {}", e)))
}

/// Create a new solution named `name` inside `parent_dir`.
pub fn create_solution(parent_dir: &Path, name: &str) -> CliResult<ExitCode> {
    validate_problem_name(name).map_err(CliError::failure)?;

    let generator = SolutionGenerator::new(parent_dir, name);
    match generator.generate() {
        Ok(GenerateOutcome::Created) => {
            tracing::debug!(dir = %generator.solution_dir().display(), "created solution");
            println!("Created solution '{}'", name);
            Ok(ExitCode::SUCCESS)
        }
        Ok(GenerateOutcome::AlreadyExists) => {
            println!("Solution exists.");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Err(CliError::failure(format!(
            "Error creating solution '{}': {}",
            generator.solution_dir().display(),
            e
        ))),
    }
}

/// Deduce the problem identifier from the name of the solution directory.
pub fn deduce_problem(working_dir: &Path) -> CliResult<String> {
    working_dir
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            CliError::fatal(format!(
                "Cannot deduce the problem name from '{}'; run `test` from inside a solution directory",
                working_dir.display()
            ))
        })
}

/// Run the fixtures of the solution described by `config`.
pub fn test_solution(config: &HarnessConfig) -> CliResult<ExitCode> {
    test_runner::run_tests(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_deduce_problem_from_directory_name() {
        assert_eq!(deduce_problem(Path::new("/work/sum")).unwrap(), "sum");
        assert_eq!(deduce_problem(Path::new("/work/sum/")).unwrap(), "sum");
    }

    #[test]
    fn test_deduce_problem_fails_at_root() {
        let err = deduce_problem(Path::new("/")).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FATAL);
    }

    #[test]
    fn test_create_solution_twice_is_a_no_op() {
        let temp = TempDir::new().unwrap();
        assert_eq!(create_solution(temp.path(), "sum").unwrap(), ExitCode::SUCCESS);
        assert_eq!(create_solution(temp.path(), "sum").unwrap(), ExitCode::SUCCESS);
        assert!(temp.path().join("sum/Makefile").is_file());
    }

    #[test]
    fn test_create_solution_rejects_paths() {
        let temp = TempDir::new().unwrap();
        let err = create_solution(temp.path(), "../escape").unwrap_err();
        assert_eq!(err.exit_code, ExitCode::FAILURE);
        assert!(!temp.path().join("escape").exists());
    }
}
