//! CLI module for the infoarena helper
//!
//! ## Commands
//!
//! - `create <name>` - Scaffold a new solution directory
//! - `test` - Run the solution in the current directory against its fixtures
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//! - `test_interfaces` - Discovery and execution boundaries
//! - `test_runner` - Harness loop and reporters
//!
//! ## Design
//!
//! The CLI uses clap for argument parsing with derive macros.
//! Command functions return `CliResult<T>` instead of calling `process::exit`.
//! Only the top-level `run()` function handles errors and exits.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod test_interfaces;
pub mod test_runner;

use std::ffi::OsString;
use std::fmt;
use std::process;
use std::time::Duration;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use infoarena_core::{DEFAULT_TEST_DIR, DiffMode};

use crate::config::{HarnessConfig, OutputFormat, validate_test_dir_name};
use crate::version::INFOARENA_VERSION;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// At least one fixture failed
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Malformed command-line flags
    pub const USAGE: ExitCode = ExitCode(2);
    /// The run could not be carried out at all
    pub const FATAL: ExitCode = ExitCode(-1);
}

/// Error type for CLI operations.
///
/// Contains a user-facing message and an exit code. The CLI entry point
/// catches these errors, prints the message, and exits with the code.
#[derive(Debug)]
pub struct CliError {
    /// User-facing error message (already formatted for display)
    pub message: String,
    /// Exit code to return to the shell
    pub exit_code: ExitCode,
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self {
            message: message.into(),
            exit_code,
        }
    }

    /// Create a failure error (exit code 1).
    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FAILURE)
    }

    /// Create a fatal error (exit code -1).
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(message, ExitCode::FATAL)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Helper for infoarena-style competitive programming problems
#[derive(Parser, Debug)]
#[command(name = "infoarena")]
#[command(version = INFOARENA_VERSION)]
#[command(about = "Scaffold solutions and test them against input/output fixtures", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a new solution directory with a source stub, Makefile and test/
    Create {
        /// Problem identifier; names the directory, source file and executable
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Run the solution in the current directory against its fixtures
    Test {
        /// Print a line per fixture and the diff of failing fixtures
        #[arg(short, long)]
        verbose: bool,
        /// Compare outputs byte-for-byte instead of ignoring trailing whitespace
        #[arg(long)]
        exact: bool,
        /// Per-fixture time limit in seconds
        #[arg(long, value_name = "SECONDS", value_parser = parse_timeout)]
        timeout: Option<Duration>,
        /// Report format
        #[arg(long, value_enum, default_value = "console")]
        format: OutputFormat,
        /// Fixture directory inside the solution directory
        #[arg(long = "test-dir", value_name = "NAME", default_value = DEFAULT_TEST_DIR, value_parser = parse_test_dir)]
        test_dir: String,
    },
}

fn parse_timeout(value: &str) -> Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if seconds.is_nan() || seconds <= 0.0 {
        return Err("timeout must be greater than zero".to_string());
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

fn parse_test_dir(value: &str) -> Result<String, String> {
    validate_test_dir_name(value).map_err(|reason| format!("test directory {}", reason))?;
    Ok(value.to_string())
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// This is the only place where `process::exit` is called. All command
/// implementations return `CliResult` and errors are handled here.
pub fn run() {
    match run_with_args(std::env::args_os()) {
        Ok(exit_code) => {
            if exit_code.0 != 0 {
                process::exit(exit_code.0);
            }
        }
        Err(e) => {
            if !e.message.is_empty() {
                eprintln!("{}", e.message);
            }
            process::exit(e.exit_code.0);
        }
    }
}

/// Parse `args` and execute the selected command.
///
/// A missing or unknown command, `create` without a name, `--help` and `--version` print usage to stdout and
/// succeed. Malformed flag values are usage errors.
pub fn run_with_args<I, T>(args: I) -> CliResult<ExitCode>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(e) => return handle_parse_error(e),
    };
    execute(cli)
}

fn handle_parse_error(error: clap::Error) -> CliResult<ExitCode> {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            print!("{}", error.render());
            Ok(ExitCode::SUCCESS)
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        | ErrorKind::InvalidSubcommand
        | ErrorKind::MissingSubcommand
        | ErrorKind::MissingRequiredArgument => {
            tracing::debug!(kind = ?error.kind(), "showing usage");
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
        _ => Err(CliError::new(
            error.render().to_string().trim_end().to_string(),
            ExitCode::USAGE,
        )),
    }
}

fn print_usage() {
    println!("{}", Cli::command().render_help());
}

/// Execute the CLI command and return result.
fn execute(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Some(Command::Create { name }) => {
            let parent_dir = commands::current_dir()?;
            commands::create_solution(&parent_dir, &name)
        }
        Some(Command::Test {
            verbose,
            exact,
            timeout,
            format,
            test_dir,
        }) => {
            let working_dir = commands::current_dir()?;
            let problem = commands::deduce_problem(&working_dir)?;
            let diff_mode = if exact { DiffMode::Exact } else { DiffMode::Loose };
            let config = HarnessConfig::new(working_dir, problem)
                .with_test_dir_name(test_dir)
                .with_diff_mode(diff_mode)
                .with_timeout(timeout)
                .with_verbose(verbose)
                .with_output_format(format);
            commands::test_solution(&config)
        }
        None => {
            print_usage();
            Ok(ExitCode::SUCCESS)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_create() {
        let cli = Cli::try_parse_from(["infoarena", "create", "sum"]).unwrap();
        if let Some(Command::Create { name }) = cli.command {
            assert_eq!(name, "sum");
        } else {
            panic!("Expected Create command");
        }
    }

    #[test]
    fn test_cli_parse_test_defaults() {
        let cli = Cli::try_parse_from(["infoarena", "test"]).unwrap();
        if let Some(Command::Test {
            verbose,
            exact,
            timeout,
            format,
            test_dir,
        }) = cli.command
        {
            assert!(!verbose);
            assert!(!exact);
            assert_eq!(timeout, None);
            assert_eq!(format, OutputFormat::Console);
            assert_eq!(test_dir, "test");
        } else {
            panic!("Expected Test command");
        }
    }

    #[test]
    fn test_cli_parse_test_flags() {
        let cli = Cli::try_parse_from([
            "infoarena",
            "test",
            "-v",
            "--exact",
            "--timeout",
            "1.5",
            "--format",
            "json",
            "--test-dir",
            "cases",
        ])
        .unwrap();
        if let Some(Command::Test {
            verbose,
            exact,
            timeout,
            format,
            test_dir,
        }) = cli.command
        {
            assert!(verbose);
            assert!(exact);
            assert_eq!(timeout, Some(Duration::from_millis(1500)));
            assert_eq!(format, OutputFormat::Json);
            assert_eq!(test_dir, "cases");
        } else {
            panic!("Expected Test command");
        }
    }

    #[test]
    fn test_parse_timeout_rejects_bad_values() {
        assert!(parse_timeout("abc").is_err());
        assert!(parse_timeout("0").is_err());
        assert!(parse_timeout("-1").is_err());
        assert!(parse_timeout("NaN").is_err());
        assert_eq!(parse_timeout("2").unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn test_usage_cases_succeed() {
        assert_eq!(run_with_args(["infoarena"]).unwrap(), ExitCode::SUCCESS);
        assert_eq!(run_with_args(["infoarena", "frobnicate"]).unwrap(), ExitCode::SUCCESS);
        assert_eq!(run_with_args(["infoarena", "create"]).unwrap(), ExitCode::SUCCESS);
        assert_eq!(run_with_args(["infoarena", "--help"]).unwrap(), ExitCode::SUCCESS);
        assert_eq!(run_with_args(["infoarena", "--version"]).unwrap(), ExitCode::SUCCESS);
    }

    #[test]
    fn test_malformed_flag_is_usage_error() {
        let err = run_with_args(["infoarena", "test", "--timeout", "soon"]).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::USAGE);
        assert!(err.message.contains("--timeout"));

        let err = run_with_args(["infoarena", "test", "--format", "xml"]).unwrap_err();
        assert_eq!(err.exit_code, ExitCode::USAGE);

        for test_dir in [".", "..", "", "a/b"] {
            let err = run_with_args(["infoarena", "test", "--test-dir", test_dir]).unwrap_err();
            assert_eq!(err.exit_code, ExitCode::USAGE, "--test-dir {:?}", test_dir);
        }
    }
}
