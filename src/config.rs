//! Harness configuration
//!
//! Every path the harness touches is derived from an explicit working directory, so a run never depends on the
//! process-wide current directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use infoarena_core::{DEFAULT_TEST_DIR, DiffMode, INPUT_SUFFIX, OUTPUT_SUFFIX};

/// How a finished run is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Console,
    Json,
}

/// Configuration for one `test` run
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    /// Solution directory holding the executable and the test directory
    pub working_dir: PathBuf,
    /// Problem identifier; names the staged `<problem>.in` / `<problem>.out` files
    pub problem: String,
    /// Name of the fixture directory inside `working_dir`
    pub test_dir_name: String,
    pub diff_mode: DiffMode,
    /// Per-fixture wall-clock limit; `None` waits for the solution indefinitely
    pub timeout: Option<Duration>,
    pub verbose: bool,
    pub output_format: OutputFormat,
}

impl HarnessConfig {
    /// Create a config with default settings for `problem` in `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>, problem: impl Into<String>) -> Self {
        Self {
            working_dir: working_dir.into(),
            problem: problem.into(),
            test_dir_name: DEFAULT_TEST_DIR.to_string(),
            diff_mode: DiffMode::default(),
            timeout: None,
            verbose: false,
            output_format: OutputFormat::default(),
        }
    }

    pub fn with_test_dir_name(mut self, name: impl Into<String>) -> Self {
        self.test_dir_name = name.into();
        self
    }

    pub fn with_diff_mode(mut self, mode: DiffMode) -> Self {
        self.diff_mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn test_dir(&self) -> PathBuf {
        self.working_dir.join(&self.test_dir_name)
    }

    /// Path the solution reads its input from during a run.
    pub fn staged_input(&self) -> PathBuf {
        staged_path(&self.test_dir(), &self.problem, INPUT_SUFFIX)
    }

    /// Path the solution writes its output to during a run.
    pub fn staged_output(&self) -> PathBuf {
        staged_path(&self.test_dir(), &self.problem, OUTPUT_SUFFIX)
    }
}

/// Check that `name` can be used as the fixture directory: a single directory below the solution directory.
///
/// The staged executable is copied into this directory, so a name resolving to the solution directory itself would
/// overwrite the solution.
pub fn validate_test_dir_name(name: &str) -> Result<(), String> {
    validate_single_component(name)
}

/// Reject empty names, `.`/`..`, and names containing path separators.
pub(crate) fn validate_single_component(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("must not be empty".to_string());
    }
    if name == "." || name == ".." {
        return Err("must not refer to the current or parent directory".to_string());
    }
    if name.contains(['/', '\\']) {
        return Err("must not contain path separators".to_string());
    }
    Ok(())
}

fn staged_path(test_dir: &Path, problem: &str, suffix: &str) -> PathBuf {
    test_dir.join(format!("{problem}{suffix}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HarnessConfig::new("/work/sum", "sum");
        assert_eq!(config.test_dir_name, "test");
        assert_eq!(config.diff_mode, DiffMode::Loose);
        assert_eq!(config.timeout, None);
        assert!(!config.verbose);
        assert_eq!(config.output_format, OutputFormat::Console);
    }

    #[test]
    fn test_staged_paths_live_in_test_dir() {
        let config = HarnessConfig::new("/work/sum", "sum");
        assert_eq!(config.test_dir(), PathBuf::from("/work/sum/test"));
        assert_eq!(config.staged_input(), PathBuf::from("/work/sum/test/sum.in"));
        assert_eq!(config.staged_output(), PathBuf::from("/work/sum/test/sum.out"));
    }

    #[test]
    fn test_validate_test_dir_name() {
        assert!(validate_test_dir_name("test").is_ok());
        assert!(validate_test_dir_name("cases-2").is_ok());
        assert!(validate_test_dir_name("").is_err());
        assert!(validate_test_dir_name(".").is_err());
        assert!(validate_test_dir_name("..").is_err());
        assert!(validate_test_dir_name("a/b").is_err());
        assert!(validate_test_dir_name("a\\b").is_err());
    }

    #[test]
    fn test_builder_overrides() {
        let config = HarnessConfig::new("/work/sum", "sum")
            .with_test_dir_name("cases")
            .with_diff_mode(DiffMode::Exact)
            .with_timeout(Some(Duration::from_secs(2)))
            .with_verbose(true)
            .with_output_format(OutputFormat::Json);

        assert_eq!(config.staged_output(), PathBuf::from("/work/sum/cases/sum.out"));
        assert_eq!(config.diff_mode, DiffMode::Exact);
        assert_eq!(config.timeout, Some(Duration::from_secs(2)));
        assert!(config.verbose);
        assert_eq!(config.output_format, OutputFormat::Json);
    }
}
