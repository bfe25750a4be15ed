//! Test harness implementation
//!
//! Runs a solution executable against every fixture pair in the solution's test directory:
//!
//! 1. Discover `*.in` / `*.out` pairs
//! 2. Locate the executable and copy it into the test directory
//! 3. For each fixture, stage its input as `<problem>.in`, run the solution, compare `<problem>.out`
//! 4. Remove the staged files, report
//!
//! ## Scratch Files
//!
//! `<problem>.in` and `<problem>.out` are owned by a `ScratchFiles` guard for the whole fixture loop. The normal path
//! releases them explicitly so deletion errors surface; every other exit path (an early `?`, a panic) removes them
//! when the guard is dropped.
//!
//! ## TestReporter Trait
//!
//! Reporting is separated from execution by the `TestReporter` trait. The console reporter prints the classic
//! summary; the JSON reporter prints one machine-readable document.

use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use infoarena_core::{Comparison, CoreError, FixtureCase, compare_files, locate_executable, read_lossy, unified_diff};

use super::test_interfaces::{
    DefaultTestDiscovery, DefaultTestExecutor, ExecutionOutcome, HarnessError, Interrupt, TestDiscovery,
    TestExecutor,
};
use super::{CliError, CliResult, ExitCode};
use crate::config::{HarnessConfig, OutputFormat, validate_test_dir_name};

// ============================================================================
// Results
// ============================================================================

/// Why a fixture failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// Produced output differs from the expected output
    Mismatch { first_difference_line: usize, diff: String },
    /// The solution exceeded the per-fixture time limit and was killed
    TimedOut(Duration),
    /// The outputs could not be compared (for example, no output file was written)
    Comparison(String),
}

impl FailureReason {
    pub fn summary(&self) -> String {
        match self {
            FailureReason::Mismatch {
                first_difference_line, ..
            } => format!("output differs at line {}", first_difference_line),
            FailureReason::TimedOut(limit) => format!("timed out after {:.2}s", limit.as_secs_f64()),
            FailureReason::Comparison(message) => message.clone(),
        }
    }
}

/// Result of running a single fixture
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaseResult {
    Passed(Duration),
    Failed(Duration, FailureReason),
}

impl CaseResult {
    pub fn passed(&self) -> bool {
        matches!(self, CaseResult::Passed(_))
    }
}

/// One executed fixture and its result
#[derive(Debug, Clone)]
pub struct CaseReport {
    pub name: String,
    pub result: CaseResult,
}

/// Terminal outcome of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    NoTests,
    AllPassed,
    SomeFailed,
}

impl RunOutcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            RunOutcome::NoTests => "no_tests",
            RunOutcome::AllPassed => "passed",
            RunOutcome::SomeFailed => "failed",
        }
    }
}

/// Aggregate of a finished run, in discovery order
#[derive(Debug, Clone)]
pub struct TestReport {
    pub problem: String,
    pub cases: Vec<CaseReport>,
    pub duration: Duration,
}

impl TestReport {
    pub fn total(&self) -> usize {
        self.cases.len()
    }

    pub fn failed_count(&self) -> usize {
        self.cases.iter().filter(|case| !case.result.passed()).count()
    }

    /// Names of the failed fixtures, in the order they ran.
    pub fn failed_case_names(&self) -> Vec<&str> {
        self.cases
            .iter()
            .filter(|case| !case.result.passed())
            .map(|case| case.name.as_str())
            .collect()
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.failed_count() > 0 {
            RunOutcome::SomeFailed
        } else if self.cases.is_empty() {
            RunOutcome::NoTests
        } else {
            RunOutcome::AllPassed
        }
    }
}

// ============================================================================
// Test Reporter Trait
// ============================================================================

/// Trait for reporting harness progress and results.
pub trait TestReporter {
    /// Called before discovery
    fn on_run_start(&mut self, _problem: &str) {}

    /// Called once fixtures are discovered and the executable is staged
    fn on_collection_complete(&mut self, _fixture_count: usize) {}

    /// Called when a fixture completes
    fn on_case_complete(&mut self, case: &FixtureCase, result: &CaseResult);

    /// Called when all fixtures have completed
    fn on_run_complete(&mut self, report: &TestReport);
}

/// Default console reporter
#[derive(Default)]
pub struct ConsoleReporter {
    pub verbose: bool,
    /// Emit ANSI colours; off when stdout is not a terminal
    pub color: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            color: io::stdout().is_terminal(),
        }
    }

    /// `PASSED` / `FAILED` label, coloured when `color` is set.
    pub fn status_label(passed: bool, color: bool) -> &'static str {
        match (passed, color) {
            (true, true) => "\x1b[32mPASSED\x1b[0m",
            (true, false) => "PASSED",
            (false, true) => "\x1b[31mFAILED\x1b[0m",
            (false, false) => "FAILED",
        }
    }

    /// Summary lines printed at the end of a run.
    pub fn summary_lines(report: &TestReport) -> Vec<String> {
        match report.outcome() {
            RunOutcome::SomeFailed => vec![
                format!("{} out of {} tests failed.", report.failed_count(), report.total()),
                format!("Failed tests: {}", report.failed_case_names().join(", ")),
            ],
            RunOutcome::NoTests => vec!["No tests were found".to_string()],
            RunOutcome::AllPassed => vec!["All tests passed".to_string()],
        }
    }
}

impl TestReporter for ConsoleReporter {
    fn on_run_start(&mut self, problem: &str) {
        println!("Running tests for {}", problem);
    }

    fn on_collection_complete(&mut self, fixture_count: usize) {
        if self.verbose {
            println!("collected {} fixture(s)", fixture_count);
        }
    }

    fn on_case_complete(&mut self, case: &FixtureCase, result: &CaseResult) {
        if !self.verbose {
            return;
        }

        match result {
            CaseResult::Passed(d) => println!(
                "{} {} ({}ms)",
                case.name,
                Self::status_label(true, self.color),
                d.as_millis()
            ),
            CaseResult::Failed(d, reason) => {
                println!(
                    "{} {} ({}ms): {}",
                    case.name,
                    Self::status_label(false, self.color),
                    d.as_millis(),
                    reason.summary()
                );
                if let FailureReason::Mismatch { diff, .. } = reason {
                    print!("{}", diff);
                }
            }
        }
    }

    fn on_run_complete(&mut self, report: &TestReport) {
        for line in Self::summary_lines(report) {
            println!("{}", line);
        }
    }
}

/// Reporter that prints a single JSON document once the run completes
#[derive(Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn render(report: &TestReport) -> serde_json::Value {
        let cases: Vec<serde_json::Value> = report
            .cases
            .iter()
            .map(|case| match &case.result {
                CaseResult::Passed(d) => serde_json::json!({
                    "name": case.name,
                    "passed": true,
                    "duration_ms": d.as_millis() as u64,
                }),
                CaseResult::Failed(d, reason) => serde_json::json!({
                    "name": case.name,
                    "passed": false,
                    "duration_ms": d.as_millis() as u64,
                    "reason": reason.summary(),
                }),
            })
            .collect();

        serde_json::json!({
            "problem": report.problem,
            "outcome": report.outcome().as_str(),
            "total": report.total(),
            "failed": report.failed_count(),
            "failed_cases": report.failed_case_names(),
            "duration_ms": report.duration.as_millis() as u64,
            "cases": cases,
        })
    }
}

impl TestReporter for JsonReporter {
    fn on_case_complete(&mut self, _case: &FixtureCase, _result: &CaseResult) {}

    fn on_run_complete(&mut self, report: &TestReport) {
        println!("{}", Self::render(report));
    }
}

// ============================================================================
// Scratch Files
// ============================================================================

/// Owns the staged `<problem>.in` / `<problem>.out` files for the duration of a run.
struct ScratchFiles {
    input: PathBuf,
    output: PathBuf,
    released: bool,
}

impl ScratchFiles {
    fn new(input: PathBuf, output: PathBuf) -> Self {
        Self {
            input,
            output,
            released: false,
        }
    }

    /// Copy `fixture_input` onto the staged input and clear output left by the previous fixture.
    fn stage(&self, fixture_input: &Path) -> Result<(), HarnessError> {
        remove_if_present(&self.output).map_err(|source| HarnessError::Cleanup {
            path: self.output.clone(),
            source,
        })?;
        fs::copy(fixture_input, &self.input).map_err(|source| HarnessError::StageInput {
            path: self.input.clone(),
            source,
        })?;
        Ok(())
    }

    /// Remove both staged files, attempting both even if the first removal fails.
    fn release(mut self) -> Result<(), HarnessError> {
        self.released = true;
        let input = remove_if_present(&self.input).map_err(|source| HarnessError::Cleanup {
            path: self.input.clone(),
            source,
        });
        let output = remove_if_present(&self.output).map_err(|source| HarnessError::Cleanup {
            path: self.output.clone(),
            source,
        });
        input.and(output)
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        for path in [&self.input, &self.output] {
            if let Err(e) = remove_if_present(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to remove staged file");
            }
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

// ============================================================================
// Harness
// ============================================================================

/// Run every fixture of `config.problem` and return the aggregated report.
///
/// ## Errors
///
/// Returns an error if:
/// - The test directory is missing or unreadable
/// - No executable qualifies (nothing is staged in that case)
/// - Staging a file, removing a staged file, or starting the solution fails
///
/// Fixture failures are not errors; they are recorded in the report.
#[tracing::instrument(skip_all, fields(problem = %config.problem))]
pub fn run_harness(
    config: &HarnessConfig,
    discovery: &impl TestDiscovery,
    executor: &impl TestExecutor,
    reporter: &mut impl TestReporter,
) -> Result<TestReport, HarnessError> {
    let start = Instant::now();
    validate_test_dir_name(&config.test_dir_name).map_err(|reason| HarnessError::InvalidTestDir {
        name: config.test_dir_name.clone(),
        reason,
    })?;
    reporter.on_run_start(&config.problem);

    let test_dir = config.test_dir();
    let mut fixtures = discovery.discover(&test_dir)?;
    fixtures.retain(|fixture| {
        let collides = fixture.name == config.problem;
        if collides {
            tracing::warn!(
                fixture = %fixture.name,
                "skipping fixture named after the problem; its files are the scratch slots and will be deleted by the run"
            );
        }
        !collides
    });

    let executable = locate_executable(&config.working_dir, &config.problem)
        .map_err(HarnessError::Discovery)?
        .ok_or_else(|| HarnessError::ExecutableNotFound {
            problem: config.problem.clone(),
            dir: config.working_dir.clone(),
        })?;

    let staged_executable = stage_executable(&executable, &test_dir)?;
    reporter.on_collection_complete(fixtures.len());

    let scratch = ScratchFiles::new(config.staged_input(), config.staged_output());
    let mut cases = Vec::with_capacity(fixtures.len());

    for fixture in &fixtures {
        scratch.stage(&fixture.input_path)?;

        let outcome = executor.execute(&staged_executable, &test_dir, config.timeout)?;
        log_execution(fixture, &outcome);

        let result = judge(config, fixture, &outcome);
        reporter.on_case_complete(fixture, &result);
        cases.push(CaseReport {
            name: fixture.name.clone(),
            result,
        });
    }

    scratch.release()?;

    let report = TestReport {
        problem: config.problem.clone(),
        cases,
        duration: start.elapsed(),
    };
    reporter.on_run_complete(&report);
    Ok(report)
}

fn stage_executable(executable: &Path, test_dir: &Path) -> Result<PathBuf, HarnessError> {
    let file_name = executable.file_name().unwrap_or(executable.as_os_str());
    let staged = test_dir.join(file_name);
    if same_file(executable, &staged) {
        // Copying a file onto itself truncates it
        tracing::debug!(path = %staged.display(), "executable already in test directory");
        return Ok(staged);
    }
    tracing::debug!(from = %executable.display(), to = %staged.display(), "staging executable");
    fs::copy(executable, &staged).map_err(|source| HarnessError::StageExecutable {
        path: staged.clone(),
        source,
    })?;
    Ok(staged)
}

fn same_file(a: &Path, b: &Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn log_execution(fixture: &FixtureCase, outcome: &ExecutionOutcome) {
    if !outcome.timed_out && !outcome.success() {
        tracing::warn!(
            fixture = %fixture.name,
            exit_code = ?outcome.exit_code,
            "solution exited unsuccessfully"
        );
    }
    if !outcome.stderr.is_empty() {
        tracing::debug!(fixture = %fixture.name, stderr = %outcome.stderr, "solution stderr");
    }
}

fn judge(config: &HarnessConfig, fixture: &FixtureCase, outcome: &ExecutionOutcome) -> CaseResult {
    let duration = outcome.duration;

    if outcome.timed_out {
        let limit = config.timeout.unwrap_or(duration);
        return CaseResult::Failed(duration, FailureReason::TimedOut(limit));
    }

    let staged_output = config.staged_output();
    match compare_files(&fixture.expected_output_path, &staged_output, config.diff_mode) {
        Ok(Comparison::Match) => CaseResult::Passed(duration),
        Ok(Comparison::Mismatch { first_difference_line }) => {
            let diff = render_diff(&fixture.expected_output_path, &staged_output);
            CaseResult::Failed(
                duration,
                FailureReason::Mismatch {
                    first_difference_line,
                    diff,
                },
            )
        }
        Err(e) => CaseResult::Failed(duration, FailureReason::Comparison(comparison_message(&e))),
    }
}

fn render_diff(expected_path: &Path, actual_path: &Path) -> String {
    match (read_lossy(expected_path), read_lossy(actual_path)) {
        (Ok(expected), Ok(actual)) => unified_diff(&expected, &actual),
        _ => String::new(),
    }
}

fn comparison_message(error: &CoreError) -> String {
    match error {
        CoreError::ReadFile { source, .. } if source.kind() == io::ErrorKind::NotFound => {
            "solution did not produce an output file".to_string()
        }
        other => other.to_string(),
    }
}

// ============================================================================
// CLI entry
// ============================================================================

/// Run the harness for `config` with the default discovery, executor and the configured reporter.
///
/// Exit codes: success when every fixture passed or no fixtures exist, failure when any fixture failed,
/// `ExitCode::FATAL` when the run could not be carried out.
///
/// Ctrl-C stops the run: the running solution is killed, the staged files are removed and the run ends as fatal.
pub fn run_tests(config: &HarnessConfig) -> CliResult<ExitCode> {
    let report = DefaultTestExecutor::new(Interrupt::ctrl_c())
        .and_then(|executor| match config.output_format {
            OutputFormat::Console => run_harness(
                config,
                &DefaultTestDiscovery,
                &executor,
                &mut ConsoleReporter::new(config.verbose),
            ),
            OutputFormat::Json => run_harness(config, &DefaultTestDiscovery, &executor, &mut JsonReporter),
        })
        .map_err(|e| CliError::fatal(format!("{:?}", miette::Report::new(e))))?;

    match report.outcome() {
        RunOutcome::NoTests | RunOutcome::AllPassed => Ok(ExitCode::SUCCESS),
        // Summary already printed
        RunOutcome::SomeFailed => Err(CliError::new("", ExitCode::FAILURE)),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn report(results: Vec<(&str, CaseResult)>) -> TestReport {
        TestReport {
            problem: "sum".to_string(),
            cases: results
                .into_iter()
                .map(|(name, result)| CaseReport {
                    name: name.to_string(),
                    result,
                })
                .collect(),
            duration: Duration::from_millis(5),
        }
    }

    fn mismatch() -> CaseResult {
        CaseResult::Failed(
            Duration::ZERO,
            FailureReason::Mismatch {
                first_difference_line: 1,
                diff: String::new(),
            },
        )
    }

    #[test]
    fn test_outcomes_are_distinct() {
        assert_eq!(report(vec![]).outcome(), RunOutcome::NoTests);
        assert_eq!(
            report(vec![("t1", CaseResult::Passed(Duration::ZERO))]).outcome(),
            RunOutcome::AllPassed
        );
        assert_eq!(report(vec![("t1", mismatch())]).outcome(), RunOutcome::SomeFailed);
    }

    #[test]
    fn test_failed_names_keep_run_order() {
        let report = report(vec![
            ("t3", mismatch()),
            ("t1", CaseResult::Passed(Duration::ZERO)),
            ("t2", mismatch()),
        ]);
        assert_eq!(report.failed_case_names(), vec!["t3", "t2"]);
        assert_eq!(report.failed_count(), 2);
        assert_eq!(report.total(), 3);
    }

    #[test]
    fn test_console_summary_lines() {
        let failed = report(vec![("t1", CaseResult::Passed(Duration::ZERO)), ("t2", mismatch())]);
        assert_eq!(
            ConsoleReporter::summary_lines(&failed),
            vec!["1 out of 2 tests failed.".to_string(), "Failed tests: t2".to_string()]
        );
        assert_eq!(
            ConsoleReporter::summary_lines(&report(vec![])),
            vec!["No tests were found".to_string()]
        );
        assert_eq!(
            ConsoleReporter::summary_lines(&report(vec![("t1", CaseResult::Passed(Duration::ZERO))])),
            vec!["All tests passed".to_string()]
        );
    }

    #[test]
    fn test_status_label_colour_only_when_requested() {
        assert_eq!(ConsoleReporter::status_label(true, false), "PASSED");
        assert_eq!(ConsoleReporter::status_label(false, false), "FAILED");
        assert!(ConsoleReporter::status_label(false, true).starts_with("\x1b[31m"));
        assert!(!ConsoleReporter::new(false).color || io::stdout().is_terminal());
    }

    #[test]
    fn test_json_report_shape() {
        let value = JsonReporter::render(&report(vec![
            ("t1", CaseResult::Passed(Duration::ZERO)),
            (
                "t2",
                CaseResult::Failed(Duration::ZERO, FailureReason::TimedOut(Duration::from_secs(1))),
            ),
        ]));

        assert_eq!(value["problem"], "sum");
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["total"], 2);
        assert_eq!(value["failed"], 1);
        assert_eq!(value["failed_cases"], serde_json::json!(["t2"]));
        assert_eq!(value["cases"][1]["reason"], "timed out after 1.00s");
    }

    #[test]
    fn test_failure_reason_summary() {
        let reason = FailureReason::Mismatch {
            first_difference_line: 4,
            diff: String::new(),
        };
        assert_eq!(reason.summary(), "output differs at line 4");
        assert_eq!(
            FailureReason::Comparison("solution did not produce an output file".to_string()).summary(),
            "solution did not produce an output file"
        );
    }
}
