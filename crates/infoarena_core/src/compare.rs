//! Output comparison.
//!
//! Two modes are supported:
//! - `Exact`: the produced output must match the expected output byte for byte.
//! - `Loose`: whitespace at the end of each line is ignored, and so are blank lines at the end of the file. Solution
//!   programs commonly differ from the reference only by a trailing space or newline, which should not fail a case.

use std::fs;
use std::path::Path;

use similar::TextDiff;

use crate::errors::{CoreError, CoreResult};

/// How produced output is compared with the expected output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffMode {
    Exact,
    #[default]
    Loose,
}

impl DiffMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Loose => "loose",
        }
    }
}

/// Outcome of comparing two outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Match,
    /// The outputs differ; the line number is 1-based.
    Mismatch { first_difference_line: usize },
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Match)
    }
}

/// Compare `actual` against `expected` using `mode`.
///
/// ## Examples
/// ```rust
/// use infoarena_core::{compare_outputs, Comparison, DiffMode};
/// assert_eq!(compare_outputs("42\n", "42  \n\n", DiffMode::Loose), Comparison::Match);
/// assert_eq!(
///     compare_outputs("1\n2\n", "1\n3\n", DiffMode::Loose),
///     Comparison::Mismatch { first_difference_line: 2 }
/// );
/// ```
pub fn compare_outputs(expected: &str, actual: &str, mode: DiffMode) -> Comparison {
    match mode {
        DiffMode::Exact => compare_exact(expected.as_bytes(), actual.as_bytes()),
        DiffMode::Loose => compare_loose(expected, actual),
    }
}

/// Compare the file at `actual_path` against the file at `expected_path`.
///
/// ## Errors
/// - `CoreError::ReadFile` if either file cannot be read (including a solution that produced no output file).
pub fn compare_files(expected_path: &Path, actual_path: &Path, mode: DiffMode) -> CoreResult<Comparison> {
    let expected = fs::read(expected_path).map_err(|e| CoreError::read_file(expected_path, e))?;
    let actual = fs::read(actual_path).map_err(|e| CoreError::read_file(actual_path, e))?;

    Ok(match mode {
        DiffMode::Exact => compare_exact(&expected, &actual),
        DiffMode::Loose => compare_loose(&String::from_utf8_lossy(&expected), &String::from_utf8_lossy(&actual)),
    })
}

/// Read a file as text, replacing invalid UTF-8 sequences.
pub fn read_lossy(path: &Path) -> CoreResult<String> {
    let bytes = fs::read(path).map_err(|e| CoreError::read_file(path, e))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Render a unified diff from `expected` to `actual` with three lines of context.
pub fn unified_diff(expected: &str, actual: &str) -> String {
    TextDiff::from_lines(expected, actual)
        .unified_diff()
        .context_radius(3)
        .header("expected", "actual")
        .to_string()
}

fn compare_exact(expected: &[u8], actual: &[u8]) -> Comparison {
    if expected == actual {
        return Comparison::Match;
    }

    let offset = expected
        .iter()
        .zip(actual)
        .position(|(e, a)| e != a)
        .unwrap_or(expected.len().min(actual.len()));
    let first_difference_line = expected[..offset].iter().filter(|&&b| b == b'\n').count() + 1;
    Comparison::Mismatch { first_difference_line }
}

fn compare_loose(expected: &str, actual: &str) -> Comparison {
    let expected = loose_lines(expected);
    let actual = loose_lines(actual);
    if expected == actual {
        return Comparison::Match;
    }

    let index = (0..expected.len().max(actual.len()))
        .find(|&i| expected.get(i) != actual.get(i))
        .unwrap_or(0);
    Comparison::Mismatch {
        first_difference_line: index + 1,
    }
}

fn loose_lines(text: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = text.split('\n').map(str::trim_end).collect();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}
