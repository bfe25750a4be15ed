//! Fixture discovery.
//!
//! A fixture is a pair of files sharing a stem: `<stem>.in` holds the program input and `<stem>.out` holds the
//! expected output. Inputs without a matching output are skipped, since a test directory may contain fixtures that
//! are still being written.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::{CoreError, CoreResult};
use crate::{INPUT_SUFFIX, OUTPUT_SUFFIX};

/// An input / expected-output pair found in a test directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureCase {
    /// Shared stem of both files, used to identify the case in reports.
    pub name: String,
    pub input_path: PathBuf,
    pub expected_output_path: PathBuf,
}

impl FixtureCase {
    pub fn new(name: impl Into<String>, input_path: impl Into<PathBuf>, expected_output_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            input_path: input_path.into(),
            expected_output_path: expected_output_path.into(),
        }
    }
}

/// Discover fixture pairs in `test_dir`.
///
/// ## Returns
/// - (`Vec<FixtureCase>`): every `<stem>.in` that has a sibling `<stem>.out`, sorted by input file name.
///
/// ## Errors
/// - `CoreError::MissingTestDir` if `test_dir` is not a directory.
/// - `CoreError::ReadDir` if the directory listing fails.
///
/// ## Notes
/// - Directory listing order is platform dependent, so the result is sorted to keep runs reproducible.
#[tracing::instrument(skip_all, fields(test_dir = %test_dir.display()))]
pub fn discover_fixtures(test_dir: &Path) -> CoreResult<Vec<FixtureCase>> {
    if !test_dir.is_dir() {
        return Err(CoreError::MissingTestDir {
            path: test_dir.to_path_buf(),
        });
    }

    let entries = fs::read_dir(test_dir).map_err(|e| CoreError::read_dir(test_dir, e))?;

    let mut fixtures = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::read_dir(test_dir, e))?;
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        let Some(stem) = file_name.strip_suffix(INPUT_SUFFIX) else {
            continue;
        };
        if stem.is_empty() {
            continue;
        }

        let input_path = entry.path();
        if !input_path.is_file() {
            continue;
        }

        let expected_output_path = test_dir.join(format!("{stem}{OUTPUT_SUFFIX}"));
        if !expected_output_path.is_file() {
            tracing::debug!(input = %input_path.display(), "skipping input without expected output");
            continue;
        }

        fixtures.push(FixtureCase::new(stem, input_path, expected_output_path));
    }

    fixtures.sort_by(|a, b| a.input_path.cmp(&b.input_path));
    tracing::debug!(count = fixtures.len(), "discovered fixtures");
    Ok(fixtures)
}
