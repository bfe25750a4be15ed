//! Provide the filesystem-facing building blocks of the infoarena solution harness.
//!
//! This crate is intentionally small. It contains the pieces the harness needs that do not depend on process
//! spawning or CLI concerns:
//! - fixture discovery (pairing `*.in` with `*.out` inside a test directory),
//! - executable lookup inside a solution directory,
//! - output comparison (exact and loose modes) and diff rendering.
//!
//! ## Notes
//!
//! - No global state: every operation takes the directory it works on as a parameter.
//! - Filesystem access here is read-only. Staging and cleanup live in the `infoarena` crate.

pub mod compare;
pub mod errors;
pub mod fixtures;
pub mod locate;

pub use compare::{Comparison, DiffMode, compare_files, compare_outputs, read_lossy, unified_diff};
pub use errors::{CoreError, CoreResult};
pub use fixtures::{FixtureCase, discover_fixtures};
pub use locate::locate_executable;

/// Suffix of fixture input files (and of the staged input slot).
pub const INPUT_SUFFIX: &str = ".in";

/// Suffix of expected-output fixture files (and of the staged output slot).
pub const OUTPUT_SUFFIX: &str = ".out";

/// Extension that marks a file as executable regardless of permission bits.
pub const EXECUTABLE_SUFFIX: &str = ".exe";

/// Default name of the fixture directory inside a solution directory.
pub const DEFAULT_TEST_DIR: &str = "test";
