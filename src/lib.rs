#![forbid(unsafe_code)]
//! infoarena: a helper for competitive-programming solutions
//!
//! `create <name>` scaffolds a solution directory; `test` runs the built solution against every `*.in` / `*.out`
//! fixture pair in its test directory and reports which fixtures failed.
//!
//! Discovery, executable lookup and output comparison live in `infoarena_core`; this crate owns the CLI, the
//! harness loop and the scaffolder.
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.

pub mod cli;
pub mod config;
pub mod scaffold;
pub mod version;

pub use config::{HarnessConfig, OutputFormat};
pub use scaffold::{GenerateOutcome, SolutionGenerator};
