//! infoarena version information.
//!
//! This module exposes the tool version as a single constant so the CLI and the generated Makefile header agree on
//! the same value.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.

/// The infoarena version string (for example, `0.1.0`).
pub const INFOARENA_VERSION: &str = env!("CARGO_PKG_VERSION");
