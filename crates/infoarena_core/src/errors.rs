//! Errors raised while scanning solution and fixture directories.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that occur while reading solution or fixture files.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("test directory '{}' does not exist", path.display())]
    MissingTestDir { path: PathBuf },

    #[error("failed to read directory '{}': {source}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    pub(crate) fn read_dir(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadDir {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn read_file(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }
}
