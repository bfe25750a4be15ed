//! Executable lookup inside a solution directory.

use std::fs;
use std::path::{Path, PathBuf};

use crate::EXECUTABLE_SUFFIX;
use crate::errors::{CoreError, CoreResult};

/// Find the solution executable in `dir`.
///
/// A regular file qualifies when its name ends with `.exe`, or when its name equals `problem` and the owner may
/// execute it.
///
/// ## Returns
/// - (`Option<PathBuf>`): the first qualifying file in name order, or `None` when nothing qualifies.
///
/// ## Errors
/// - `CoreError::ReadDir` if the directory cannot be listed.
pub fn locate_executable(dir: &Path, problem: &str) -> CoreResult<Option<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| CoreError::read_dir(dir, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| CoreError::read_dir(dir, e))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.ends_with(EXECUTABLE_SUFFIX) || (name == problem && is_user_executable(&path)) {
            candidates.push(path);
        }
    }

    candidates.sort();
    Ok(candidates.into_iter().next())
}

#[cfg(unix)]
fn is_user_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    fs::metadata(path)
        .map(|meta| meta.permissions().mode() & 0o100 != 0)
        .unwrap_or(false)
}

// No owner-execute bit to consult; any regular file named after the problem counts.
#[cfg(not(unix))]
fn is_user_executable(path: &Path) -> bool {
    path.is_file()
}
