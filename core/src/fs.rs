//! File-system side of an import: picking the input, preparing the output
//! location, consuming the source afterwards.

use crate::ImportError;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Newest regular file directly inside `dir` (non-recursive), by mtime.
pub fn latest_file(dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(dir).ok()?;
    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let path = e.path();
            // follows symlinks, so a link to a file counts as a file
            let meta = fs::metadata(&path).ok()?;
            if !meta.is_file() {
                return None;
            }
            let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            Some((mtime, path))
        })
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, path)| path)
}

/// A file path is used as-is, a directory yields its newest file.
/// Anything else (missing path, empty directory) resolves to `None`.
pub fn resolve_input(path: &Path) -> Option<PathBuf> {
    let meta = fs::metadata(path).ok()?;
    if meta.is_file() {
        Some(path.to_path_buf())
    } else if meta.is_dir() {
        latest_file(path)
    } else {
        None
    }
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> Result<(), ImportError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.exists() => {
            fs::create_dir_all(parent).map_err(|source| ImportError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
            tracing::debug!(dir = %parent.display(), "created output directory");
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Absolute form of `path`; falls back to joining the working directory when
/// the path cannot be canonicalized.
pub fn absolute(path: &Path) -> PathBuf {
    if let Ok(p) = fs::canonicalize(path) {
        return p;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

pub fn remove_source(path: &Path) -> std::io::Result<()> {
    fs::remove_file(path)
}
