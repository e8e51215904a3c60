//! Filesystem path helpers.

use std::path::{Path, PathBuf};

/// Make a path absolute, resolving symlinks when it exists.
///
/// Paths that do not exist are made absolute against the working directory
/// without touching the filesystem.
pub fn resolve_path(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
