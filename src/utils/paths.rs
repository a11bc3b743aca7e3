//! Resolution of profile paths against the profile file's directory.

use std::path::{Path, PathBuf};

/// True when `candidate` is absolute under the host path syntax.
///
/// Root-rooted paths (`\data` on Windows) count as absolute here even though
/// `Path::is_absolute` requires a drive prefix on that platform.
pub fn is_absolute(candidate: &Path) -> bool {
    candidate.is_absolute() || candidate.has_root()
}

/// Returns `candidate` unchanged when already absolute, otherwise `base`
/// joined with `candidate`. Pure; touches no filesystem.
pub fn resolve(base: &Path, candidate: &Path) -> PathBuf {
    if is_absolute(candidate) {
        candidate.to_path_buf()
    } else {
        base.join(candidate)
    }
}
