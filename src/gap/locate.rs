//! GAP executable discovery.
//!
//! Pure lookup, no side effects: an explicit override or the
//! `GAP_EXECUTABLE` environment variable is trusted as-is; otherwise `gap`
//! is searched on `PATH` and then in a short list of conventional install
//! locations.

use std::env;
use std::path::{Path, PathBuf};

use crate::{AppError, Result};

/// Environment variable consulted before path discovery.
pub const GAP_EXECUTABLE_ENV: &str = "GAP_EXECUTABLE";

/// Conventional absolute install locations probed after the PATH lookup.
const CANDIDATE_PATHS: &[&str] = &["/usr/local/bin/gap", "/usr/bin/gap", "/opt/homebrew/bin/gap"];

/// Home-relative install location, probed before the absolute candidates.
const HOME_CANDIDATE: &str = "opt/gap/gap";

/// Resolve the path to the GAP executable.
///
/// Resolution order:
/// 1. `override_path`, trusted without verification.
/// 2. The [`GAP_EXECUTABLE_ENV`] environment variable, also trusted as-is.
/// 3. A `which`-style lookup of `gap` on `PATH`.
/// 4. Conventional install locations, each checked for existence and
///    execute permission.
///
/// # Errors
///
/// Returns [`AppError::Locate`] when no step yields a path.
pub fn resolve(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }

    if let Ok(value) = env::var(GAP_EXECUTABLE_ENV) {
        if !value.is_empty() {
            return Ok(PathBuf::from(value));
        }
    }

    if let Ok(found) = which::which("gap") {
        return Ok(found);
    }

    candidate_paths()
        .into_iter()
        .find(|candidate| is_executable(candidate))
        .ok_or_else(|| {
            AppError::Locate(
                "GAP executable not found. Install GAP or set the GAP_EXECUTABLE \
                 environment variable."
                    .into(),
            )
        })
}

/// Conventional install locations, home-relative candidate first.
#[must_use]
pub fn candidate_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(CANDIDATE_PATHS.len() + 1);
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(HOME_CANDIDATE));
    }
    candidates.extend(CANDIDATE_PATHS.iter().map(PathBuf::from));
    candidates
}

/// Whether `path` is a regular file with execute permission.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        path.metadata()
            .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
    }
    #[cfg(not(unix))]
    {
        path.is_file()
    }
}
