//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! Handles ~/.career-coach/ and locating the bundled backend directory.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Environment variable overriding the backend directory location
pub const BACKEND_DIR_ENV: &str = "CAREER_COACH_BACKEND_DIR";

/// Directory name of the bundled Python backend
pub const BACKEND_DIR_NAME: &str = "career-app";

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Career Coach directory (~/.career-coach/)
pub fn career_coach_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".career-coach"))
}

/// Get the config file path (~/.career-coach/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(career_coach_dir()?.join("config.json"))
}

/// Get the application log file path (~/.career-coach/app.log)
pub fn log_path() -> AppResult<PathBuf> {
    Ok(career_coach_dir()?.join("app.log"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &PathBuf) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the Career Coach directory, creating if it doesn't exist
pub fn ensure_career_coach_dir() -> AppResult<PathBuf> {
    let path = career_coach_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}

/// Resolve the backend directory for this launch.
///
/// Resolution order: the `CAREER_COACH_BACKEND_DIR` environment variable,
/// then the configured path if it is absolute or exists relative to the
/// working directory, then a `career-app` directory next to the
/// executable, then `career-app` under the working directory. The last
/// candidate is returned even if missing so startup can report where it
/// looked.
pub fn resolve_backend_dir(configured: &Path) -> PathBuf {
    let exe_sibling = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(BACKEND_DIR_NAME)));
    resolve_backend_dir_from(
        std::env::var_os(BACKEND_DIR_ENV).map(PathBuf::from),
        configured,
        exe_sibling,
    )
}

fn resolve_backend_dir_from(
    env_override: Option<PathBuf>,
    configured: &Path,
    exe_sibling: Option<PathBuf>,
) -> PathBuf {
    if let Some(dir) = env_override {
        return dir;
    }
    if configured.is_absolute() || configured.exists() {
        return configured.to_path_buf();
    }
    if let Some(candidate) = exe_sibling {
        if candidate.exists() {
            return candidate;
        }
    }
    PathBuf::from(BACKEND_DIR_NAME)
}
