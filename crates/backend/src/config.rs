//! Backend Configuration
//!
//! Connection and lifecycle settings for the supervised backend server.
//! Persisted as JSON in the per-user config directory; missing files are
//! replaced with defaults so a fresh install starts without any setup.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BackendError, BackendResult};

/// Default local address the backend binds to.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Default port for the uvicorn server.
pub const DEFAULT_PORT: u16 = 8000;
/// Interval between readiness probes, in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
/// Probe attempts before giving up (30 x 2s, roughly a one minute budget).
pub const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 30;

/// Configuration for locating, provisioning, and probing the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Directory containing the backend application and its venv
    pub backend_dir: PathBuf,
    /// Host the server binds to
    pub host: String,
    /// Port the server binds to
    pub port: u16,
    /// Milliseconds between readiness probes
    pub poll_interval_ms: u64,
    /// Maximum number of readiness probes before declaring failure
    pub max_poll_attempts: u32,
    /// Dependency manifest file name, relative to `backend_dir`
    pub requirements_file: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            backend_dir: PathBuf::from("career-app"),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            max_poll_attempts: DEFAULT_MAX_POLL_ATTEMPTS,
            requirements_file: "requirements.txt".to_string(),
        }
    }
}

impl BackendConfig {
    /// Base URL of the backend server
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }

    /// URL of the readiness probe endpoint
    pub fn probe_url(&self) -> String {
        format!("{}/", self.base_url())
    }

    /// URL of the streaming query endpoint
    pub fn query_url(&self) -> String {
        format!("{}/query", self.base_url())
    }

    /// Path of the virtual environment inside the backend directory
    pub fn venv_dir(&self) -> PathBuf {
        self.backend_dir.join("venv")
    }

    /// Path of the venv Python interpreter for the current platform
    pub fn python_path(&self) -> PathBuf {
        if cfg!(windows) {
            self.venv_dir().join("Scripts").join("python.exe")
        } else {
            self.venv_dir().join("bin").join("python")
        }
    }

    /// Path of the marker file written after a successful dependency install
    pub fn marker_path(&self) -> PathBuf {
        self.venv_dir().join(".provisioned")
    }

    /// Path of the dependency manifest
    pub fn manifest_path(&self) -> PathBuf {
        self.backend_dir.join(&self.requirements_file)
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.port == 0 {
            return Err("port must be non-zero".to_string());
        }
        if self.poll_interval_ms == 0 {
            return Err("poll_interval_ms must be non-zero".to_string());
        }
        if self.max_poll_attempts == 0 {
            return Err("max_poll_attempts must be non-zero".to_string());
        }
        if self.requirements_file.trim().is_empty() {
            return Err("requirements_file must not be empty".to_string());
        }
        Ok(())
    }

    /// Load configuration from a file
    pub fn load_from_file(path: &Path) -> BackendResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate().map_err(BackendError::config)?;
        Ok(config)
    }

    /// Save configuration to a file with pretty formatting
    pub fn save_to_file(&self, path: &Path) -> BackendResult<()> {
        self.validate().map_err(BackendError::config)?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load an existing config file or create one with defaults
    pub fn load_or_init(path: &Path) -> BackendResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            let config = Self::default();
            config.save_to_file(path)?;
            Ok(config)
        }
    }
}
