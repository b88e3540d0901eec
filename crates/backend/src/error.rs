//! Backend Error Types
//!
//! Defines the error taxonomy for backend supervision and querying. The
//! variants mirror how each failure is surfaced to the user: provisioning
//! and spawn failures are fatal (dialog + exit), a readiness timeout is a
//! degraded-but-running outcome, and stream failures never appear here at
//! all — they are absorbed into the affected message as an in-band notice.

use thiserror::Error;

/// Error type for backend lifecycle and query operations.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Runtime environment could not be created or dependencies installed
    #[error("Provisioning error: {0}")]
    Provisioning(String),

    /// Backend server process failed to launch
    #[error("Spawn error: {0}")]
    Spawn(String),

    /// Readiness probe budget exhausted without a successful response
    #[error("Backend did not start within the expected time.")]
    ReadinessTimeout { attempts: u32 },

    /// A second start was requested while a process handle is live
    #[error("Backend is already running")]
    AlreadyRunning,

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for backend errors
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// Create a provisioning error
    pub fn provisioning(msg: impl Into<String>) -> Self {
        Self::Provisioning(msg.into())
    }

    /// Create a spawn error
    pub fn spawn(msg: impl Into<String>) -> Self {
        Self::Spawn(msg.into())
    }

    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error should end the application (dialog + exit).
    ///
    /// Only provisioning and spawn failures are fatal; a readiness timeout
    /// leaves the application running in a degraded state.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Provisioning(_) | Self::Spawn(_))
    }
}

/// Convert BackendError to a string
impl From<BackendError> for String {
    fn from(err: BackendError) -> String {
        err.to_string()
    }
}
