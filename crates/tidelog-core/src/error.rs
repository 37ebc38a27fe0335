//! Error types for Tidelog

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for Tidelog operations
#[derive(Error, Debug)]
pub enum LogError {
    /// Configuration source missing, unreadable or holding out-of-range values
    #[error("Configuration error: {0}")]
    Config(String),

    /// Lifecycle operation not valid in the current state
    #[error("Invalid state: {0}")]
    State(String),

    /// A log file could not be opened, written or closed
    #[error("IO error on {}: {source}", .path.display())]
    FileIo {
        /// File or directory the operation targeted
        path: PathBuf,
        /// The underlying error
        source: std::io::Error,
    },

    /// General I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The writer thread has terminated
    #[error("Logger has been shut down")]
    ShutDown,
}

impl LogError {
    pub(crate) fn already_started() -> Self {
        LogError::State("Logger is already started".to_string())
    }

    pub(crate) fn already_stopped() -> Self {
        LogError::State("Logger is already stopped".to_string())
    }

    /// True for start/stop misuse.
    pub fn is_state(&self) -> bool {
        matches!(self, LogError::State(_))
    }

    /// True for configuration problems.
    pub fn is_config(&self) -> bool {
        matches!(self, LogError::Config(_))
    }
}

/// Result type alias using LogError
pub type LogResult<T> = Result<T, LogError>;
