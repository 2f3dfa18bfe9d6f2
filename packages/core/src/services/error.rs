//! Service Layer Error Types
//!
//! Errors raised by the background workers and their configuration. Tree
//! mutations report through [`OutlineError`](crate::tree::OutlineError).

use thiserror::Error;

/// Persistence failures surfaced by the sync worker
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Every attempt in the retry budget failed
    ///
    /// The batch ids are back in the dirty set by the time this is returned.
    #[error("Push failed after {attempts} attempts: {last_error}")]
    Exhausted { attempts: u32, last_error: String },

    /// The worker task is no longer running
    #[error("Sync worker has stopped")]
    WorkerStopped,
}

impl PersistenceError {
    pub fn exhausted(attempts: u32, last_error: impl Into<String>) -> Self {
        Self::Exhausted {
            attempts,
            last_error: last_error.into(),
        }
    }
}

/// Invalid [`OutlineConfig`](crate::services::OutlineConfig)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
