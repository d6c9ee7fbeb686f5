//! Error types for learnstreak

use thiserror::Error;

/// Error type for operations surfaced to embedding applications
#[derive(Debug, Error)]
pub enum StreakError {
    #[error("Goal topic cannot be empty")]
    EmptyTopic,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StreakError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, StreakError>;
