//! Error types for Onkyo core.

use thiserror::Error;

/// Rejection of a user-supplied value before it becomes a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Frequency not valid: {0}")]
    Frequency(String),

    #[error("Volume not an integer: {0}")]
    VolumeNotInteger(String),

    #[error("Volume out of range: {0}")]
    VolumeOutOfRange(i64),

    #[error("Sleep time not an integer: {0}")]
    SleepNotInteger(String),

    #[error("Sleep time out of range: {0}")]
    SleepOutOfRange(i64),

    #[error("Input not valid: {0}")]
    Input(String),

    #[error("Listening mode not valid: {0}")]
    Mode(String),
}

/// Result type alias for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;
