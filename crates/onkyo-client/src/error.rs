//! Client error types.

use thiserror::Error;

use crate::codec::MAX_LINE_LENGTH;

/// Connection-level client error.
///
/// None of these reach a setter's caller; they are logged and answered by
/// tearing the connection down and reconnecting. Only [`ClientError::Daemon`]
/// is returned from the event handler, and only under
/// [`ErrorPolicy::Disconnect`](crate::ErrorPolicy::Disconnect).
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No addresses found for {0}")]
    NoAddress(String),

    #[error("Framing error: {0}")]
    Framing(#[from] FramingError),

    #[error("Invalid hello message: '{0}'")]
    Handshake(String),

    #[error("Timed out waiting for hello message")]
    HandshakeTimeout,

    #[error("Daemon error: {0}")]
    Daemon(String),
}

/// Error splitting the byte stream into lines.
#[derive(Debug, Error)]
pub enum FramingError {
    #[error("Connection lost mid-line ({0} bytes without newline)")]
    Truncated(usize),

    #[error("Line longer than {} bytes", MAX_LINE_LENGTH)]
    LineTooLong,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single inbound line that could not be applied.
///
/// These never affect the connection; the line is logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("Unrecognized response: {0}")]
    UnknownCategory(String),

    #[error("Unrecognized field: {0}")]
    UnknownField(String),

    #[error("Missing value: {0}")]
    MissingValue(String),

    #[error("Invalid integer for {field}: {value}")]
    InvalidInteger { field: &'static str, value: String },
}

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
