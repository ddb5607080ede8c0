//! Wire-protocol error types

use thiserror::Error;

/// Failure to reach the controller endpoint
#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("controller endpoint {endpoint} is unreachable: {message}")]
    Unreachable { endpoint: String, message: String },
}

/// Malformed or truncated traffic on an established connection
#[derive(Debug, Clone, Error)]
pub enum ProtocolError {
    #[error("invalid frame length line: {line:?}")]
    InvalidLength { line: String },

    #[error("channel closed after {got} of {expected} payload bytes")]
    Truncated { expected: usize, got: usize },

    #[error("channel closed mid-frame")]
    UnexpectedEof,

    #[error("frame payload is not a valid {expected}: {message}")]
    Decode {
        expected: &'static str,
        message: String,
    },

    #[error("channel i/o failed: {message}")]
    Io { message: String },
}
