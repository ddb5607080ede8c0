#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Error types for the pacshim privilege-separation shim
//!
//! This crate provides fine-grained error types organized by domain:
//! wire-protocol failures, relay-process failures, and failures
//! reported by the package-transaction library itself.

use thiserror::Error;

pub mod library;
pub mod relay;
pub mod wire;

// Re-export all error types at the root
pub use library::LibraryError;
pub use relay::{RelayLaunchError, SinkOpenError};
pub use wire::{ConnectionError, ProtocolError};

/// Generic error type for cross-crate boundaries
#[derive(Debug, Error)]
pub enum Error {
    #[error("connection error: {0}")]
    Connection(#[from] ConnectionError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("sink error: {0}")]
    SinkOpen(#[from] SinkOpenError),

    #[error("relay error: {0}")]
    RelayLaunch(#[from] RelayLaunchError),

    #[error("library error: {0}")]
    Library(#[from] LibraryError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl Error {
    /// Create an internal error with a message
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
