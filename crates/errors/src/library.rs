//! Package-transaction library error types

use thiserror::Error;

/// A package-library operation returned its failure indicator
///
/// The message is the library's own diagnostic text, taken from its
/// last-error accessor at the moment the operation failed.
#[derive(Debug, Clone, Error)]
pub enum LibraryError {
    #[error("{operation} failed: {message}")]
    Operation {
        operation: &'static str,
        message: String,
    },
}

impl LibraryError {
    /// Wrap a library diagnostic for a named operation
    pub fn operation(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Operation {
            operation,
            message: message.into(),
        }
    }
}
