//! Relay-process and hook-sink error types

use thiserror::Error;

/// The hook channel path could not be opened for writing
#[derive(Debug, Error)]
pub enum SinkOpenError {
    #[error("cannot open hook sink {path} for writing: {message}")]
    Open { path: String, message: String },
}

/// The relay executable could not be started or supervised
#[derive(Debug, Error)]
pub enum RelayLaunchError {
    #[error("failed to spawn relay executable {path}: {message}")]
    Spawn { path: String, message: String },

    #[error("relay process stdin was not piped")]
    StdinUnavailable,

    #[error("failed to wait for relay process: {message}")]
    Wait { message: String },

    #[error("interposition state was not established before first use")]
    StateUnset,
}
