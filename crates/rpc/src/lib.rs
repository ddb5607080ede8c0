#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Client side of one delegated-command cycle
//!
//! Composes the wire protocol with the stdin relay: send the command,
//! learn the hook sink path, stream the hook body into it, then read
//! the controller's exit status. Each cycle uses its own connection;
//! there is no reuse and no pipelining.

mod client;
mod sink;

pub use client::{run_delegated, run_with_connection};
pub use sink::{relay, DEFAULT_CHUNK_SIZE};
