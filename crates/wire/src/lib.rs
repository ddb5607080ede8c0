#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Wire protocol for delegating privileged commands to the controller
//!
//! A frame is an ASCII decimal byte length, a newline, then exactly
//! that many bytes of JSON-encoded payload. A request is a command
//! frame followed by marker-prefixed argument frames; the response is
//! a hook-channel path frame and, after the hook sink has been written
//! and closed, a final status frame.
//!
//! The response ordering is enforced by construction: sending a
//! request consumes the [`Connection`] and hands back staged values
//! whose only capability is the next legal protocol step.

mod connection;
mod frame;

pub use connection::{Connection, HookPending, StatusPending};
pub use frame::{read_request, write_frame, write_request, FrameReader, CONTINUE_MARKER, STOP_MARKER};
