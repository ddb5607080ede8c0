//! One full delegated-command cycle against the controller

use std::io::Read;
use std::path::Path;

use pacshim_errors::Error;
use pacshim_wire::Connection;
use tracing::debug;

use crate::sink::{relay, DEFAULT_CHUNK_SIZE};

/// Run one command through the controller listening at `controller`.
///
/// Opens a fresh connection, sends the request, streams `stdin` into
/// the hook sink the controller names, and returns the final status.
/// When `stdin` is absent the sink is still opened and immediately
/// closed, so the controller always observes a complete hook channel.
pub fn run_delegated(
    controller: &Path,
    command: &str,
    args: &[String],
    stdin: Option<&mut dyn Read>,
) -> Result<i32, Error> {
    let conn = Connection::open(controller)?;
    run_with_connection(conn, command, args, stdin)
}

/// Same as [`run_delegated`], over an already-open connection.
pub fn run_with_connection(
    conn: Connection,
    command: &str,
    args: &[String],
    stdin: Option<&mut dyn Read>,
) -> Result<i32, Error> {
    let pending = conn.send_request(command, args)?;
    let (hook_path, pending) = pending.receive_hook_channel()?;

    match stdin {
        Some(source) => relay(source, &hook_path, DEFAULT_CHUNK_SIZE)?,
        None => relay(std::io::empty(), &hook_path, DEFAULT_CHUNK_SIZE)?,
    };

    let status = pending.receive_status()?;
    debug!(command, status, "delegated command finished");
    Ok(status)
}
