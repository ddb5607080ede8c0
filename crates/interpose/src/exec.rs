//! Delegating implementation of the privileged operations

use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};

use pacshim_errors::{Error, RelayLaunchError};
use tracing::{debug, error, warn};

use crate::state::InterpositionState;
use crate::PrivilegedOps;

/// Runs every intercepted command through the relay executable named
/// by the process-wide [`InterpositionState`].
pub struct RelayOps;

impl RelayOps {
    /// Spawn the relay against an explicit state and wait for it.
    ///
    /// The relay's exit status is the controller-reported command
    /// status; a relay killed by a signal counts as failure.
    fn delegate(
        state: &InterpositionState,
        command: &str,
        args: &[String],
        stdin: Option<&mut dyn Read>,
    ) -> Result<i32, Error> {
        let mut relay = Command::new(&state.relay_path);
        relay
            .arg(&state.controller_socket)
            .arg(command)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            });

        let mut child = relay.spawn().map_err(|e| RelayLaunchError::Spawn {
            path: state.relay_path.display().to_string(),
            message: e.to_string(),
        })?;

        if let Some(source) = stdin {
            let mut child_stdin = child
                .stdin
                .take()
                .ok_or(RelayLaunchError::StdinUnavailable)?;
            // a relay that exits early closes the pipe; its exit
            // status is still authoritative
            if let Err(e) = std::io::copy(source, &mut child_stdin) {
                warn!(command, error = %e, "hook stdin pipe closed early");
            }
        }

        let status = child.wait().map_err(|e| RelayLaunchError::Wait {
            message: e.to_string(),
        })?;

        Ok(status.code().unwrap_or(1))
    }
}

impl PrivilegedOps for RelayOps {
    fn chroot(&self, new_root: &Path) -> i32 {
        debug!(new_root = %new_root.display(), "chroot intercepted, not performed");
        0
    }

    fn run_privileged_command(
        &self,
        command: &str,
        args: &[String],
        stdin: Option<&mut dyn Read>,
    ) -> i32 {
        let Some(state) = InterpositionState::current() else {
            error!(command, "interposition state not established");
            return 1;
        };

        match Self::delegate(state, command, args, stdin) {
            Ok(status) => status,
            Err(e) => {
                error!(command, error = %e, "delegated command failed locally");
                1
            }
        }
    }
}
