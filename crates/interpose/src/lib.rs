#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Interposition layer for the package-transaction library
//!
//! The library expects two privileged operations: changing the
//! process root and running a command inside it. This crate replaces
//! both with a capability vtable the host process registers once at
//! start: chroot becomes a no-op, and command execution is delegated
//! to a separate relay executable that talks to the trusted
//! controller. The installer process itself never gains the ability
//! to reinterpret its root filesystem.

mod exec;
mod state;

use std::io::Read;
use std::path::Path;
use std::sync::OnceLock;

use pacshim_errors::Error;

pub use exec::RelayOps;
pub use state::InterpositionState;

/// Capability interface the package library observes instead of the
/// real system operations.
///
/// Implementations must never panic across this boundary: the
/// library is not prepared to unwind through its own call stack, so
/// every local failure folds into a non-zero status.
pub trait PrivilegedOps {
    /// Replacement for the library's root change. Always succeeds and
    /// changes nothing; the controller applies the real root on its
    /// side of the trust boundary.
    fn chroot(&self, new_root: &Path) -> i32;

    /// Replacement for "run this command in the chroot, feed it this
    /// stdin, return its exit status". `stdin` may be absent; the
    /// hook channel is then opened and immediately closed.
    fn run_privileged_command(
        &self,
        command: &str,
        args: &[String],
        stdin: Option<&mut dyn Read>,
    ) -> i32;
}

static OPS: OnceLock<Box<dyn PrivilegedOps + Send + Sync>> = OnceLock::new();

/// Register the process-wide capability vtable. Call once at process
/// start, before the library can reach any intercepted entry point.
pub fn register(ops: Box<dyn PrivilegedOps + Send + Sync>) -> Result<(), Error> {
    OPS.set(ops)
        .map_err(|_| Error::internal("privileged ops already registered"))
}

/// The registered vtable, if any.
pub fn registered() -> Option<&'static (dyn PrivilegedOps + Send + Sync)> {
    OPS.get().map(AsRef::as_ref)
}
