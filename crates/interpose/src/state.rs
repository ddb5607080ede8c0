//! Process-wide interposition configuration
//!
//! Established once, read-only thereafter. The host process supplies
//! the relay executable path and the controller endpoint through
//! launch arguments or environment variables; intercepted calls fail
//! fast when neither route has populated the state.

use std::path::PathBuf;
use std::sync::OnceLock;

use pacshim_errors::Error;

static STATE: OnceLock<InterpositionState> = OnceLock::new();

/// Relay executable path and controller endpoint, fixed for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct InterpositionState {
    pub relay_path: PathBuf,
    pub controller_socket: PathBuf,
}

impl InterpositionState {
    /// Environment variable naming the relay executable.
    pub const RELAY_PATH_ENV: &'static str = "PACSHIM_RELAY_PATH";

    /// Environment variable naming the controller's socket endpoint.
    pub const CONTROLLER_SOCKET_ENV: &'static str = "PACSHIM_CONTROLLER_SOCKET";

    pub fn new(relay_path: PathBuf, controller_socket: PathBuf) -> Self {
        Self {
            relay_path,
            controller_socket,
        }
    }

    /// Read both values from the environment; `None` unless both are
    /// present.
    fn from_env() -> Option<Self> {
        let relay_path = std::env::var_os(Self::RELAY_PATH_ENV)?;
        let controller_socket = std::env::var_os(Self::CONTROLLER_SOCKET_ENV)?;
        Some(Self::new(
            PathBuf::from(relay_path),
            PathBuf::from(controller_socket),
        ))
    }

    /// Fix this state for the process lifetime. Fails if state was
    /// already established.
    pub fn establish(self) -> Result<(), Error> {
        STATE
            .set(self)
            .map_err(|_| Error::internal("interposition state already established"))
    }

    /// The established state, falling back to the environment on
    /// first use. `None` means no configuration route supplied it.
    pub fn current() -> Option<&'static InterpositionState> {
        if let Some(state) = STATE.get() {
            return Some(state);
        }
        let state = Self::from_env()?;
        // a concurrent winner is equivalent: both derive from fixed inputs
        let _ = STATE.set(state);
        STATE.get()
    }
}
