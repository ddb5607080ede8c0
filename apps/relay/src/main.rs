//! pacshim-relay - one delegated command per invocation
//!
//! Launched by the interposition layer for every intercepted
//! privileged command. Performs a single request/response cycle
//! against the controller, streaming its own stdin into the hook
//! channel, and exits with the controller-reported status. Local
//! failures are logged to a fixed location and exit 1: the parent
//! only ever sees an exit status.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::error;

/// Fixed diagnostic location; stdout/stderr belong to the library's
/// hook machinery in the parent.
const LOG_PATH: &str = "/tmp/pacshim-relay.log";

#[derive(Parser)]
#[command(name = "pacshim-relay")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Forward one privileged command to the pacshim controller")]
struct Cli {
    /// Controller socket endpoint
    controller: PathBuf,

    /// Command to execute on the controller side
    command: String,

    /// Arguments for the command, in original order
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if let Ok(file) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(LOG_PATH)
    {
        tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::sink)
            .with_env_filter("off")
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    // the parent hands us a piped hook body or /dev/null; either way
    // stdin EOF marks the end of the stream
    let mut stdin = std::io::stdin().lock();

    match pacshim_rpc::run_delegated(&cli.controller, &cli.command, &cli.args, Some(&mut stdin)) {
        Ok(status) => process::exit(status),
        Err(e) => {
            error!(command = %cli.command, error = %e, "relay cycle failed");
            process::exit(1);
        }
    }
}
