//! pacshim-install - drive one package transaction without privileges
//!
//! Runs the native transaction library with the interposition layer
//! active: the library's chroot becomes a no-op and every hook script
//! it wants to execute is delegated, via the relay executable, to the
//! trusted controller. Exit 0 on a committed transaction, 1 on any
//! library failure.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use pacshim_driver::ffi::Libalpm;
use pacshim_driver::install_archive;
use pacshim_interpose::{register, InterpositionState, RelayOps};
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "pacshim-install")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Install a package archive through the pacshim controller")]
struct Cli {
    /// Relay executable spawned for every intercepted command
    relay_executable: PathBuf,

    /// Controller socket endpoint
    controller: PathBuf,

    /// Installation root the transaction operates on
    install_root: PathBuf,

    /// Package database location
    database_path: PathBuf,

    /// Install archive to load and commit
    archive_path: PathBuf,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    // fixed for the process lifetime, before the library can reach
    // any intercepted entry point
    if let Err(e) =
        InterpositionState::new(cli.relay_executable.clone(), cli.controller.clone()).establish()
    {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
    if let Err(e) = register(Box::new(RelayOps)) {
        error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }

    info!(
        archive = %cli.archive_path.display(),
        root = %cli.install_root.display(),
        "starting transaction"
    );

    match install_archive(
        &Libalpm,
        &cli.install_root,
        &cli.database_path,
        &cli.archive_path,
    ) {
        Ok(()) => {
            info!("transaction committed");
        }
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
