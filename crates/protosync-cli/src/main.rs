//! protosync CLI
//!
//! Synchronizes a proto API tree with the definitions generated by the build.
//! Exit status is 0 when every pass is clean or applied, and 1 when a check
//! pass finds the tree out of date or any error occurs.

mod cli;
mod commands;
mod error;
mod interactive;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use cli::Cli;
use commands::RunStatus;

/// Exit status used when the run is interrupted.
const INTERRUPTED_EXIT_CODE: i32 = 130;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    install_interrupt_handler();

    match commands::run_sync(&cli) {
        Ok(RunStatus::Success) => {}
        Ok(RunStatus::Diverged) => std::process::exit(1),
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            std::process::exit(1);
        }
    }
}

/// Log to stderr: `debug` with `--verbose`, otherwise `RUST_LOG` or `warn`.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
    tracing::debug!("Verbose mode enabled");
}

/// Remove live staging areas and exit when Ctrl-C arrives.
///
/// Destructors do not run on an interrupt, so the staging registry is purged
/// explicitly before exiting.
fn install_interrupt_handler() {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::warn!(error = %e, "Could not start interrupt handler");
            return;
        }
    };

    std::thread::spawn(move || {
        runtime.block_on(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                let removed = protosync_fs::staging::purge_registered();
                tracing::debug!(removed, "Removed staging areas after interrupt");
                eprintln!("{}", "interrupted".yellow().bold());
                std::process::exit(INTERRUPTED_EXIT_CODE);
            }
        });
    });
}
