// src/lib.rs

pub mod cleanup;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod setup;
pub mod signals;

use std::sync::Arc;

use tracing::debug;

use crate::cli::CliArgs;
use crate::config::LaunchConfig;
use crate::engine::{ProcessSupervisor, SessionOutcome};
use crate::errors::Result;
use crate::fs::{FileSystem, RealFileSystem};
use crate::setup::{InstallLayout, SetupGate};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - configuration (CLI flags, optional TOML file, defaults)
/// - Ctrl-C / SIGTERM handling
/// - the process supervisor with its production collaborators
///
/// Returns `Ok(None)` for `--dry-run`, `Ok(Some(outcome))` once a session
/// was cancelled, and an error for every fatal outcome.
pub async fn run(args: CliArgs) -> Result<Option<SessionOutcome>> {
    let config = config::resolve(&args)?;

    if args.dry_run {
        print_dry_run(&config);
        return Ok(None);
    }

    let shutdown = signals::shutdown_signal()?;
    let supervisor = ProcessSupervisor::from_config(config);
    let outcome = supervisor.run(shutdown).await?;
    Ok(Some(outcome))
}

/// Print the resolved configuration and the on-disk setup state.
fn print_dry_run(config: &LaunchConfig) {
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let gate = SetupGate::new(Arc::clone(&fs));
    let layout = InstallLayout::new(&config.install_path);
    let supervisor = ProcessSupervisor::from_config(config.clone());
    let service = supervisor.service_command();

    println!("mineru-host dry-run");
    println!("  install_path = {}", config.install_path.display());
    println!("  host = {}", config.host);
    println!("  port = {}", config.port);
    match config.cleanup_cadence {
        Some(cadence) => println!("  cleanup_interval = {} min", cadence.as_secs() / 60),
        None => println!("  cleanup_interval = disabled"),
    }
    println!("  python = {}", config.python);
    println!("  grace_timeout = {}s", config.grace_timeout.as_secs());
    println!();

    match gate.completed_at(&config.install_path) {
        Some(stamp) => println!("setup: complete (marker written {stamp})"),
        None => println!("setup: not complete; setup would run first"),
    }
    println!(
        "output dir: {} ({})",
        layout.output_dir().display(),
        if fs.exists(&layout.output_dir()) {
            "present"
        } else {
            "absent"
        }
    );
    println!(
        "service: {} {}",
        service.program.display(),
        service.args.join(" ")
    );

    debug!("dry-run complete (no execution)");
}
