// src/cli.rs

//! CLI argument parsing using `clap`.
//!
//! Every launch option is optional here so that values from a `--config`
//! file can fill the gaps; defaults are applied when the configuration is
//! resolved (see [`crate::config::loader::resolve`]).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `mineru-host`.
#[derive(Debug, Clone, Default, Parser)]
#[command(
    name = "mineru-host",
    version,
    about = "Install, run and supervise the MinerU API server.",
    after_help = "Examples:\n  mineru-host --host 127.0.0.1 --port 9000 --install-path /opt/mineru\n  mineru-host --cleanup-interval 0   # disable output cleanup"
)]
pub struct CliArgs {
    /// Host to bind the MinerU API (default: 0.0.0.0).
    #[arg(long, value_name = "HOST")]
    pub host: Option<String>,

    /// Port to bind the MinerU API (default: 8200).
    #[arg(long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Directory MinerU is installed into (default: the directory holding
    /// this executable).
    #[arg(long, value_name = "PATH")]
    pub install_path: Option<PathBuf>,

    /// Output cleanup interval in minutes (default: 5). Zero or a negative
    /// value disables cleanup.
    #[arg(long, value_name = "MINUTES", allow_negative_numbers = true)]
    pub cleanup_interval: Option<i64>,

    /// Python interpreter used to create the virtual environment
    /// (default: `python`).
    #[arg(long, value_name = "PYTHON")]
    pub python: Option<String>,

    /// Optional TOML config file. Command-line flags take precedence over
    /// values in the file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `MINERU_HOST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve and print the configuration and setup state, but don't
    /// install or launch anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
