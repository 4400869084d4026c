// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::CliArgs;
use crate::config::model::{
    ConfigFile, LaunchConfig, RawLaunchConfig, DEFAULT_CLEANUP_INTERVAL_MINUTES,
    DEFAULT_GRACE_TIMEOUT_SECS, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_PYTHON,
};
use crate::errors::Result;

/// Load a configuration file from a given path.
///
/// This only performs TOML deserialization; merging and validation happen
/// in [`resolve`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: ConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Resolve the launch configuration for this session.
///
/// - Reads the `--config` file when one was given.
/// - Applies precedence: CLI flag > config file > built-in default.
/// - Validates the result (see `validate.rs`).
pub fn resolve(args: &CliArgs) -> Result<LaunchConfig> {
    let file = match args.config {
        Some(ref path) => load_from_path(path)?,
        None => ConfigFile::default(),
    };
    resolve_with(args, file, default_install_path())
}

/// Merge CLI arguments over an already-loaded file, falling back to the
/// given install path when neither names one.
pub fn resolve_with(
    args: &CliArgs,
    file: ConfigFile,
    fallback_install_path: PathBuf,
) -> Result<LaunchConfig> {
    let raw = RawLaunchConfig {
        host: args
            .host
            .clone()
            .or(file.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
        port: args.port.or(file.port).unwrap_or(DEFAULT_PORT),
        install_path: args
            .install_path
            .clone()
            .or(file.install_path)
            .unwrap_or(fallback_install_path),
        cleanup_interval_minutes: args
            .cleanup_interval
            .or(file.cleanup_interval_minutes)
            .unwrap_or(DEFAULT_CLEANUP_INTERVAL_MINUTES),
        python: args
            .python
            .clone()
            .or(file.python)
            .unwrap_or_else(|| DEFAULT_PYTHON.to_string()),
        grace_timeout_secs: file
            .grace_timeout_secs
            .unwrap_or(DEFAULT_GRACE_TIMEOUT_SECS),
    };

    LaunchConfig::try_from(raw)
}

/// Default install path: the directory containing the running executable,
/// or the current directory if that cannot be determined.
pub fn default_install_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}
