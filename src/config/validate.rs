// src/config/validate.rs

use std::time::Duration;

use crate::config::model::{
    cadence_from_minutes, LaunchConfig, RawLaunchConfig, MAX_CLEANUP_INTERVAL_MINUTES,
};
use crate::errors::{HostError, Result};

impl TryFrom<RawLaunchConfig> for LaunchConfig {
    type Error = HostError;

    fn try_from(raw: RawLaunchConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(LaunchConfig {
            host: raw.host.trim().to_string(),
            port: raw.port,
            install_path: raw.install_path,
            cleanup_cadence: cadence_from_minutes(raw.cleanup_interval_minutes),
            python: raw.python,
            grace_timeout: Duration::from_secs(raw.grace_timeout_secs),
        })
    }
}

fn validate_raw_config(cfg: &RawLaunchConfig) -> Result<()> {
    validate_bind_address(cfg)?;
    validate_install_path(cfg)?;
    validate_runtime(cfg)?;
    Ok(())
}

fn validate_bind_address(cfg: &RawLaunchConfig) -> Result<()> {
    if cfg.host.trim().is_empty() {
        return Err(HostError::ConfigError("host must not be empty".to_string()));
    }
    if cfg.port == 0 {
        return Err(HostError::ConfigError(
            "port must be between 1 and 65535 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_install_path(cfg: &RawLaunchConfig) -> Result<()> {
    if cfg.install_path.as_os_str().is_empty() {
        return Err(HostError::ConfigError(
            "install path must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_runtime(cfg: &RawLaunchConfig) -> Result<()> {
    if cfg.python.trim().is_empty() {
        return Err(HostError::ConfigError(
            "python interpreter must not be empty".to_string(),
        ));
    }
    if cfg.grace_timeout_secs == 0 {
        return Err(HostError::ConfigError(
            "grace_timeout_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    if cfg.cleanup_interval_minutes > MAX_CLEANUP_INTERVAL_MINUTES {
        return Err(HostError::ConfigError(format!(
            "cleanup interval must be at most {MAX_CLEANUP_INTERVAL_MINUTES} minutes (got {})",
            cfg.cleanup_interval_minutes
        )));
    }
    Ok(())
}
