// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8200;
pub const DEFAULT_CLEANUP_INTERVAL_MINUTES: i64 = 5;
pub const DEFAULT_PYTHON: &str = "python";
pub const DEFAULT_GRACE_TIMEOUT_SECS: u64 = 5;
/// Longest accepted cleanup interval (one year).
pub const MAX_CLEANUP_INTERVAL_MINUTES: i64 = 365 * 24 * 60;

/// Optional configuration file, e.g. `mineru-host.toml`:
///
/// ```toml
/// host = "127.0.0.1"
/// port = 9000
/// install_path = "/opt/mineru"
/// cleanup_interval_minutes = 10
/// python = "python3.11"
/// grace_timeout_secs = 5
/// ```
///
/// Every key is optional; command-line flags override the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub install_path: Option<PathBuf>,
    pub cleanup_interval_minutes: Option<i64>,
    pub python: Option<String>,
    pub grace_timeout_secs: Option<u64>,
}

/// Merged (CLI > file > defaults) but not yet validated launch settings.
///
/// Turned into a [`LaunchConfig`] through `TryFrom`, which performs the
/// validation (see `validate.rs`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLaunchConfig {
    pub host: String,
    pub port: u16,
    pub install_path: PathBuf,
    pub cleanup_interval_minutes: i64,
    pub python: String,
    pub grace_timeout_secs: u64,
}

/// Immutable settings for one supervisory session.
///
/// Constructed once at startup and only read afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Host the MinerU API binds to.
    pub host: String,
    /// Port the MinerU API binds to.
    pub port: u16,
    /// Directory holding the virtual environment, setup marker and output.
    pub install_path: PathBuf,
    /// Interval between output purges; `None` disables cleanup.
    pub cleanup_cadence: Option<Duration>,
    /// Interpreter used to create the virtual environment.
    pub python: String,
    /// How long to wait for the service to exit after asking it to stop.
    pub grace_timeout: Duration,
}

impl LaunchConfig {
    /// Build a config with defaults for everything except the bind address
    /// and install path.
    pub fn new(host: impl Into<String>, port: u16, install_path: impl Into<PathBuf>) -> Self {
        Self {
            host: host.into(),
            port,
            install_path: install_path.into(),
            cleanup_cadence: cadence_from_minutes(DEFAULT_CLEANUP_INTERVAL_MINUTES),
            python: DEFAULT_PYTHON.to_string(),
            grace_timeout: Duration::from_secs(DEFAULT_GRACE_TIMEOUT_SECS),
        }
    }

    /// Arguments passed to `mineru-api` to bind it to the configured address.
    pub fn service_args(&self) -> Vec<String> {
        vec![
            "--host".to_string(),
            self.host.clone(),
            "--port".to_string(),
            self.port.to_string(),
        ]
    }
}

/// Map a cleanup interval in minutes to a cadence. Zero or negative
/// intervals disable cleanup; the result saturates instead of overflowing.
pub fn cadence_from_minutes(minutes: i64) -> Option<Duration> {
    if minutes <= 0 {
        None
    } else {
        Some(Duration::from_secs((minutes as u64).saturating_mul(60)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cadence_is_disabled_for_non_positive_minutes() {
        assert_eq!(cadence_from_minutes(0), None);
        assert_eq!(cadence_from_minutes(-5), None);
        assert_eq!(cadence_from_minutes(2), Some(Duration::from_secs(120)));
    }

    #[test]
    fn huge_interval_saturates_instead_of_overflowing() {
        assert_eq!(
            cadence_from_minutes(i64::MAX),
            Some(Duration::from_secs(u64::MAX))
        );
    }

    #[test]
    fn service_args_reflect_bind_address() {
        let cfg = LaunchConfig::new("127.0.0.1", 9000, "/opt/mineru");
        assert_eq!(cfg.service_args(), vec!["--host", "127.0.0.1", "--port", "9000"]);
    }

    #[test]
    fn config_file_rejects_unknown_keys() {
        let err = toml::from_str::<ConfigFile>("hots = \"x\"").unwrap_err();
        assert!(err.to_string().contains("hots"));
    }
}
