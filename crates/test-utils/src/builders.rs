#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use mineru_host::config::LaunchConfig;
use mineru_host::fs::FileSystem;
use mineru_host::setup::InstallLayout;

/// Builder for `LaunchConfig` to simplify test setup.
///
/// Defaults: `127.0.0.1:9000`, cleanup disabled, 2s grace timeout.
pub struct LaunchConfigBuilder {
    config: LaunchConfig,
}

impl LaunchConfigBuilder {
    pub fn new(install_path: impl Into<PathBuf>) -> Self {
        let mut config = LaunchConfig::new("127.0.0.1", 9000, install_path);
        config.cleanup_cadence = None;
        config.grace_timeout = Duration::from_secs(2);
        Self { config }
    }

    pub fn host(mut self, host: &str) -> Self {
        self.config.host = host.to_string();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn cleanup_every(mut self, cadence: Duration) -> Self {
        self.config.cleanup_cadence = Some(cadence);
        self
    }

    pub fn grace_timeout(mut self, grace: Duration) -> Self {
        self.config.grace_timeout = grace;
        self
    }

    pub fn build(self) -> LaunchConfig {
        self.config
    }
}

/// Create the venv directory and setup marker so the setup gate reports
/// the install as ready.
pub fn mark_setup_complete(fs: &dyn FileSystem, install_path: &Path) {
    let layout = InstallLayout::new(install_path);
    fs.create_dir_all(&layout.venv_dir())
        .expect("failed to create venv dir");
    fs.write(&layout.marker_file(), b"2024-01-01T00:00:00Z")
        .expect("failed to write setup marker");
}
