// src/setup/bootstrap.rs

//! One-time environment bootstrap.
//!
//! The sequence is ordered and not resumable: it stops at the first failing
//! step and only writes the setup marker after every step succeeded. A
//! half-finished install therefore looks exactly like a fresh one and the
//! next session re-runs everything.

use std::path::Path;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use tracing::info;

use crate::exec::{BoxFuture, CommandSpec, ProcessRunner};
use crate::errors::{HostError, Result};
use crate::fs::FileSystem;

use super::layout::{InstallLayout, VENV_DIR_NAME};

/// Package spec installed into the virtual environment.
pub const MINERU_PACKAGE: &str = "mineru[core]";

/// Prepares the runtime environment under an install path.
pub trait Bootstrapper: Send + Sync {
    fn bootstrap<'a>(&'a self, install_path: &'a Path) -> BoxFuture<'a, Result<()>>;
}

/// One command of the bootstrap sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapStep {
    pub name: &'static str,
    pub command: CommandSpec,
}

/// Bootstrapper that creates a Python venv and installs MinerU into it.
pub struct PythonBootstrapper {
    runner: Arc<dyn ProcessRunner>,
    fs: Arc<dyn FileSystem>,
    python: String,
}

impl PythonBootstrapper {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        fs: Arc<dyn FileSystem>,
        python: impl Into<String>,
    ) -> Self {
        Self {
            runner,
            fs,
            python: python.into(),
        }
    }

    /// The command sequence, in execution order.
    pub fn steps(&self, install_path: &Path) -> Vec<BootstrapStep> {
        let layout = InstallLayout::new(install_path);
        let venv_python = layout.venv_executable("python");

        vec![
            BootstrapStep {
                name: "create virtual environment",
                command: CommandSpec::new(&self.python, install_path)
                    .args(["-m", "venv", VENV_DIR_NAME]),
            },
            BootstrapStep {
                name: "upgrade pip",
                command: CommandSpec::new(&venv_python, install_path)
                    .args(["-m", "pip", "install", "--upgrade", "pip"]),
            },
            BootstrapStep {
                name: "install uv",
                command: CommandSpec::new(layout.venv_executable("pip"), install_path)
                    .args(["install", "uv"]),
            },
            BootstrapStep {
                name: "install mineru",
                command: CommandSpec::new(layout.venv_executable("uv"), install_path)
                    .args(["pip", "install", "-U", MINERU_PACKAGE, "--python"])
                    .arg(venv_python.display().to_string()),
            },
        ]
    }

    async fn run_steps(&self, install_path: &Path) -> Result<()> {
        self.fs
            .create_dir_all(install_path)
            .map_err(|source| HostError::SetupIo {
                path: install_path.to_path_buf(),
                source,
            })?;

        for step in self.steps(install_path) {
            info!(step = step.name, "running setup step");
            let exit_code = self.runner.run_to_completion(&step.command).await?;
            if exit_code != 0 {
                return Err(HostError::SetupStep {
                    step: step.name.to_string(),
                    exit_code,
                });
            }
        }

        self.write_marker(install_path)
    }

    fn write_marker(&self, install_path: &Path) -> Result<()> {
        let marker = InstallLayout::new(install_path).marker_file();
        let stamp = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
        self.fs
            .write(&marker, stamp.as_bytes())
            .map_err(|source| HostError::Marker {
                path: marker.clone(),
                source,
            })?;
        info!(marker = %marker.display(), "created setup marker");
        Ok(())
    }
}

impl Bootstrapper for PythonBootstrapper {
    fn bootstrap<'a>(&'a self, install_path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            info!(install_path = %install_path.display(), "starting MinerU setup");
            self.run_steps(install_path).await?;
            info!("MinerU setup completed successfully");
            Ok(())
        })
    }
}
