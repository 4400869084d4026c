// src/engine/supervisor.rs

use std::collections::VecDeque;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tracing::{error, info, warn};

use crate::cleanup::{CleanupScheduler, OutputCleaner};
use crate::config::LaunchConfig;
use crate::errors::{HostError, Result};
use crate::exec::{CommandSpec, ProcessHandle, ProcessRunner, RealProcessRunner};
use crate::fs::{FileSystem, RealFileSystem};
use crate::setup::{Bootstrapper, InstallLayout, PythonBootstrapper, SetupGate};

use super::core::{SessionCommand, SessionCore};
use super::{FatalCause, SessionEvent, SessionOutcome, Termination};

/// Default time the service gets to exit after being asked to stop.
pub const DEFAULT_GRACE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for forwarding the last buffered output lines on release.
const OUTPUT_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Log tag for lines forwarded from the service.
const SERVICE_LABEL: &str = "MinerU";

/// Program and leading arguments used instead of the installed
/// `mineru-api` executable.
#[derive(Debug, Clone)]
struct ServiceOverride {
    program: PathBuf,
    args: Vec<String>,
}

/// Runs one supervisory session: bootstrap if needed, launch the service,
/// keep the output directory purged, and stop everything on cancellation.
///
/// This is the async IO shell around [`SessionCore`], which decides every
/// transition. The shell owns the session's resources (process handle and
/// cleanup task) and releases them on every path out of [`run`].
///
/// [`run`]: ProcessSupervisor::run
pub struct ProcessSupervisor {
    config: LaunchConfig,
    gate: SetupGate,
    bootstrapper: Arc<dyn Bootstrapper>,
    runner: Arc<dyn ProcessRunner>,
    cleaner: Arc<OutputCleaner>,
    service_override: Option<ServiceOverride>,
}

/// Resources acquired during a session.
///
/// Both fields release themselves on drop, so an early return still kills
/// the service and stops the cleanup timer.
#[derive(Default)]
struct SessionResources {
    child: Option<ProcessHandle>,
    cleanup: Option<CleanupScheduler>,
    child_exited: bool,
}

impl SessionResources {
    async fn release(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            cleanup.shutdown().await;
        }
        if let Some(mut child) = self.child.take() {
            if tokio::time::timeout(OUTPUT_FLUSH_TIMEOUT, child.flush_output())
                .await
                .is_err()
            {
                warn!(process = %child.label(), "output still open after release; dropping it");
            }
        }
    }
}

impl ProcessSupervisor {
    pub fn new(
        config: LaunchConfig,
        fs: Arc<dyn FileSystem>,
        runner: Arc<dyn ProcessRunner>,
        bootstrapper: Arc<dyn Bootstrapper>,
    ) -> Self {
        Self {
            config,
            gate: SetupGate::new(Arc::clone(&fs)),
            bootstrapper,
            runner,
            cleaner: Arc::new(OutputCleaner::new(fs)),
            service_override: None,
        }
    }

    /// Production wiring: real filesystem, real processes, Python bootstrap.
    pub fn from_config(config: LaunchConfig) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let runner: Arc<dyn ProcessRunner> = Arc::new(RealProcessRunner::new());
        let bootstrapper = Arc::new(PythonBootstrapper::new(
            Arc::clone(&runner),
            Arc::clone(&fs),
            config.python.clone(),
        ));
        Self::new(config, fs, runner, bootstrapper)
    }

    /// Launch `program args... --host <host> --port <port>` instead of the
    /// installed `mineru-api`.
    pub fn with_service_command<I, S>(mut self, program: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.service_override = Some(ServiceOverride {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// The command used to start the supervised service.
    pub fn service_command(&self) -> CommandSpec {
        let (program, prefix) = match &self.service_override {
            Some(o) => (o.program.clone(), o.args.clone()),
            None => (
                InstallLayout::new(&self.config.install_path).service_executable(),
                Vec::new(),
            ),
        };

        CommandSpec::new(program, &self.config.install_path)
            .args(prefix)
            .args(self.config.service_args())
            .label(SERVICE_LABEL)
    }

    /// Run the session until the service exits or `cancel` resolves.
    ///
    /// - `Ok(SessionOutcome::Cancelled { .. })` when `cancel` won the race.
    /// - `Err(..)` for setup failure, launch failure, or any exit of the
    ///   service while no cancellation was requested (exit code 0
    ///   included).
    ///
    /// `cancel` is only polled while the service is running; resolving it
    /// earlier takes effect once the service has started.
    pub async fn run<C>(&self, cancel: C) -> Result<SessionOutcome>
    where
        C: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        self.log_startup();

        let install_path = self.config.install_path.as_path();
        let mut core = SessionCore::new();
        let mut resources = SessionResources::default();
        let mut failure: Option<HostError> = None;

        let ready = self.gate.is_ready(install_path);
        if ready {
            info!("setup already complete; skipping setup");
        } else {
            info!("setup not complete; running setup");
        }

        let mut pending: VecDeque<SessionCommand> =
            core.step(SessionEvent::SetupChecked { ready }).commands.into();

        while let Some(command) = pending.pop_front() {
            let event = match command {
                SessionCommand::Bootstrap => match self.bootstrapper.bootstrap(install_path).await {
                    Ok(()) => SessionEvent::SetupSucceeded,
                    Err(e) => {
                        error!(error = %e, "setup failed");
                        failure = Some(e);
                        SessionEvent::SetupFailed
                    }
                },
                SessionCommand::Launch => {
                    info!("starting MinerU API");
                    match self.runner.start(&self.service_command()) {
                        Ok(handle) => {
                            resources.child = Some(handle);
                            SessionEvent::Launched
                        }
                        Err(e) => {
                            error!(error = %e, "failed to start MinerU API");
                            failure = Some(e);
                            SessionEvent::LaunchFailed
                        }
                    }
                }
                SessionCommand::StartCleanup => {
                    resources.cleanup = self.start_cleanup();
                    continue;
                }
                SessionCommand::AwaitExitOrCancel => {
                    let Some(child) = resources.child.as_mut() else {
                        return Err(anyhow!("no running process to supervise").into());
                    };

                    tokio::select! {
                        exit = child.wait() => {
                            let exit_code = exit.unwrap_or_else(|e| {
                                warn!(error = %e, "failed to observe process exit");
                                -1
                            });
                            warn!(exit_code, "MinerU API process exited");
                            SessionEvent::ChildExited { exit_code }
                        }
                        () = cancel.as_mut() => {
                            info!("shutdown requested; stopping MinerU API");
                            SessionEvent::CancelRequested
                        }
                    }
                }
                SessionCommand::TerminateChild => {
                    resources.child_exited = match resources.child.as_mut() {
                        Some(child) => child.terminate(self.config.grace_timeout).await,
                        None => true,
                    };
                    SessionEvent::ShutdownComplete
                }
                SessionCommand::Release => {
                    resources.release().await;
                    continue;
                }
                SessionCommand::Finish(termination) => {
                    return finish(termination, failure.take(), resources.child_exited);
                }
            };

            pending.extend(core.step(event).commands);
        }

        Err(anyhow!(
            "supervisory session stopped in state {:?} without terminating",
            core.state()
        )
        .into())
    }

    fn start_cleanup(&self) -> Option<CleanupScheduler> {
        match self.config.cleanup_cadence {
            Some(cadence) => CleanupScheduler::start(
                cadence,
                Arc::clone(&self.cleaner),
                self.config.install_path.clone(),
            ),
            None => {
                info!("output cleanup disabled");
                None
            }
        }
    }

    fn log_startup(&self) {
        info!(
            install_path = %self.config.install_path.display(),
            host = %self.config.host,
            port = self.config.port,
            cleanup_interval_secs = self.config.cleanup_cadence.map(|c| c.as_secs()),
            "MinerU host starting"
        );
    }
}

fn finish(
    termination: Termination,
    failure: Option<HostError>,
    child_exited: bool,
) -> Result<SessionOutcome> {
    match termination {
        Termination::Cancelled => {
            if child_exited {
                info!("MinerU API stopped");
            } else {
                warn!("MinerU API was force-killed after the grace timeout");
            }
            Ok(SessionOutcome::Cancelled { child_exited })
        }
        Termination::Fatal(FatalCause::UnexpectedExit { exit_code }) => {
            Err(HostError::UnexpectedExit { exit_code })
        }
        Termination::Fatal(cause) => Err(failure
            .unwrap_or_else(|| HostError::Other(anyhow!("session failed: {cause:?}")))),
    }
}
