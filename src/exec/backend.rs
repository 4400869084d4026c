// src/exec/backend.rs

//! Pluggable process runner abstraction.
//!
//! The bootstrapper and the supervisor talk to a `ProcessRunner` instead of
//! `tokio::process` directly. Tests can swap in a scripted runner that
//! records commands without spawning anything, while production code uses
//! [`RealProcessRunner`].

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;

use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::errors::{HostError, Result};

use super::handle::{exit_code_of, ProcessHandle};
use super::output::{drain_child_output, OutputSink, TracingSink};

/// Boxed future returned by the async trait methods in this crate.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A fully specified command invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub work_dir: PathBuf,
    /// Tag attached to every forwarded output line.
    pub label: String,
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let label = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());
        Self {
            program,
            args: Vec::new(),
            work_dir: work_dir.into(),
            label,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn display_program(&self) -> String {
        self.program.display().to_string()
    }
}

/// Trait abstracting how native processes are run.
pub trait ProcessRunner: Send + Sync {
    /// Run the command to completion, forwarding its output as it arrives,
    /// and return its exit code.
    fn run_to_completion<'a>(&'a self, spec: &'a CommandSpec) -> BoxFuture<'a, Result<i32>>;

    /// Start the command and return as soon as the OS reports it running.
    /// Output keeps being forwarded in the background.
    fn start(&self, spec: &CommandSpec) -> Result<ProcessHandle>;
}

/// Runner backed by `tokio::process`.
#[derive(Clone)]
pub struct RealProcessRunner {
    sink: Arc<dyn OutputSink>,
}

impl RealProcessRunner {
    pub fn new() -> Self {
        Self::with_sink(Arc::new(TracingSink))
    }

    pub fn with_sink(sink: Arc<dyn OutputSink>) -> Self {
        Self { sink }
    }

    /// Spawn with piped output and start draining it.
    ///
    /// With `own_group` the child leads a new process group on Unix, so that
    /// a later termination reaches everything it spawned.
    #[cfg_attr(not(unix), allow(unused_variables))]
    fn spawn(&self, spec: &CommandSpec, own_group: bool) -> Result<(Child, Vec<JoinHandle<()>>)> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .current_dir(&spec.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        #[cfg(unix)]
        if own_group {
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|source| HostError::Launch {
            program: spec.display_program(),
            source,
        })?;

        let drains = drain_child_output(&mut child, &spec.label, Arc::clone(&self.sink));
        Ok((child, drains))
    }
}

impl Default for RealProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for RealProcessRunner {
    fn run_to_completion<'a>(&'a self, spec: &'a CommandSpec) -> BoxFuture<'a, Result<i32>> {
        Box::pin(async move {
            info!(
                program = %spec.display_program(),
                args = ?spec.args,
                work_dir = %spec.work_dir.display(),
                "running command"
            );

            let (mut child, drains) = self.spawn(spec, false)?;
            let status = child.wait().await?;

            // Forward everything the child wrote before reporting the result.
            for drain in drains {
                let _ = drain.await;
            }

            let code = exit_code_of(status);
            debug!(program = %spec.display_program(), exit_code = code, "command finished");
            Ok(code)
        })
    }

    fn start(&self, spec: &CommandSpec) -> Result<ProcessHandle> {
        info!(
            program = %spec.display_program(),
            args = ?spec.args,
            work_dir = %spec.work_dir.display(),
            "starting process"
        );

        let (child, drains) = self.spawn(spec, true)?;
        let handle = ProcessHandle::new(spec.label.clone(), child, true, drains);

        info!(process = %spec.label, pid = ?handle.id(), "process started");
        Ok(handle)
    }
}
