//! Test doubles for the process runner, bootstrapper and output sink.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use mineru_host::errors::{HostError, Result};
use mineru_host::exec::{
    BoxFuture, CommandSpec, OutputSink, OutputStream, ProcessHandle, ProcessRunner,
    RealProcessRunner,
};
use mineru_host::fs::FileSystem;
use mineru_host::setup::Bootstrapper;

type OnRun = dyn Fn(&CommandSpec) -> i32 + Send + Sync;

/// Runner that never spawns anything for `run_to_completion`.
///
/// Every command is recorded. The exit code comes from the `on_run`
/// callback (0 by default), which may also fake side effects such as
/// creating the venv directory. `start` either fails like a missing
/// executable or hands off to a real runner.
pub struct ScriptedRunner {
    recorded: Mutex<Vec<CommandSpec>>,
    started: Mutex<Vec<CommandSpec>>,
    on_run: Box<OnRun>,
    start_delegate: Option<RealProcessRunner>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self {
            recorded: Mutex::new(Vec::new()),
            started: Mutex::new(Vec::new()),
            on_run: Box::new(|_| 0),
            start_delegate: None,
        }
    }

    pub fn on_run<F>(mut self, f: F) -> Self
    where
        F: Fn(&CommandSpec) -> i32 + Send + Sync + 'static,
    {
        self.on_run = Box::new(f);
        self
    }

    /// Fail the command whose (1-based) position in the run order is `n`.
    pub fn failing_at(self, n: usize, exit_code: i32) -> Self {
        let counter = AtomicUsize::new(0);
        self.on_run(move |_| {
            let idx = counter.fetch_add(1, Ordering::SeqCst) + 1;
            if idx == n { exit_code } else { 0 }
        })
    }

    /// Really start processes passed to `start`.
    pub fn starting_real_processes(mut self) -> Self {
        self.start_delegate = Some(RealProcessRunner::new());
        self
    }

    pub fn recorded(&self) -> Vec<CommandSpec> {
        self.recorded.lock().unwrap().clone()
    }

    pub fn started(&self) -> Vec<CommandSpec> {
        self.started.lock().unwrap().clone()
    }
}

impl Default for ScriptedRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for ScriptedRunner {
    fn run_to_completion<'a>(&'a self, spec: &'a CommandSpec) -> BoxFuture<'a, Result<i32>> {
        Box::pin(async move {
            self.recorded.lock().unwrap().push(spec.clone());
            Ok((self.on_run)(spec))
        })
    }

    fn start(&self, spec: &CommandSpec) -> Result<ProcessHandle> {
        self.started.lock().unwrap().push(spec.clone());
        match &self.start_delegate {
            Some(real) => real.start(spec),
            None => Err(HostError::Launch {
                program: spec.program.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "scripted: not found"),
            }),
        }
    }
}

/// Bootstrapper that counts calls and fakes a successful install by
/// creating the venv directory and marker.
pub struct RecordingBootstrapper {
    fs: Arc<dyn FileSystem>,
    calls: AtomicUsize,
    fail_with: Option<i32>,
    paths: Mutex<Vec<PathBuf>>,
}

impl RecordingBootstrapper {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            calls: AtomicUsize::new(0),
            fail_with: None,
            paths: Mutex::new(Vec::new()),
        }
    }

    /// Report a failed setup step with this exit code.
    pub fn failing(mut self, exit_code: i32) -> Self {
        self.fail_with = Some(exit_code);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.paths.lock().unwrap().clone()
    }
}

impl Bootstrapper for RecordingBootstrapper {
    fn bootstrap<'a>(&'a self, install_path: &'a Path) -> BoxFuture<'a, Result<()>> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.paths.lock().unwrap().push(install_path.to_path_buf());

            if let Some(exit_code) = self.fail_with {
                return Err(HostError::SetupStep {
                    step: "install mineru".to_string(),
                    exit_code,
                });
            }

            crate::builders::mark_setup_complete(self.fs.as_ref(), install_path);
            Ok(())
        })
    }
}

/// Sink that keeps every forwarded line.
#[derive(Default)]
pub struct CollectingSink {
    lines: Mutex<Vec<(String, OutputStream, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(String, OutputStream, String)> {
        self.lines.lock().unwrap().clone()
    }

    pub fn lines_on(&self, stream: OutputStream) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|(_, s, _)| *s == stream)
            .map(|(_, _, line)| line)
            .collect()
    }
}

impl OutputSink for CollectingSink {
    fn line(&self, label: &str, stream: OutputStream, line: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((label.to_string(), stream, line.to_string()));
    }
}
