// src/exec/handle.rs

//! Owned handle to a started child process.

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::errors::Result;

/// A running child started by [`super::ProcessRunner::start`].
///
/// The handle is the only way to observe or stop the child. Dropping it
/// kills the child and everything it spawned if still alive.
#[derive(Debug)]
pub struct ProcessHandle {
    label: String,
    child: Child,
    /// Root of the process tree to take down: the process group id on Unix
    /// (the child leads its own group), the child's pid on Windows.
    tree_root: Option<u32>,
    drains: Vec<JoinHandle<()>>,
}

impl ProcessHandle {
    pub(crate) fn new(
        label: String,
        child: Child,
        kill_tree: bool,
        drains: Vec<JoinHandle<()>>,
    ) -> Self {
        let tree_root = if kill_tree { child.id() } else { None };
        Self {
            label,
            child,
            tree_root,
            drains,
        }
    }

    /// OS process id, or `None` once the child has been reaped.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Wait for the child to exit and return its exit code (`-1` when it
    /// was ended by a signal).
    ///
    /// Cancel safe: dropping the future leaves the child running.
    pub async fn wait(&mut self) -> Result<i32> {
        let status = self.child.wait().await?;
        Ok(exit_code_of(status))
    }

    /// Ask the child (and its process group) to stop, then wait up to
    /// `grace` for it to exit.
    ///
    /// Returns `true` if the child exited within the grace period. If it did
    /// not, it is force-killed and `false` is returned without waiting any
    /// longer.
    pub async fn terminate(&mut self, grace: Duration) -> bool {
        if let Ok(Some(status)) = self.child.try_wait() {
            debug!(
                process = %self.label,
                exit_code = exit_code_of(status),
                "process already exited before termination request"
            );
            self.kill_stragglers();
            return true;
        }

        self.request_stop();

        let exited = match tokio::time::timeout(grace, self.child.wait()).await {
            Ok(Ok(status)) => {
                info!(
                    process = %self.label,
                    exit_code = exit_code_of(status),
                    "process stopped"
                );
                true
            }
            Ok(Err(e)) => {
                warn!(process = %self.label, error = %e, "failed waiting for process to stop");
                false
            }
            Err(_) => {
                warn!(
                    process = %self.label,
                    grace_ms = grace.as_millis() as u64,
                    "process did not exit within grace timeout; forcing kill"
                );
                if let Err(e) = self.child.start_kill() {
                    warn!(process = %self.label, error = %e, "failed to force kill process");
                }
                false
            }
        };

        self.kill_stragglers();
        exited
    }

    /// Wait for the output drains to finish forwarding buffered lines.
    pub async fn flush_output(&mut self) {
        for drain in self.drains.drain(..) {
            let _ = drain.await;
        }
    }

    #[cfg(unix)]
    fn request_stop(&mut self) {
        use nix::sys::signal::Signal;

        match self.tree_root {
            Some(pgid) => signal_group(pgid, Signal::SIGTERM, &self.label),
            None => {
                if let Err(e) = self.child.start_kill() {
                    warn!(process = %self.label, error = %e, "failed to kill process");
                }
            }
        }
    }

    /// Console processes have no SIGTERM equivalent on Windows, so the whole
    /// tree is killed right away while the root can still be resolved.
    #[cfg(windows)]
    fn request_stop(&mut self) {
        self.kill_stragglers();
        if let Err(e) = self.child.start_kill() {
            debug!(process = %self.label, error = %e, "process already gone after tree kill");
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn request_stop(&mut self) {
        if let Err(e) = self.child.start_kill() {
            warn!(process = %self.label, error = %e, "failed to kill process");
        }
    }

    /// Kill whatever is left of the child's process group.
    #[cfg(unix)]
    fn kill_stragglers(&mut self) {
        if let Some(pgid) = self.tree_root.take() {
            signal_group(pgid, nix::sys::signal::Signal::SIGKILL, &self.label);
        }
    }

    /// Kill whatever is left of the child's process tree.
    #[cfg(windows)]
    fn kill_stragglers(&mut self) {
        if let Some(pid) = self.tree_root.take() {
            kill_tree(pid, &self.label);
        }
    }

    #[cfg(not(any(unix, windows)))]
    fn kill_stragglers(&mut self) {}
}

impl Drop for ProcessHandle {
    fn drop(&mut self) {
        // kill_on_drop covers the child itself; the group may hold more.
        if matches!(self.child.try_wait(), Ok(None)) {
            debug!(process = %self.label, "dropping handle of running process");
        }
        self.kill_stragglers();
    }
}

#[cfg(unix)]
fn signal_group(pgid: u32, signal: nix::sys::signal::Signal, label: &str) {
    use nix::errno::Errno;
    use nix::sys::signal::killpg;
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pgid as i32), signal) {
        Ok(()) => debug!(process = %label, pgid, ?signal, "signalled process group"),
        Err(Errno::ESRCH) => debug!(process = %label, pgid, "process group already gone"),
        Err(e) => warn!(process = %label, pgid, ?signal, error = %e, "failed to signal process group"),
    }
}

/// Arguments for `taskkill` that force-kill `pid` and all its descendants.
#[cfg(windows)]
fn taskkill_args(pid: u32) -> [String; 4] {
    ["/PID".to_string(), pid.to_string(), "/T".to_string(), "/F".to_string()]
}

/// Runs synchronously since it is also used from `Drop`.
#[cfg(windows)]
fn kill_tree(pid: u32, label: &str) {
    use std::process::{Command, Stdio};

    let status = Command::new("taskkill")
        .args(taskkill_args(pid))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match status {
        Ok(s) if s.success() => debug!(process = %label, pid, "killed process tree"),
        // taskkill exits non-zero when the process is already gone.
        Ok(s) => debug!(process = %label, pid, exit_code = ?s.code(), "taskkill found nothing to kill"),
        Err(e) => warn!(process = %label, pid, error = %e, "failed to run taskkill"),
    }
}

pub(crate) fn exit_code_of(status: ExitStatus) -> i32 {
    status.code().unwrap_or(-1)
}

#[cfg(all(test, windows))]
mod tests {
    use super::*;

    #[test]
    fn taskkill_targets_the_whole_tree_forcefully() {
        assert_eq!(taskkill_args(4242), ["/PID", "4242", "/T", "/F"]);
    }
}
