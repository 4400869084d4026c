// src/engine/mod.rs

//! Supervision engine.
//!
//! A supervisory session walks through
//! `Idle → SettingUp → Launching → Running → {GracefulShutdown | Crashed} → Terminated`.
//!
//! The pure state machine lives in [`core`]; the async/IO shell that runs
//! the bootstrap, launches the service, races its exit against cancellation
//! and tears everything down is implemented in [`supervisor`].

/// Where a supervisory session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    SettingUp,
    Launching,
    Running,
    GracefulShutdown,
    Crashed { exit_code: i32 },
    Terminated(Termination),
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Cancellation was requested while the service was running.
    Cancelled,
    Fatal(FatalCause),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatalCause {
    SetupFailed,
    LaunchFailed,
    /// The service exited on its own. Any exit code counts, including 0:
    /// the service is expected to run until it is told to stop.
    UnexpectedExit { exit_code: i32 },
}

/// Results reported by the IO shell back into the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    SetupChecked { ready: bool },
    SetupSucceeded,
    SetupFailed,
    Launched,
    LaunchFailed,
    ChildExited { exit_code: i32 },
    CancelRequested,
    ShutdownComplete,
}

/// Successful outcome of a session.
///
/// Fatal outcomes are reported as [`crate::errors::HostError`]s instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The session was cancelled and the service asked to stop.
    /// `child_exited` is false when it had to be force-killed after the
    /// grace timeout.
    Cancelled { child_exited: bool },
}

pub mod core;
pub mod supervisor;

pub use self::core::{CoreStep, SessionCommand, SessionCore};
pub use supervisor::{ProcessSupervisor, DEFAULT_GRACE_TIMEOUT};
