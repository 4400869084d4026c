// src/engine/core.rs

//! Pure core session state machine.
//!
//! `SessionCore` consumes [`SessionEvent`]s and produces:
//! - an updated session state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::supervisor::ProcessSupervisor`) is responsible
//! for running the bootstrap, starting the process, racing its exit against
//! cancellation and releasing resources.
//!
//! The core has no channels, no Tokio types, and performs no IO, so the
//! transition rules can be unit tested in isolation.

use tracing::{debug, warn};

use super::{FatalCause, SessionEvent, SessionState, Termination};

/// Command produced by the core, to be executed by the IO shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Run the environment bootstrap.
    Bootstrap,
    /// Start the supervised process.
    Launch,
    /// Start the periodic output cleanup (if a cadence is configured).
    StartCleanup,
    /// Wait for whichever comes first: process exit or cancellation.
    AwaitExitOrCancel,
    /// Ask the process to stop, bounded by the grace timeout.
    TerminateChild,
    /// Stop the cleanup task and dispose of the process handle.
    Release,
    /// End the session.
    Finish(Termination),
}

/// Decision returned by the core after handling a single `SessionEvent`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<SessionCommand>,
}

impl CoreStep {
    fn none() -> Self {
        Self::default()
    }

    fn of(commands: impl Into<Vec<SessionCommand>>) -> Self {
        Self {
            commands: commands.into(),
        }
    }
}

#[derive(Debug)]
pub struct SessionCore {
    state: SessionState,
    history: Vec<SessionState>,
}

impl Default for SessionCore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCore {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
            history: vec![SessionState::Idle],
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Every state visited so far, starting with `Idle`.
    pub fn history(&self) -> &[SessionState] {
        &self.history
    }

    pub fn is_terminated(&self) -> bool {
        matches!(self.state, SessionState::Terminated(_))
    }

    /// Handle a single event, updating state and returning the commands for
    /// the IO shell. Events that do not apply to the current state are
    /// ignored; in particular, once the exit-vs-cancel race is decided the
    /// losing signal has no effect.
    pub fn step(&mut self, event: SessionEvent) -> CoreStep {
        use SessionEvent as E;
        use SessionState as S;

        match (self.state, event) {
            (S::Idle, E::SetupChecked { ready: false }) => {
                self.enter(S::SettingUp);
                CoreStep::of([SessionCommand::Bootstrap])
            }
            (S::Idle, E::SetupChecked { ready: true }) => {
                debug!("setup already complete; skipping bootstrap");
                self.enter(S::Launching);
                CoreStep::of([SessionCommand::Launch])
            }
            (S::SettingUp, E::SetupSucceeded) => {
                self.enter(S::Launching);
                CoreStep::of([SessionCommand::Launch])
            }
            (S::SettingUp, E::SetupFailed) => self.fatal(FatalCause::SetupFailed),
            (S::Launching, E::Launched) => {
                self.enter(S::Running);
                CoreStep::of([
                    SessionCommand::StartCleanup,
                    SessionCommand::AwaitExitOrCancel,
                ])
            }
            (S::Launching, E::LaunchFailed) => self.fatal(FatalCause::LaunchFailed),
            (S::Running, E::CancelRequested) => {
                self.enter(S::GracefulShutdown);
                CoreStep::of([SessionCommand::TerminateChild])
            }
            (S::Running, E::ChildExited { exit_code }) => {
                self.enter(S::Crashed { exit_code });
                self.fatal(FatalCause::UnexpectedExit { exit_code })
            }
            (S::GracefulShutdown, E::ShutdownComplete) => {
                let termination = Termination::Cancelled;
                self.enter(S::Terminated(termination));
                CoreStep::of([
                    SessionCommand::Release,
                    SessionCommand::Finish(termination),
                ])
            }
            (S::Terminated(_), event) => {
                debug!(?event, "session already terminated; ignoring event");
                CoreStep::none()
            }
            (state, event) => {
                warn!(?state, ?event, "event does not apply to current session state; ignoring");
                CoreStep::none()
            }
        }
    }

    fn fatal(&mut self, cause: FatalCause) -> CoreStep {
        let termination = Termination::Fatal(cause);
        self.enter(SessionState::Terminated(termination));
        CoreStep::of([SessionCommand::Release, SessionCommand::Finish(termination)])
    }

    fn enter(&mut self, next: SessionState) {
        debug!(from = ?self.state, to = ?next, "session state transition");
        self.state = next;
        self.history.push(next);
    }
}
