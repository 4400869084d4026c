// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running native processes, using
//! `tokio::process::Command`, and forwarding their output to the logs.
//!
//! - [`backend`] provides the `ProcessRunner` trait and the concrete
//!   `RealProcessRunner`; tests can replace it with a scripted runner.
//! - [`handle`] owns a started child: wait, terminate with a grace period,
//!   kill on drop.
//! - [`output`] drains stdout/stderr line by line into an `OutputSink`.

pub mod backend;
pub mod handle;
pub mod output;

pub use backend::{BoxFuture, CommandSpec, ProcessRunner, RealProcessRunner};
pub use handle::ProcessHandle;
pub use output::{OutputSink, OutputStream, TracingSink};
