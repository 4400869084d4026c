// src/exec/output.rs

//! Continuous draining of child process output.
//!
//! Each stream gets its own Tokio task that forwards lines to an
//! [`OutputSink`] as they arrive, so a chatty child can never block on a
//! full pipe. Lines are decoded lossily; invalid UTF-8 must not stop the
//! drain.

use std::fmt;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Child;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Which pipe a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputStream::Stdout => f.write_str("stdout"),
            OutputStream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Destination for forwarded child output.
pub trait OutputSink: Send + Sync {
    /// Called once per non-empty line, in arrival order for each stream.
    fn line(&self, label: &str, stream: OutputStream, line: &str);
}

/// Default sink: stdout lines at `info`, stderr lines at `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl OutputSink for TracingSink {
    fn line(&self, label: &str, stream: OutputStream, line: &str) {
        match stream {
            OutputStream::Stdout => info!(process = %label, stream = %stream, "{line}"),
            OutputStream::Stderr => warn!(process = %label, stream = %stream, "{line}"),
        }
    }
}

/// Take the child's stdout/stderr pipes and start draining both.
///
/// Returns the drain tasks; they finish once the corresponding pipe hits
/// EOF (normally when the child exits).
pub fn drain_child_output(
    child: &mut Child,
    label: &str,
    sink: Arc<dyn OutputSink>,
) -> Vec<JoinHandle<()>> {
    let mut drains = Vec::with_capacity(2);
    if let Some(stdout) = child.stdout.take() {
        drains.push(spawn_drain(
            stdout,
            label.to_string(),
            OutputStream::Stdout,
            Arc::clone(&sink),
        ));
    }
    if let Some(stderr) = child.stderr.take() {
        drains.push(spawn_drain(
            stderr,
            label.to_string(),
            OutputStream::Stderr,
            sink,
        ));
    }
    drains
}

fn spawn_drain<R>(
    reader: R,
    label: String,
    stream: OutputStream,
    sink: Arc<dyn OutputSink>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    let line = text.trim_end_matches(['\n', '\r']);
                    if !line.is_empty() {
                        sink.line(&label, stream, line);
                    }
                }
                Err(e) => {
                    debug!(process = %label, stream = %stream, error = %e, "output drain stopped");
                    break;
                }
            }
        }

        debug!(process = %label, stream = %stream, "output drain ended");
    })
}
