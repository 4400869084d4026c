// src/signals.rs

//! Cancellation sources for a supervisory session.

use std::future::Future;

use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::errors::Result;

/// Future that resolves on the first Ctrl-C or SIGTERM.
///
/// The handlers are installed immediately, not on first poll, so a signal
/// that arrives while setup is still running is not lost.
#[cfg(unix)]
pub fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(async move {
        tokio::select! {
            _ = interrupt.recv() => info!("received Ctrl-C"),
            _ = terminate.recv() => info!("received SIGTERM"),
        }
    })
}

/// Future that resolves on the first Ctrl-C.
#[cfg(not(unix))]
pub fn shutdown_signal() -> Result<impl Future<Output = ()> + Send + 'static> {
    Ok(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
        info!("received Ctrl-C");
    })
}

/// Resolve when `rx` receives a value.
///
/// A dropped sender is not a cancellation: the future then never resolves.
pub async fn cancelled_by(rx: oneshot::Receiver<()>) {
    if rx.await.is_err() {
        debug!("cancel channel closed without explicit cancellation");
        std::future::pending::<()>().await;
    }
}
