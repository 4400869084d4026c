// src/cleanup/scheduler.rs

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::cleaner::OutputCleaner;

/// Periodic output purge running alongside the supervised service.
///
/// The first sweep happens one cadence after `start`. Sweeps run on the
/// blocking pool so a slow filesystem never stalls the supervisor. The task
/// stops on [`CleanupScheduler::shutdown`] or when the scheduler is dropped.
#[derive(Debug)]
pub struct CleanupScheduler {
    cadence: Duration,
    task: JoinHandle<()>,
}

impl CleanupScheduler {
    /// Start the periodic purge. A zero cadence creates nothing.
    pub fn start(
        cadence: Duration,
        cleaner: Arc<OutputCleaner>,
        install_path: PathBuf,
    ) -> Option<Self> {
        if cadence.is_zero() {
            debug!("cleanup cadence is zero; not starting scheduler");
            return None;
        }

        let Some(first_sweep) = Instant::now().checked_add(cadence) else {
            warn!(cadence_secs = cadence.as_secs(), "cleanup cadence out of range; not starting scheduler");
            return None;
        };

        info!(cadence_secs = cadence.as_secs(), "starting output cleanup timer");

        let task = tokio::spawn(async move {
            let mut ticker = interval_at(first_sweep, cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let cleaner = Arc::clone(&cleaner);
                let path = install_path.clone();
                let sweep = tokio::task::spawn_blocking(move || cleaner.clean(&path));
                if let Err(e) = sweep.await {
                    warn!(error = %e, "output cleanup sweep panicked");
                }
            }
        });

        Some(Self { cadence, task })
    }

    pub fn cadence(&self) -> Duration {
        self.cadence
    }

    /// Stop the timer and wait for the task to wind down.
    ///
    /// A sweep already running on the blocking pool finishes on its own; no
    /// further sweeps are started.
    pub async fn shutdown(mut self) {
        self.task.abort();
        // `Drop` aborts again, which is a no-op on a finished task.
        let _ = (&mut self.task).await;
        debug!("output cleanup timer stopped");
    }
}

impl Drop for CleanupScheduler {
    fn drop(&mut self) {
        self.task.abort();
    }
}
