// src/cleanup/mod.rs

//! Periodic purge of the service's working-output directory.
//!
//! - [`cleaner`] performs one best-effort sweep.
//! - [`scheduler`] repeats sweeps on a fixed cadence for the lifetime of a
//!   supervisory session.

pub mod cleaner;
pub mod scheduler;

pub use cleaner::{CleanupReport, OutputCleaner};
pub use scheduler::CleanupScheduler;
