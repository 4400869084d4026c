// src/config/mod.rs

//! Configuration for a supervisory session.
//!
//! Responsibilities:
//! - Define the optional TOML file model and the resolved `LaunchConfig`
//!   (`model.rs`).
//! - Merge CLI flags, the config file and defaults (`loader.rs`).
//! - Validate the merged values (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_from_path, resolve, resolve_with};
pub use model::{cadence_from_minutes, ConfigFile, LaunchConfig, RawLaunchConfig};
