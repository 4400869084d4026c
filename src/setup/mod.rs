// src/setup/mod.rs

//! Environment setup: where things live on disk, whether setup already
//! happened, and how to perform it.

pub mod bootstrap;
pub mod gate;
pub mod layout;

pub use bootstrap::{BootstrapStep, Bootstrapper, PythonBootstrapper};
pub use gate::SetupGate;
pub use layout::InstallLayout;
