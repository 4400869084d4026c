// src/setup/gate.rs

use std::path::Path;
use std::sync::Arc;

use crate::fs::FileSystem;

use super::layout::InstallLayout;

/// Answers "has the bootstrap already completed for this install path?".
///
/// Setup counts as complete only when both the virtual environment
/// directory and the marker file exist. Pure read; never mutates anything.
#[derive(Debug, Clone)]
pub struct SetupGate {
    fs: Arc<dyn FileSystem>,
}

impl SetupGate {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    pub fn is_ready(&self, install_path: &Path) -> bool {
        let layout = InstallLayout::new(install_path);
        self.fs.is_dir(&layout.venv_dir()) && self.fs.is_file(&layout.marker_file())
    }

    /// Timestamp recorded in the marker file, if setup is complete.
    pub fn completed_at(&self, install_path: &Path) -> Option<String> {
        if !self.is_ready(install_path) {
            return None;
        }
        let marker = InstallLayout::new(install_path).marker_file();
        self.fs
            .read_to_string(&marker)
            .ok()
            .map(|s| s.trim().to_string())
    }
}
