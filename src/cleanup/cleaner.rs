// src/cleanup/cleaner.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::fs::FileSystem;
use crate::setup::InstallLayout;

/// Counts from one cleanup sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub removed: usize,
    pub failed: usize,
}

/// Purges the contents of `<install>/output`, keeping the directory.
///
/// Best-effort: every failed delete is logged and skipped. The service may
/// be writing into the tree at the same time; entries created mid-sweep may
/// or may not be removed.
#[derive(Debug, Clone)]
pub struct OutputCleaner {
    fs: Arc<dyn FileSystem>,
}

impl OutputCleaner {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    pub fn clean(&self, install_path: &Path) -> CleanupReport {
        let output_dir = InstallLayout::new(install_path).output_dir();

        if !self.fs.is_dir(&output_dir) {
            debug!(dir = %output_dir.display(), "output directory does not exist; skipping cleanup");
            return CleanupReport::default();
        }

        info!(dir = %output_dir.display(), "cleaning up output directory");

        let entries = match self.fs.read_dir(&output_dir) {
            Ok(entries) => entries,
            Err(e) => {
                error!(dir = %output_dir.display(), error = %e, "error during output directory cleanup");
                return CleanupReport::default();
            }
        };

        let (dirs, files): (Vec<PathBuf>, Vec<PathBuf>) =
            entries.into_iter().partition(|p| self.fs.is_dir(p));

        let mut report = CleanupReport::default();
        for file in &files {
            self.remove(file, false, &mut report);
        }
        for dir in &dirs {
            self.remove(dir, true, &mut report);
        }

        info!(
            removed = report.removed,
            failed = report.failed,
            "output directory cleanup completed"
        );
        report
    }

    fn remove(&self, path: &Path, is_dir: bool, report: &mut CleanupReport) {
        let result = if is_dir {
            self.fs.remove_dir_all(path)
        } else {
            self.fs.remove_file(path)
        };

        match result {
            Ok(()) => {
                report.removed += 1;
                debug!(path = %path.display(), "deleted");
            }
            Err(e) => {
                report.failed += 1;
                warn!(path = %path.display(), error = %e, "failed to delete");
            }
        }
    }
}
