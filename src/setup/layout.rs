// src/setup/layout.rs

use std::path::{Path, PathBuf};

/// Name of the virtual environment directory under the install path.
pub const VENV_DIR_NAME: &str = "mineru-venv";
/// Marker written once the bootstrap sequence has completed.
pub const SETUP_MARKER_FILE_NAME: &str = ".mineru-setup-complete";
/// Working-output directory the service writes into.
pub const OUTPUT_DIR_NAME: &str = "output";
/// Executable of the supervised service inside the virtual environment.
pub const SERVICE_EXECUTABLE: &str = "mineru-api";

/// On-disk layout below an install path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn venv_dir(&self) -> PathBuf {
        self.root.join(VENV_DIR_NAME)
    }

    pub fn marker_file(&self) -> PathBuf {
        self.root.join(SETUP_MARKER_FILE_NAME)
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join(OUTPUT_DIR_NAME)
    }

    /// Path of an executable installed into the virtual environment:
    /// `bin/<name>` on Unix, `Scripts\<name>.exe` on Windows.
    pub fn venv_executable(&self, name: &str) -> PathBuf {
        if cfg!(windows) {
            self.venv_dir().join("Scripts").join(format!("{name}.exe"))
        } else {
            self.venv_dir().join("bin").join(name)
        }
    }

    pub fn service_executable(&self) -> PathBuf {
        self.venv_executable(SERVICE_EXECUTABLE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted_at_install_path() {
        let layout = InstallLayout::new("/opt/mineru");
        assert_eq!(layout.venv_dir(), PathBuf::from("/opt/mineru/mineru-venv"));
        assert_eq!(
            layout.marker_file(),
            PathBuf::from("/opt/mineru/.mineru-setup-complete")
        );
        assert_eq!(layout.output_dir(), PathBuf::from("/opt/mineru/output"));
    }

    #[cfg(unix)]
    #[test]
    fn venv_executables_live_in_bin_on_unix() {
        let layout = InstallLayout::new("/opt/mineru");
        assert_eq!(
            layout.service_executable(),
            PathBuf::from("/opt/mineru/mineru-venv/bin/mineru-api")
        );
        assert_eq!(
            layout.venv_executable("python"),
            PathBuf::from("/opt/mineru/mineru-venv/bin/python")
        );
    }
}
