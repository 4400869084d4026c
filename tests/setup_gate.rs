use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use mineru_host::fs::mock::MockFileSystem;
use mineru_host::fs::{FileSystem, RealFileSystem};
use mineru_host::setup::{InstallLayout, SetupGate};
use proptest::prelude::*;

type TestResult = Result<(), Box<dyn Error>>;

fn gate_over(fs: &MockFileSystem) -> SetupGate {
    SetupGate::new(Arc::new(fs.clone()))
}

#[test]
fn fresh_install_path_is_not_ready() {
    let fs = MockFileSystem::new();
    let gate = gate_over(&fs);
    assert!(!gate.is_ready(Path::new("/opt/mineru")));
    assert_eq!(gate.completed_at(Path::new("/opt/mineru")), None);
}

#[test]
fn venv_and_marker_together_mean_ready() {
    let fs = MockFileSystem::new();
    let layout = InstallLayout::new("/opt/mineru");
    fs.add_dir(layout.venv_dir());
    fs.add_file(layout.marker_file(), "2025-03-01T10:00:00.000000Z\n");

    let gate = gate_over(&fs);
    assert!(gate.is_ready(Path::new("/opt/mineru")));
    assert_eq!(
        gate.completed_at(Path::new("/opt/mineru")).as_deref(),
        Some("2025-03-01T10:00:00.000000Z")
    );
}

#[test]
fn marker_that_is_a_directory_does_not_count() {
    let fs = MockFileSystem::new();
    let layout = InstallLayout::new("/opt/mineru");
    fs.add_dir(layout.venv_dir());
    fs.add_dir(layout.marker_file());

    assert!(!gate_over(&fs).is_ready(Path::new("/opt/mineru")));
}

#[test]
fn gate_reads_real_directories() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let layout = InstallLayout::new(tmp.path());
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let gate = SetupGate::new(Arc::clone(&fs));

    fs.create_dir_all(&layout.venv_dir())?;
    assert!(!gate.is_ready(tmp.path()), "venv alone is not enough");

    fs.write(&layout.marker_file(), b"2025-03-01T10:00:00Z")?;
    assert!(gate.is_ready(tmp.path()));
    Ok(())
}

proptest! {
    #[test]
    fn ready_exactly_when_venv_dir_and_marker_file_exist(
        venv in any::<bool>(),
        marker in any::<bool>(),
        unrelated in any::<bool>(),
    ) {
        let fs = MockFileSystem::new();
        let layout = InstallLayout::new("/srv/host");
        if venv {
            fs.add_dir(layout.venv_dir());
        }
        if marker {
            fs.add_file(layout.marker_file(), "stamp");
        }
        if unrelated {
            fs.add_file(layout.output_dir().join("result.md"), "x");
        }

        let before = fs.paths();
        let ready = gate_over(&fs).is_ready(Path::new("/srv/host"));

        prop_assert_eq!(ready, venv && marker);
        prop_assert_eq!(fs.paths(), before, "the gate must not touch the filesystem");
    }
}
