use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use mineru_host::errors::HostError;
use mineru_host::fs::mock::MockFileSystem;
use mineru_host::fs::{FileSystem, RealFileSystem};
use mineru_host::setup::{Bootstrapper, InstallLayout, PythonBootstrapper, SetupGate};
use mineru_host_test_utils::fakes::ScriptedRunner;
use mineru_host_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

const INSTALL: &str = "/opt/mineru";

/// Runner whose venv step creates the venv directory, like the real one.
fn venv_creating_runner(fs: &MockFileSystem) -> ScriptedRunner {
    let fs = fs.clone();
    ScriptedRunner::new().on_run(move |spec| {
        if spec.args.iter().any(|a| a == "venv") {
            fs.add_dir(InstallLayout::new(&spec.work_dir).venv_dir());
        }
        0
    })
}

#[tokio::test]
async fn successful_setup_writes_timestamped_marker() -> TestResult {
    init_tracing();
    let fs = MockFileSystem::new();
    let runner = Arc::new(venv_creating_runner(&fs));
    let bootstrapper = PythonBootstrapper::new(runner.clone(), Arc::new(fs.clone()), "python3");

    with_timeout(bootstrapper.bootstrap(Path::new(INSTALL))).await?;

    let layout = InstallLayout::new(INSTALL);
    let stamp = fs.read_to_string(&layout.marker_file())?;
    chrono::DateTime::parse_from_rfc3339(stamp.trim())?;

    assert!(SetupGate::new(Arc::new(fs.clone())).is_ready(Path::new(INSTALL)));
    assert_eq!(runner.recorded().len(), 4);
    Ok(())
}

#[tokio::test]
async fn steps_run_in_order_inside_install_path() -> TestResult {
    let fs = MockFileSystem::new();
    let runner = Arc::new(ScriptedRunner::new());
    let bootstrapper = PythonBootstrapper::new(runner.clone(), Arc::new(fs.clone()), "python3");

    with_timeout(bootstrapper.bootstrap(Path::new(INSTALL))).await?;

    let layout = InstallLayout::new(INSTALL);
    let recorded = runner.recorded();
    let programs: Vec<_> = recorded.iter().map(|s| s.program.clone()).collect();
    assert_eq!(
        programs,
        vec![
            Path::new("python3").to_path_buf(),
            layout.venv_executable("python"),
            layout.venv_executable("pip"),
            layout.venv_executable("uv"),
        ]
    );

    assert_eq!(recorded[0].args, ["-m", "venv", "mineru-venv"]);
    assert_eq!(recorded[1].args, ["-m", "pip", "install", "--upgrade", "pip"]);
    assert_eq!(recorded[2].args, ["install", "uv"]);
    assert_eq!(
        recorded[3].args,
        vec![
            "pip".to_string(),
            "install".into(),
            "-U".into(),
            "mineru[core]".into(),
            "--python".into(),
            layout.venv_executable("python").display().to_string(),
        ]
    );
    assert!(recorded.iter().all(|s| s.work_dir == Path::new(INSTALL)));
    Ok(())
}

#[tokio::test]
async fn failing_step_stops_sequence_and_leaves_no_marker() {
    for failing in 1..=4 {
        let fs = MockFileSystem::new();
        let runner = Arc::new(ScriptedRunner::new().failing_at(failing, 2));
        let bootstrapper =
            PythonBootstrapper::new(runner.clone(), Arc::new(fs.clone()), "python3");

        let err = with_timeout(bootstrapper.bootstrap(Path::new(INSTALL)))
            .await
            .expect_err("setup should fail");

        match err {
            HostError::SetupStep { exit_code, .. } => assert_eq!(exit_code, 2),
            other => panic!("unexpected error for step {failing}: {other:?}"),
        }
        assert_eq!(runner.recorded().len(), failing, "no step after the failing one");
        assert!(!fs.exists(&InstallLayout::new(INSTALL).marker_file()));
        assert!(!SetupGate::new(Arc::new(fs.clone())).is_ready(Path::new(INSTALL)));
    }
}

#[tokio::test]
async fn launch_error_of_a_step_propagates() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let runner = Arc::new(mineru_host::exec::RealProcessRunner::new());
    let bootstrapper =
        PythonBootstrapper::new(runner, Arc::clone(&fs), "/nonexistent/bin/python-missing");

    let err = with_timeout(bootstrapper.bootstrap(tmp.path()))
        .await
        .expect_err("missing interpreter must fail");

    assert!(matches!(err, HostError::Launch { .. }), "got {err:?}");
    assert!(!fs.exists(&InstallLayout::new(tmp.path()).marker_file()));
}

#[tokio::test]
async fn install_path_is_created_before_the_first_step() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let install = tmp.path().join("nested").join("install");
    let runner = Arc::new(ScriptedRunner::new());
    let bootstrapper = PythonBootstrapper::new(runner, Arc::new(RealFileSystem), "python3");

    with_timeout(bootstrapper.bootstrap(&install)).await?;

    assert!(install.is_dir());
    assert!(InstallLayout::new(&install).marker_file().is_file());
    Ok(())
}

#[tokio::test]
async fn unwritable_marker_is_a_setup_failure() -> TestResult {
    let tmp = tempfile::tempdir()?;
    // A directory where the marker file should go makes the write fail.
    std::fs::create_dir_all(InstallLayout::new(tmp.path()).marker_file())?;
    let bootstrapper =
        PythonBootstrapper::new(Arc::new(ScriptedRunner::new()), Arc::new(RealFileSystem), "python3");

    let err = with_timeout(bootstrapper.bootstrap(tmp.path()))
        .await
        .expect_err("marker write should fail");

    assert!(matches!(err, HostError::Marker { .. }), "got {err:?}");
    assert!(err.is_session_failure());
    Ok(())
}

#[tokio::test]
async fn uncreatable_install_path_is_a_setup_failure() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let blocker = tmp.path().join("blocker");
    std::fs::write(&blocker, "not a directory")?;
    let runner = Arc::new(ScriptedRunner::new());
    let bootstrapper = PythonBootstrapper::new(runner.clone(), Arc::new(RealFileSystem), "python3");

    let err = with_timeout(bootstrapper.bootstrap(&blocker.join("install")))
        .await
        .expect_err("install path below a file cannot be created");

    assert!(matches!(err, HostError::SetupIo { .. }), "got {err:?}");
    assert!(err.is_session_failure());
    assert!(runner.recorded().is_empty(), "no step runs without an install dir");
    Ok(())
}
