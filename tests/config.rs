use std::error::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use mineru_host::cli::CliArgs;
use mineru_host::config::{self, ConfigFile};
use mineru_host::errors::HostError;

type TestResult = Result<(), Box<dyn Error>>;

fn args(argv: &[&str]) -> CliArgs {
    CliArgs::try_parse_from(std::iter::once("mineru-host").chain(argv.iter().copied()))
        .expect("arguments should parse")
}

#[test]
fn defaults_apply_without_flags_or_file() -> TestResult {
    let cfg = config::resolve_with(&args(&[]), ConfigFile::default(), "/opt/app".into())?;

    assert_eq!(cfg.host, "0.0.0.0");
    assert_eq!(cfg.port, 8200);
    assert_eq!(cfg.install_path, PathBuf::from("/opt/app"));
    assert_eq!(cfg.cleanup_cadence, Some(Duration::from_secs(5 * 60)));
    assert_eq!(cfg.python, "python");
    assert_eq!(cfg.grace_timeout, Duration::from_secs(5));
    Ok(())
}

#[test]
fn cli_flags_override_the_file() -> TestResult {
    let file = ConfigFile {
        host: Some("10.0.0.1".into()),
        port: Some(7000),
        install_path: Some("/from/file".into()),
        cleanup_interval_minutes: Some(30),
        python: Some("python3.11".into()),
        grace_timeout_secs: Some(9),
    };
    let cli = args(&["--host", "127.0.0.1", "--port", "9000", "--cleanup-interval", "0"]);

    let cfg = config::resolve_with(&cli, file, "/fallback".into())?;

    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.install_path, PathBuf::from("/from/file"));
    assert_eq!(cfg.cleanup_cadence, None);
    assert_eq!(cfg.python, "python3.11");
    assert_eq!(cfg.grace_timeout, Duration::from_secs(9));
    Ok(())
}

#[test]
fn negative_interval_disables_cleanup() -> TestResult {
    let cfg = config::resolve_with(
        &args(&["--cleanup-interval", "-5"]),
        ConfigFile::default(),
        "/opt/app".into(),
    )?;
    assert_eq!(cfg.cleanup_cadence, None);
    Ok(())
}

#[test]
fn loads_a_toml_file_from_disk() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("mineru-host.toml");
    std::fs::write(
        &path,
        r#"
host = "192.168.1.5"
port = 8300
install_path = "/srv/mineru"
cleanup_interval_minutes = 10
"#,
    )?;

    let cli = args(&["--config", path.to_str().ok_or("non-utf8 path")?]);
    let cfg = config::resolve(&cli)?;

    assert_eq!(cfg.host, "192.168.1.5");
    assert_eq!(cfg.port, 8300);
    assert_eq!(cfg.install_path, PathBuf::from("/srv/mineru"));
    assert_eq!(cfg.cleanup_cadence, Some(Duration::from_secs(600)));
    Ok(())
}

#[test]
fn unknown_keys_are_rejected() -> TestResult {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("bad.toml");
    std::fs::write(&path, "hots = \"typo\"\n")?;

    let err = config::load_from_path(&path).expect_err("unknown key");
    assert!(matches!(err, HostError::TomlError(_)), "got {err:?}");
    Ok(())
}

#[test]
fn missing_config_file_is_an_io_error() {
    let cli = args(&["--config", "/nonexistent/mineru-host.toml"]);
    let err = config::resolve(&cli).expect_err("missing file");
    assert!(matches!(err, HostError::IoError(_)), "got {err:?}");
    assert!(!err.is_session_failure());
}

#[test]
fn zero_port_in_file_is_a_config_error() {
    let file = ConfigFile {
        port: Some(0),
        ..ConfigFile::default()
    };
    let err = config::resolve_with(&args(&[]), file, "/opt/app".into()).expect_err("port 0");
    assert!(matches!(err, HostError::ConfigError(_)), "got {err:?}");
}

#[test]
fn blank_host_is_a_config_error() {
    let err = config::resolve_with(&args(&["--host", "   "]), ConfigFile::default(), "/x".into())
        .expect_err("blank host");
    assert!(matches!(err, HostError::ConfigError(_)), "got {err:?}");
}

#[test]
fn cleanup_interval_beyond_one_year_is_a_config_error() {
    let cli = args(&["--cleanup-interval", "9223372036854775807"]);
    let err = config::resolve_with(&cli, ConfigFile::default(), "/opt/app".into())
        .expect_err("interval too large");
    assert!(matches!(err, HostError::ConfigError(_)), "got {err:?}");
}
