use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::io::Write;

fn pvecheck() -> assert_cmd::Command {
    cargo_bin_cmd!("pvecheck").into()
}

/// Config pointing at a local port nothing listens on.
fn write_test_config(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let config_path = dir.path().join("pvecheck.toml");
    let mut f = std::fs::File::create(&config_path).unwrap();
    write!(
        f,
        r#"
[proxmox]
host = "127.0.0.1"
port = 1
timeout_secs = 2

[targets]
vmids = [201, 202]
"#
    )
    .unwrap();
    config_path
}

#[test]
fn help_works() {
    pvecheck()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Pre-flight checks"));
}

#[test]
fn missing_password_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir);

    pvecheck()
        .current_dir(dir.path())
        .env_remove("PROXMOX_PASSWORD")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no password provided"));
}

#[test]
fn unreachable_host_fails_authentication() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir);

    pvecheck()
        .current_dir(dir.path())
        .env("PROXMOX_PASSWORD", "not-a-real-password")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("1. Testing Basic Connectivity"))
        .stdout(predicate::str::contains("RESULT: Authentication Failed"))
        .stdout(predicate::str::contains("Testing Permissions").not())
        .stdout(predicate::str::contains("not-a-real-password").not());
}

#[test]
fn template_suite_starts_with_authentication() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir);

    pvecheck()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config_path)
        .arg("template")
        .arg("not-a-real-password")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Proxmox Template and VM Check"))
        .stdout(predicate::str::contains("1. Testing Authentication"))
        .stdout(predicate::str::contains("RESULT: Authentication Failed"));
}

#[test]
fn user_without_realm_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir);

    pvecheck()
        .current_dir(dir.path())
        .env("PROXMOX_PASSWORD", "x")
        .arg("--config")
        .arg(&config_path)
        .args(["--user", "root"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("validation error"));
}

#[test]
fn missing_host_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("empty.toml");
    std::fs::write(&config_path, "").unwrap();

    pvecheck()
        .current_dir(dir.path())
        .env("PROXMOX_PASSWORD", "x")
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("host"));
}

#[test]
fn missing_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();

    pvecheck()
        .current_dir(dir.path())
        .arg("--config")
        .arg(dir.path().join("nope.toml"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}

#[test]
fn malformed_config_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("pvecheck.toml");
    std::fs::write(&config_path, "[proxmox\nhost = ").unwrap();

    pvecheck()
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse config"));
}

#[test]
fn init_writes_config_once() {
    let dir = tempfile::tempdir().unwrap();

    pvecheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created pvecheck.toml"));

    let written = std::fs::read_to_string(dir.path().join("pvecheck.toml")).unwrap();
    assert!(written.contains("[proxmox]"));
    assert!(!written.contains("password ="));

    pvecheck()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    pvecheck()
        .current_dir(dir.path())
        .args(["init", "--force"])
        .assert()
        .success();
}

#[test]
fn log_file_captures_debug_output() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_test_config(&dir);
    let log_path = dir.path().join("logs").join("run.log");

    pvecheck()
        .current_dir(dir.path())
        .env("PROXMOX_PASSWORD", "x")
        .arg("--config")
        .arg(&config_path)
        .arg("--log-file")
        .arg(&log_path)
        .assert()
        .code(1);

    let log = std::fs::read_to_string(&log_path).unwrap();
    assert!(log.contains("check finished"));
}
