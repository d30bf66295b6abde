use std::fs;
use std::path::Path;
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

/// Nothing listens on the discard port, so every request is refused.
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn edgesync_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("edgesync"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("RUST_LOG", "off");
    cmd
}

fn init_unreachable(home: &TempDir) {
    edgesync_cmd(home.path())
        .args([
            "init",
            "--service-id",
            "SU1Z0isxPaozGVKXdv0eY",
            "--api-key",
            "secret",
            "--api-base-url",
            UNREACHABLE,
        ])
        .assert()
        .success();
}

#[test]
fn help_lists_every_command() {
    let home = TempDir::new().expect("home");
    let output = edgesync_cmd(home.path())
        .arg("--help")
        .output()
        .expect("run --help");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for command in ["init", "sync", "maintenance", "versions", "check"] {
        assert!(stdout.contains(command), "--help should list '{command}'");
    }
}

#[test]
fn init_writes_config_and_is_idempotent() {
    let home = TempDir::new().expect("home");
    init_unreachable(&home);

    let config_path = home.path().join(".edgesync").join("config.yaml");
    let yaml = fs::read_to_string(&config_path).expect("config written");
    assert!(yaml.contains("service_id: SU1Z0isxPaozGVKXdv0eY"));
    assert!(yaml.contains(UNREACHABLE));

    edgesync_cmd(home.path())
        .args(["init", "--service-id", "other", "--api-key", "k"])
        .assert()
        .success()
        .stdout(contains("Already initialized"));
    let unchanged = fs::read_to_string(&config_path).expect("config kept");
    assert_eq!(yaml, unchanged);
}

#[test]
fn sync_without_config_points_at_init() {
    let home = TempDir::new().expect("home");
    edgesync_cmd(home.path())
        .arg("sync")
        .assert()
        .failure()
        .stderr(contains("edgesync init"));
}

#[test]
fn check_reports_unreachable_api() {
    let home = TempDir::new().expect("home");
    init_unreachable(&home);

    edgesync_cmd(home.path())
        .arg("check")
        .assert()
        .failure()
        .stderr(contains("connection failed"));
}

#[test]
fn sync_against_unreachable_api_aborts() {
    let home = TempDir::new().expect("home");
    init_unreachable(&home);

    edgesync_cmd(home.path())
        .args(["sync", "--activate"])
        .assert()
        .failure()
        .stderr(contains("connection error"))
        .stderr(contains("Edge logic update failed"));
}

#[test]
fn dry_run_conflicts_with_activate() {
    let home = TempDir::new().expect("home");
    edgesync_cmd(home.path())
        .args(["sync", "--dry-run", "--activate"])
        .assert()
        .failure()
        .stderr(contains("cannot be used with"));
}

#[test]
fn maintenance_requires_a_readable_page() {
    let home = TempDir::new().expect("home");
    init_unreachable(&home);

    edgesync_cmd(home.path())
        .args(["maintenance", "missing.html"])
        .assert()
        .failure()
        .stderr(contains("cannot read maintenance page"));
}
