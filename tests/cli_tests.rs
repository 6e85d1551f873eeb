//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with config and runtime dirs pointed into `home`
fn hold_record_bin(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("hold-record").expect("binary should build");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("XDG_RUNTIME_DIR", home.path().join("run"))
        .env_remove("HOLD_RECORD_DOWNLOADS_DIR")
        .env_remove("HOLD_RECORD_FFMPEG");
    cmd
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    hold_record_bin(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--downloads-dir"))
        .stdout(predicate::str::contains("--ffmpeg"))
        .stdout(predicate::str::contains("--log-level"))
        .stdout(predicate::str::contains("control"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    hold_record_bin(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("hold-record"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn control_help_lists_gestures() {
    let home = TempDir::new().unwrap();
    hold_record_bin(&home)
        .args(["control", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("press"))
        .stdout(predicate::str::contains("release"))
        .stdout(predicate::str::contains("cancel"))
        .stdout(predicate::str::contains("blur"))
        .stdout(predicate::str::contains("status"));
}

#[test]
fn config_path_command() {
    let home = TempDir::new().unwrap();
    hold_record_bin(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("hold-record"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    hold_record_bin(&home)
        .args(["config", "set", "downloads_dir", "/srv/takes"])
        .assert()
        .success();

    hold_record_bin(&home)
        .args(["config", "get", "downloads_dir"])
        .assert()
        .success()
        .stdout(predicate::str::contains("/srv/takes"));
}

#[test]
fn config_init_then_list() {
    let home = TempDir::new().unwrap();
    hold_record_bin(&home)
        .args(["config", "init"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Config file created"));

    hold_record_bin(&home)
        .args(["config", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("ffmpeg_path"))
        .stdout(predicate::str::contains("log_level"))
        .stdout(predicate::str::contains("warn"));
}
