use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_commands() {
    cargo_bin_cmd!("voxscribe")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("bot"))
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("set-webhook"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_serve_help_shows_port() {
    cargo_bin_cmd!("voxscribe")
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--port"));
}

#[test]
fn test_config_help_shows_subcommands() {
    cargo_bin_cmd!("voxscribe")
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("path"))
        .stdout(predicate::str::contains("init"));
}

#[test]
fn test_version_flag() {
    cargo_bin_cmd!("voxscribe")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("voxscribe"));
}

#[test]
fn test_unknown_command_fails() {
    cargo_bin_cmd!("voxscribe")
        .arg("transcribe-everything")
        .assert()
        .failure();
}
