use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

// Nothing listens on the discard port, so any request fails fast.
const UNREACHABLE: &str = "http://127.0.0.1:9";

fn gristctl(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gristctl").unwrap();
    cmd.env("HOME", home)
        .env_remove("GRIST_URL")
        .env_remove("GRIST_TOKEN")
        .env_remove("GRIST_TIMEOUT");
    cmd
}

fn configured(home: &Path) -> Command {
    let mut cmd = gristctl(home);
    cmd.env("GRIST_URL", UNREACHABLE)
        .env("GRIST_TOKEN", "test-token")
        .env("GRIST_TIMEOUT", "2");
    cmd
}

#[test]
fn version_prints_crate_version() {
    let home = tempfile::tempdir().unwrap();
    gristctl(home.path())
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with(format!(
            "gristctl {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    gristctl(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("get").and(predicate::str::contains("import")));
}

#[test]
fn get_without_configuration_fails() {
    let home = tempfile::tempdir().unwrap();
    gristctl(home.path())
        .args(["get", "org"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("GRIST_URL is not set"));
}

#[test]
fn json_errors_go_to_stdout() {
    let home = tempfile::tempdir().unwrap();
    let output = gristctl(home.path())
        .args(["-o", "json", "get", "org"])
        .assert()
        .failure()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(value["error"]["kind"], "config");
}

#[test]
fn dotfile_configuration_is_used() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join(".gristctl"),
        format!("GRIST_URL=\"{}\"\nGRIST_TOKEN=\"abc\"\n", UNREACHABLE),
    )
    .unwrap();
    gristctl(home.path())
        .args(["get", "org"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Request to orgs failed"));
}

#[test]
fn non_numeric_workspace_id_is_rejected() {
    let home = tempfile::tempdir().unwrap();
    configured(home.path())
        .args(["get", "workspace", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("'abc' is not a valid workspace id"));
}

#[test]
fn import_with_only_malformed_lines_sends_nothing() {
    let home = tempfile::tempdir().unwrap();
    configured(home.path())
        .args(["import", "users"])
        .write_stdin("not a record\nbob@example.com;x;Sales;viewers\n")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Line 1:")
                .and(predicate::str::contains("Line 2:"))
                .and(predicate::str::contains("No users to import.")),
        );
}

#[test]
fn delete_needs_yes_without_terminal() {
    let home = tempfile::tempdir().unwrap();
    configured(home.path())
        .args(["delete", "doc", "abc"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn config_without_settings_reports_not_configured() {
    let home = tempfile::tempdir().unwrap();
    gristctl(home.path())
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("not configured"));
}

#[test]
fn config_rejects_bad_url() {
    let home = tempfile::tempdir().unwrap();
    gristctl(home.path())
        .args(["config", "--url", "grist.example.com", "--token", "abc"])
        .assert()
        .failure();
    assert!(!home.path().join(".gristctl").exists());
}

#[test]
fn config_saves_dotfile() {
    let home = tempfile::tempdir().unwrap();
    // The connection test fails against the unreachable server, but the file is written.
    gristctl(home.path())
        .args(["config", "--url", UNREACHABLE, "--token", "abc"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Saved"));
    let saved = std::fs::read_to_string(home.path().join(".gristctl")).unwrap();
    assert!(saved.contains(UNREACHABLE));
}
