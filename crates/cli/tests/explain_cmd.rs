//! CLI tests for the `toolfence explain` subcommand.

use std::process::Command;

use assert_cmd::cargo;

fn toolfence_cmd() -> Command {
    Command::new(cargo::cargo_bin!("toolfence"))
}

#[test]
fn explain_known_code_json_returns_explanation() {
    let output = toolfence_cmd()
        .args(["explain", "TF2002", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "TF2002");
    assert_eq!(json["severity"], "error");
    let explanation = json["explanation"].as_str().expect("explanation string");
    assert!(
        explanation.contains("could not be deserialized as JSON"),
        "unexpected explanation: {explanation}"
    );
}

#[test]
fn explain_unknown_code_json_returns_null_explanation() {
    let output = toolfence_cmd()
        .args(["explain", "TF9999", "--output", "json"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(json["id"], "TF9999");
    assert!(json["explanation"].is_null());
    assert!(json["severity"].is_null());
}

#[test]
fn explain_pretty_shows_human_readable_text() {
    let output = toolfence_cmd()
        .args(["explain", "TF3101", "--output", "pretty"])
        .output()
        .expect("run explain command");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("TF3101"), "unexpected output: {stdout}");
    assert!(
        stdout.contains("rewritten to a project-relative path"),
        "unexpected output: {stdout}"
    );
}
