//! Integration tests for the `prototype-git` binary entry point.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::{Value, json};
use tempfile::TempDir;

fn request(dir: &TempDir, object: &Value) -> (String, std::path::PathBuf) {
    let path = dir.path().join("response.json");
    let body = json!({"object": object, "response_path": path}).to_string();
    (body, path)
}

fn response_lines(path: &std::path::Path) -> Vec<Value> {
    fs::read_to_string(path)
        .expect("response written")
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect()
}

#[test]
fn introspection_writes_info_response() {
    let dir = TempDir::new().expect("temp dir");
    let (body, path) = request(&dir, &json!({"uri": "u", "branch": "main"}));

    let mut command = cargo_bin_cmd!("prototype-git");
    command.write_stdin(body).assert().success();

    assert_eq!(
        response_lines(&path),
        [json!({
            "interface_version": "1.0",
            "icon": "mdi:git",
            "messages": [{"name": "list"}],
        })]
    );
}

#[test]
fn list_message_writes_one_branch_per_line() {
    let dir = TempDir::new().expect("temp dir");
    let (body, path) = request(&dir, &json!({"uri": "u"}));

    let mut command = cargo_bin_cmd!("prototype-git");
    command.arg("list").write_stdin(body).assert().success();

    let branches: Vec<_> = response_lines(&path)
        .into_iter()
        .map(|line| line["object"]["branch"].clone())
        .collect();
    assert_eq!(branches, [json!("master"), json!("dev")]);
}

#[test]
fn unknown_message_exits_with_failure() {
    let dir = TempDir::new().expect("temp dir");
    let (body, path) = request(&dir, &json!({"uri": "u"}));

    let mut command = cargo_bin_cmd!("prototype-git");
    command
        .arg("clone")
        .write_stdin(body)
        .assert()
        .failure()
        .stderr(contains("message 'clone' is not supported by object shape(s) Repository"));

    assert!(!path.exists(), "failed invocations leave no response");
}

#[test]
fn malformed_request_exits_with_failure() {
    let mut command = cargo_bin_cmd!("prototype-git");
    command
        .write_stdin("{not json")
        .assert()
        .failure()
        .stderr(contains("invalid json request"));
}
