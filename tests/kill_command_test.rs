mod common;

use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn kill_dry_run_prints_statement() {
    let temp_dir = TempDir::new().expect("temp dir");
    common::lockgraph_in(temp_dir.path())
        .args(["kill", "--id", "61", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::diff("KILL 61\n"));
}

#[test]
fn kill_without_allow_write_is_refused() {
    let temp_dir = TempDir::new().expect("temp dir");
    let output = common::lockgraph_in(temp_dir.path())
        .args(["kill", "--id", "61", "--json"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json error");
    assert_eq!(value["error"]["kind"], "Input");
    assert!(value["error"]["message"]
        .as_str()
        .is_some_and(|message| message.contains("--allow-write")));
}

#[test]
fn kill_rejects_non_positive_ids() {
    let temp_dir = TempDir::new().expect("temp dir");
    common::lockgraph_in(temp_dir.path())
        .args(["kill", "--dry-run", "--id=-3"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid session id"));
}
