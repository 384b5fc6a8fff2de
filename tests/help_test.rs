mod common;

use predicates::prelude::*;
use tempfile::TempDir;

const CORE: &[&str] = &["locks", "lock-items", "status", "init", "config"];
const ADVANCED: &[&str] = &["sessions", "kill", "completions"];

fn help_output(args: &[&str]) -> String {
    let temp_dir = TempDir::new().expect("temp dir");
    let output = common::lockgraph_in(temp_dir.path())
        .args(args)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&output).into_owned()
}

#[test]
fn help_shows_core_commands_only() {
    let stdout = help_output(&["--help"]);
    for name in CORE {
        assert!(stdout.contains(name), "missing core command: {}", name);
    }
    for name in ADVANCED {
        assert!(
            !stdout.contains(&format!("\n  {}", name)),
            "advanced command leaked: {}",
            name
        );
    }
}

#[test]
fn help_all_shows_advanced_commands() {
    let stdout = help_output(&["help", "--all"]);
    for name in ADVANCED {
        assert!(stdout.contains(name), "missing advanced command: {}", name);
    }
}

#[test]
fn help_for_single_command() {
    let stdout = help_output(&["help", "lock-items"]);
    assert!(stdout.contains("--role"));

    let temp_dir = TempDir::new().expect("temp dir");
    common::lockgraph_in(temp_dir.path())
        .args(["help", "no-such-command"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command"));
}

#[test]
fn completions_name_the_binary() {
    let temp_dir = TempDir::new().expect("temp dir");
    common::lockgraph_in(temp_dir.path())
        .args(["completions", "--shell", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_lockgraph"));
}
