mod common;

use std::fs;

use tempfile::TempDir;

fn init_in(temp_dir: &TempDir, extra: &[&str]) -> assert_cmd::assert::Assert {
    common::lockgraph_in(temp_dir.path())
        .args(["init", "--path"])
        .arg(temp_dir.path())
        .args(extra)
        .assert()
}

#[test]
fn init_creates_valid_yaml() {
    let temp_dir = TempDir::new().expect("temp dir");
    init_in(&temp_dir, &[]).success();

    let config_path = temp_dir.path().join(".lockgraph").join("config.yaml");
    let content = fs::read_to_string(&config_path).expect("read config");
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content).expect("valid YAML");

    let settings = &yaml["settings"];
    assert_eq!(settings["allowWriteDefault"].as_bool(), Some(false));
    assert_eq!(settings["output"]["defaultFormat"].as_str(), Some("pretty"));

    let profile = &yaml["profiles"]["default"];
    assert_eq!(profile["server"].as_str(), Some("localhost"));
    assert_eq!(profile["port"].as_u64(), Some(1433));
    assert_eq!(profile["passwordEnv"].as_str(), Some("SQL_PASSWORD"));
}

#[test]
fn init_with_custom_profile_name() {
    let temp_dir = TempDir::new().expect("temp dir");
    init_in(&temp_dir, &["--profile", "production"]).success();

    let content = fs::read_to_string(temp_dir.path().join(".lockgraph/config.yaml"))
        .expect("read config");
    let yaml: serde_yaml::Value = serde_yaml::from_str(&content).expect("valid YAML");
    assert_eq!(yaml["defaultProfile"].as_str(), Some("production"));
    assert!(!yaml["profiles"]["production"].is_null());
}

#[test]
fn written_config_is_discovered() {
    let temp_dir = TempDir::new().expect("temp dir");
    init_in(&temp_dir, &["--profile", "ops"]).success();

    let output = common::lockgraph_in(temp_dir.path())
        .args(["config", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let value: serde_json::Value = serde_json::from_slice(&output).expect("json");
    assert_eq!(value["profileName"], "ops");
    assert!(value["configPath"]
        .as_str()
        .is_some_and(|path| path.ends_with("config.yaml")));
}

#[test]
fn init_requires_force_to_overwrite() {
    let temp_dir = TempDir::new().expect("temp dir");
    init_in(&temp_dir, &[]).success();
    init_in(&temp_dir, &[]).failure();
    init_in(&temp_dir, &["--force"]).success();
}
