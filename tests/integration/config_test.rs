use std::fs;

use sysmon::core::config::{Config, CPU_THRESHOLD, HISTORY_CAPACITY};
use tempfile::TempDir;

#[test]
fn test_missing_file_is_created_with_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let loaded = Config::load_from(&path).unwrap();

    assert!(path.exists());
    assert!(loaded.issues.is_empty());
    assert_eq!(loaded.config, Config::default());
    assert_eq!(loaded.path, path);
}

#[test]
fn test_bad_keys_fall_back_individually() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(
        &path,
        r#"{
            "cpu_threshold": 150,
            "memory_threshold": 65,
            "update_interval": "fast",
            "history_capacity": 25
        }"#,
    )
    .unwrap();

    let loaded = Config::load_from(&path).unwrap();

    assert_eq!(loaded.config.cpu_threshold, 80);
    assert_eq!(loaded.config.memory_threshold, 65);
    assert_eq!(loaded.config.update_interval, 5000);
    assert_eq!(loaded.config.history_capacity, 25);

    let keys: Vec<&str> = loaded.issues.iter().map(|i| i.key.as_str()).collect();
    assert_eq!(keys, ["cpu_threshold", "update_interval"]);
}

#[test]
fn test_invalid_json_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "{ not json").unwrap();

    let loaded = Config::load_from(&path).unwrap();

    assert_eq!(loaded.config, Config::default());
    assert_eq!(loaded.issues.len(), 1);
    assert_eq!(loaded.issues[0].key, "<root>");
}

#[test]
fn test_empty_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    fs::write(&path, "   \n").unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded.config, Config::default());
    assert!(loaded.issues.is_empty());
}

#[test]
fn test_set_save_and_reload() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    let mut config = Config::default();
    config.set(CPU_THRESHOLD, "90").unwrap();
    config.set(HISTORY_CAPACITY, "50").unwrap();
    config.set("cloud_endpoint", "https://storage.example.com/bucket").unwrap();
    config.save_to(&path).unwrap();

    let reloaded = Config::load_from(&path).unwrap();
    assert!(reloaded.issues.is_empty());
    assert_eq!(reloaded.config.cpu_threshold, 90);
    assert_eq!(reloaded.config.history_capacity, 50);
    assert_eq!(
        reloaded.config.cloud_endpoint.as_deref(),
        Some("https://storage.example.com/bucket")
    );
    assert_eq!(reloaded.config.thresholds().cpu, 90.0);
}

#[test]
fn test_set_rejects_bad_values_without_changing_config() {
    let mut config = Config::default();

    assert!(config.set(CPU_THRESHOLD, "101").is_err());
    assert!(config.set(HISTORY_CAPACITY, "0").is_err());
    assert!(config.set("no_such_key", "1").is_err());
    assert_eq!(config, Config::default());
}
