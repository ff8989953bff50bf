use super::data::{generate_user_id, path_display, Config, DEFAULT_BASE_URL};
use super::io::ConfigError;
use super::orchestrator::ConfigOrchestrator;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn config_orchestrator_detects_external_updates() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    let orchestrator = ConfigOrchestrator::new(config_path.clone());

    orchestrator
        .mutate(|config| {
            config.base_url = Some("http://first.test".to_string());
            Ok(())
        })
        .expect("mutate failed");

    let persisted = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(persisted.base_url.as_deref(), Some("http://first.test"));

    let cached = orchestrator.load().expect("cached load failed");
    assert_eq!(cached.base_url.as_deref(), Some("http://first.test"));

    std::thread::sleep(Duration::from_millis(1100));

    let external = Config {
        base_url: Some("http://second.test".to_string()),
        ..Default::default()
    };
    external
        .save_to_path(&config_path)
        .expect("external save failed");

    let reloaded = orchestrator.load().expect("reload failed");
    assert_eq!(reloaded.base_url.as_deref(), Some("http://second.test"));
}

#[test]
fn test_load_nonexistent_config() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nonexistent_config.toml");

    let config = Config::load_from_path(&config_path).expect("Failed to load config");

    assert_eq!(config, Config::default());
    assert_eq!(config.effective_base_url(), DEFAULT_BASE_URL);
}

#[test]
fn test_config_persistence_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("nested").join("config.toml");

    let mut config = Config::default();
    config
        .set_key("default-assistant", "a1".to_string())
        .expect("set failed");
    config
        .set_key("base-url", "http://backend.test/".to_string())
        .expect("set failed");
    config.save_to_path(&config_path).expect("save failed");

    let mut loaded = Config::load_from_path(&config_path).expect("load failed");
    assert_eq!(loaded.default_assistant.as_deref(), Some("a1"));
    assert_eq!(loaded.effective_base_url(), "http://backend.test/");

    loaded.unset_key("default-assistant").expect("unset failed");
    loaded.save_to_path(&config_path).expect("save failed");

    let reloaded = Config::load_from_path(&config_path).expect("load failed");
    assert!(reloaded.default_assistant.is_none());
    assert_eq!(reloaded.base_url.as_deref(), Some("http://backend.test/"));
}

#[test]
fn parse_errors_name_the_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let config_path = temp_dir.path().join("config.toml");
    std::fs::write(&config_path, "base_url = [").expect("write failed");

    let err = Config::load_from_path(&config_path).expect_err("parse should fail");

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("Failed to parse config at"));
}

#[test]
fn unknown_and_empty_keys_are_rejected() {
    let mut config = Config::default();
    let err = config
        .set_key("theme", "dark".to_string())
        .expect_err("unknown key");
    assert!(err.contains("base-url, user-id, default-assistant, log-filter"));
    assert!(config.set_key("user-id", "   ".to_string()).is_err());
    assert!(config
        .set_key("base-url", "localhost:8100".to_string())
        .is_err());
    assert!(config.unset_key("nope").is_err());
    assert_eq!(config, Config::default());
}

#[test]
fn generated_user_ids_are_hex_and_distinct() {
    let first = generate_user_id().expect("random id");
    let second = generate_user_id().expect("random id");
    assert_eq!(first.len(), 32);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(first, second);
}

#[cfg(unix)]
#[test]
fn path_display_abbreviates_home() {
    if let Some(home) = std::env::var_os("HOME") {
        let path = std::path::PathBuf::from(home).join(".config/threadline/config.toml");
        assert_eq!(path_display(&path), "~/.config/threadline/config.toml");
    }
}
