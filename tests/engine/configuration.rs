//! Building the engine from configuration files

use eventstack::core::config::{ConfigOverrides, EngineConfig};
use eventstack::dispatch::{DrainMode, EventQueue, ExecutorPool, SubscriberRegistry};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_engine_parts_follow_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("eventstack.toml");
    fs::write(
        &config_path,
        r#"
worker_count = 3
event_types = 8
publish_ceiling = 5
drain_mode = "quiescent"
"#,
    )
    .unwrap();

    let config = EngineConfig::load(Some(&config_path), &ConfigOverrides::default()).unwrap();
    let queue = EventQueue::with_config(&config);
    let registry = SubscriberRegistry::with_config(&config);
    let pool = ExecutorPool::with_config(&config);

    assert_eq!(queue.ceiling(), 5);
    assert_eq!(registry.event_types(), 8);
    assert_eq!(pool.worker_count(), 3);
    assert_eq!(pool.drain_mode(), DrainMode::Quiescent);
}

#[test]
fn test_malformed_config_file_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("eventstack.toml");
    fs::write(&config_path, "drain_mode = \"sometimes\"").unwrap();

    let result = EngineConfig::load(Some(&config_path), &ConfigOverrides::default());
    let message = result.unwrap_err().to_string();
    assert!(message.contains("eventstack.toml"), "got: {message}");
}
