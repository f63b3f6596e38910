//! Integration tests for logging functionality
//!
//! The global subscriber can only be installed once per process, so a single
//! test here calls `init_logging` successfully.

use docudump::config::{DumpConfig, LoggingConfig};
use docudump::logging::{init_logging, parse_log_level};
use tempfile::TempDir;
use tracing::Level;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(!config.local_enabled);
    assert_eq!(config.local_path, "logs");
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_log_levels_from_cli_strings() {
    assert_eq!(parse_log_level("warn").unwrap(), Level::WARN);
    assert_eq!(parse_log_level("INFO").unwrap(), Level::INFO);

    let err = parse_log_level("chatty").unwrap_err();
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_logging_rotation_types() {
    for rotation in ["daily", "hourly", "never"] {
        let config = DumpConfig {
            logging: LoggingConfig {
                local_rotation: rotation.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(config.validate().is_ok(), "{rotation} should be accepted");
    }

    let config = DumpConfig {
        logging: LoggingConfig {
            local_rotation: "size".to_string(),
            ..Default::default()
        },
        ..Default::default()
    };
    assert!(config.validate().unwrap_err().contains("local_rotation"));
}

#[test]
fn test_file_logging_writes_json() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "never".to_string(),
    };

    let guard = init_logging("debug", &config).unwrap();
    // Dropping the guard flushes the background writer
    drop(guard);

    assert!(log_path.is_dir());
    let contents = std::fs::read_to_string(log_path.join("docudump.log")).unwrap();
    let first = contents.lines().next().unwrap();
    let event: serde_json::Value = serde_json::from_str(first).unwrap();
    assert_eq!(event["fields"]["message"], "Logging initialized");
}
