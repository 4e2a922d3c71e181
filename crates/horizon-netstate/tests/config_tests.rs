//! Tests for loading monitor configuration from disk.

use std::fs;

use horizon_netstate::{ManualSource, MonitorConfig, MonitorError, NetworkMonitor};
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("netstate.toml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
worker_name = "netstate-test"
queue_capacity = 16
query_on_start = false
reset_on_stop = true
"#,
    );

    let config = MonitorConfig::from_file(&path).unwrap();
    assert_eq!(config.worker_name, "netstate-test");
    assert_eq!(config.queue_capacity, Some(16));
    assert!(!config.query_on_start);
    assert!(config.reset_on_stop);
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = MonitorConfig::from_file(&path).unwrap_err();
    match err {
        MonitorError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_invalid_value_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "worker_name = \"  \"\n");

    let err = MonitorConfig::from_file(&path).unwrap_err();
    assert!(matches!(&err, MonitorError::Config { path: Some(p), .. } if *p == path));
    let message = err.to_string();
    assert!(message.contains("worker_name"), "{message}");
    assert!(message.contains("netstate.toml"), "{message}");
}

#[test]
fn test_syntax_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "queue_capacity = [1,\n");

    let err = MonitorConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, MonitorError::ConfigParse(_)));
}

#[test]
fn test_wrong_type() {
    let err = MonitorConfig::from_toml_str("query_on_start = \"yes\"").unwrap_err();
    assert!(matches!(err, MonitorError::ConfigParse(_)));
}

#[test]
fn test_saved_config_loads_back() {
    let dir = TempDir::new().unwrap();
    let config = MonitorConfig::default()
        .with_worker_name("netstate-saved")
        .with_queue_capacity(4)
        .with_reset_on_stop(true);
    let path = write_config(&dir, &config.to_toml_string().unwrap());

    assert_eq!(MonitorConfig::from_file(&path).unwrap(), config);
}

#[test]
fn test_loaded_config_drives_monitor() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "query_on_start = false\n");
    let config = MonitorConfig::from_file(&path).unwrap();

    let source = ManualSource::new();
    let monitor = NetworkMonitor::builder(source.clone())
        .config(config)
        .build()
        .unwrap();
    monitor.start().unwrap();

    assert!(monitor.is_running());
    assert_eq!(source.query_count(), 0);
    assert!(!monitor.config().query_on_start);
}
