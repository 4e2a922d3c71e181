//! Monitor configuration.
//!
//! Configuration can be built in code or loaded from TOML:
//!
//! ```toml
//! worker_name = "netstate"
//! queue_capacity = 64
//! query_on_start = true
//! reset_on_stop = false
//! ```

use std::path::Path;

use horizon_netstate_core::WorkerConfig;
use serde::{Deserialize, Serialize};

use crate::error::{MonitorError, Result};

/// Configuration for a [`NetworkMonitor`](crate::NetworkMonitor).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonitorConfig {
    /// Name of the serial update thread.
    pub worker_name: String,
    /// Stack size of the serial update thread in bytes.
    pub worker_stack_size: Option<usize>,
    /// Bound on queued signal deliveries. `None` means unbounded.
    ///
    /// With a bound, a source delivering faster than the monitor can
    /// translate is blocked until the queue drains.
    pub queue_capacity: Option<usize>,
    /// Query the source during `start()` so the state is current before the
    /// first platform callback arrives.
    pub query_on_start: bool,
    /// Revert to the default disconnected state on `stop()`.
    pub reset_on_stop: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            worker_name: "netstate-monitor".to_string(),
            worker_stack_size: None,
            queue_capacity: None,
            query_on_start: true,
            reset_on_stop: false,
        }
    }
}

impl MonitorConfig {
    /// Parse a configuration from TOML text and validate it.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate().map_err(|reason| MonitorError::config(None, reason))?;
        Ok(config)
    }

    /// Load a configuration file and validate it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| MonitorError::io(path, e))?;
        let config: Self = toml::from_str(&text)?;
        config
            .validate()
            .map_err(|reason| MonitorError::config(Some(path.to_path_buf()), reason))?;
        Ok(config)
    }

    /// Serialize the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| MonitorError::config(None, e.to_string()))
    }

    /// Check field constraints.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.worker_name.trim().is_empty() {
            return Err("worker_name must not be empty".to_string());
        }
        if self.worker_name.contains('\0') {
            return Err("worker_name must not contain NUL bytes".to_string());
        }
        if self.queue_capacity == Some(0) {
            return Err("queue_capacity must be at least 1".to_string());
        }
        if self.worker_stack_size == Some(0) {
            return Err("worker_stack_size must be at least 1".to_string());
        }
        Ok(())
    }

    pub fn with_worker_name(mut self, name: impl Into<String>) -> Self {
        self.worker_name = name.into();
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    pub fn with_query_on_start(mut self, query: bool) -> Self {
        self.query_on_start = query;
        self
    }

    pub fn with_reset_on_stop(mut self, reset: bool) -> Self {
        self.reset_on_stop = reset;
        self
    }

    /// Worker settings for the serial update thread.
    pub(crate) fn worker_config(&self) -> WorkerConfig {
        WorkerConfig {
            name: self.worker_name.clone(),
            stack_size: self.worker_stack_size,
            queue_capacity: self.queue_capacity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = MonitorConfig::default();
        assert_eq!(config.worker_name, "netstate-monitor");
        assert!(config.query_on_start);
        assert!(!config.reset_on_stop);
        assert_eq!(config.queue_capacity, None);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = MonitorConfig::from_toml_str("reset_on_stop = true").unwrap();
        assert!(config.reset_on_stop);
        assert!(config.query_on_start);
        assert_eq!(config.worker_name, "netstate-monitor");
    }

    #[test]
    fn test_worker_config_mapping() {
        let config = MonitorConfig::default()
            .with_worker_name("net")
            .with_queue_capacity(8);
        let worker = config.worker_config();
        assert_eq!(worker.name, "net");
        assert_eq!(worker.queue_capacity, Some(8));
        assert_eq!(worker.stack_size, None);
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let err = MonitorConfig::from_toml_str("queue_capacity = 0").unwrap_err();
        assert!(matches!(err, MonitorError::Config { path: None, .. }));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let err = MonitorConfig::from_toml_str("worker = \"x\"").unwrap_err();
        assert!(matches!(err, MonitorError::ConfigParse(_)));
    }
}
