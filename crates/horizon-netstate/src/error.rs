//! Error types for network state monitoring.

use std::path::PathBuf;

use horizon_netstate_core::WorkerError;

/// Result type alias for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;

/// Errors reported by the monitor and its configuration.
///
/// Runtime problems after a successful start (failed queries, malformed
/// signals, panicking listeners) are never reported here; they degrade the
/// published state instead.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// The platform signal source could not be initialized.
    #[error("Signal source '{source_name}' unavailable: {reason}")]
    SignalSourceUnavailable {
        source_name: String,
        #[source]
        reason: SourceError,
    },

    /// The serial update thread could not be started.
    #[error("Monitor worker error: {0}")]
    Worker(#[from] WorkerError),

    /// The configuration is invalid.
    #[error("Invalid monitor configuration{}: {reason}", display_path(.path))]
    Config {
        path: Option<PathBuf>,
        reason: String,
    },

    /// The configuration could not be parsed.
    #[error("Failed to parse monitor configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// File I/O error.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MonitorError {
    /// Create a source initialization error.
    pub fn source_unavailable(source_name: impl Into<String>, reason: SourceError) -> Self {
        Self::SignalSourceUnavailable {
            source_name: source_name.into(),
            reason,
        }
    }

    /// Create a configuration error.
    pub fn config(path: Option<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Config {
            path,
            reason: reason.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in '{}'", p.display()))
        .unwrap_or_default()
}

/// Errors reported by platform signal sources.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    /// The platform API is not available right now.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// The process lacks permission to observe the network.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The platform does not support this source.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// A synchronous state query failed.
    #[error("query failed: {0}")]
    QueryFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_source_unavailable_display_and_source() {
        let err = MonitorError::source_unavailable(
            "manual",
            SourceError::PermissionDenied("no location access".into()),
        );
        assert_eq!(
            err.to_string(),
            "Signal source 'manual' unavailable: permission denied: no location access"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn test_config_error_display() {
        let err = MonitorError::config(None, "queue_capacity must be positive");
        assert_eq!(
            err.to_string(),
            "Invalid monitor configuration: queue_capacity must be positive"
        );

        let err = MonitorError::config(Some("netstate.toml".into()), "bad");
        assert_eq!(err.to_string(), "Invalid monitor configuration in 'netstate.toml': bad");
    }

    #[test]
    fn test_worker_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "no threads left");
        let err: MonitorError = WorkerError::SpawnFailed(io).into();
        assert!(matches!(err, MonitorError::Worker(WorkerError::SpawnFailed(_))));
    }
}
