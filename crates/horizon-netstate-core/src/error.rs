//! Error types for Horizon NetState core primitives.

use std::fmt;

/// Serial worker errors.
#[derive(Debug)]
pub enum WorkerError {
    /// The operating system refused to spawn the worker thread.
    SpawnFailed(std::io::Error),
}

impl fmt::Display for WorkerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SpawnFailed(err) => write!(f, "Failed to spawn worker thread: {err}"),
        }
    }
}

impl std::error::Error for WorkerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::SpawnFailed(err) => Some(err),
        }
    }
}
