use std::sync::Arc;

use super::NetworkMonitor;
use super::dispatch::NotificationDispatcher;
use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::source::SignalSource;

/// Builder for a [`NetworkMonitor`] with custom configuration.
///
/// # Example
///
/// ```
/// use horizon_netstate::{ManualSource, MonitorConfig, NetworkMonitorBuilder};
///
/// let monitor = NetworkMonitorBuilder::new(ManualSource::new())
///     .config(MonitorConfig::default().with_reset_on_stop(true))
///     .build()?;
/// assert!(!monitor.is_running());
/// # Ok::<(), horizon_netstate::MonitorError>(())
/// ```
pub struct NetworkMonitorBuilder {
    source: Arc<dyn SignalSource>,
    config: MonitorConfig,
    dispatcher: Option<Arc<dyn NotificationDispatcher>>,
}

impl NetworkMonitorBuilder {
    pub fn new(source: impl SignalSource) -> Self {
        Self {
            source: Arc::new(source),
            config: MonitorConfig::default(),
            dispatcher: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the serial update thread name.
    pub fn worker_name(mut self, name: impl Into<String>) -> Self {
        self.config.worker_name = name.into();
        self
    }

    /// Bound the signal delivery queue.
    pub fn queue_capacity(mut self, capacity: usize) -> Self {
        self.config.queue_capacity = Some(capacity);
        self
    }

    /// Whether `start()` seeds the state from a synchronous query.
    pub fn query_on_start(mut self, query: bool) -> Self {
        self.config.query_on_start = query;
        self
    }

    /// Whether `stop()` reverts to the default disconnected state.
    pub fn reset_on_stop(mut self, reset: bool) -> Self {
        self.config.reset_on_stop = reset;
        self
    }

    /// Deliver listener notifications through `dispatcher`.
    pub fn dispatcher(mut self, dispatcher: impl NotificationDispatcher) -> Self {
        self.dispatcher = Some(Arc::new(dispatcher));
        self
    }

    /// Validate the configuration and create the monitor. The monitor is
    /// created stopped.
    pub fn build(self) -> Result<NetworkMonitor> {
        self.config
            .validate()
            .map_err(|reason| MonitorError::config(None, reason))?;
        Ok(NetworkMonitor::from_parts(self.source, self.config, self.dispatcher))
    }
}

impl std::fmt::Debug for NetworkMonitorBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkMonitorBuilder")
            .field("source", &self.source.name())
            .field("config", &self.config)
            .field("dispatcher", &self.dispatcher.is_some())
            .finish()
    }
}
