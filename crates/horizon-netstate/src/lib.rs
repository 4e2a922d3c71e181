//! Network connectivity state for Horizon NetState.
//!
//! This crate observes the host's network connectivity and reports it as a
//! normalized, immutable [`NetworkSnapshot`]:
//!
//! - **State model**: [`CapabilitySet`], [`LinkDetails`], [`NetworkType`] and
//!   the [`NetworkSnapshot`] aggregate with its stable dictionary form
//! - **Raw signals**: path descriptions, reachability bitmasks and capability
//!   reports, unified as [`RawSignal`]
//! - **Translation**: the pure [`translate`] function
//! - **Sources**: the [`SignalSource`] abstraction, [`ManualSource`] and
//!   (with the `host-source` feature) [`HostInterfaceSource`]
//! - **Monitoring**: [`NetworkMonitor`], which serializes updates on its own
//!   thread and notifies listeners only when the state actually changes
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_netstate::{
//!     InterfaceKind, ManualSource, NetworkMonitor, NetworkSnapshot, NetworkType, PathDescription,
//! };
//!
//! let source = ManualSource::new();
//! let monitor = NetworkMonitor::new(source.clone());
//!
//! monitor.add_listener(|snapshot: &Arc<NetworkSnapshot>| {
//!     let payload = serde_json::Value::Object(snapshot.to_dictionary());
//!     println!("network changed: {payload}");
//! });
//! monitor.start()?;
//!
//! source.set_current(PathDescription::satisfied([InterfaceKind::Cellular]).into());
//! monitor.force_refresh();
//!
//! assert_eq!(monitor.current_state().network_type(), NetworkType::Cellular);
//! assert!(monitor.is_network_expensive());
//! # Ok::<(), horizon_netstate::MonitorError>(())
//! ```
//!
//! # Logging
//!
//! Everything is instrumented with `tracing`; see [`logging::targets`] for
//! the filter targets.

pub mod config;
mod error;
pub mod logging;
pub mod monitor;
pub mod raw;
pub mod source;
pub mod state;
pub mod translate;

pub use config::MonitorConfig;
pub use error::{MonitorError, Result, SourceError};
pub use monitor::{
    ChannelDispatcher, DispatchQueue, ListenerGuard, ListenerId, NetworkMonitor,
    NetworkMonitorBuilder, NetworkStateListener, NotificationDispatcher, channel_dispatcher,
};
pub use raw::{
    CapabilityReport, InterfaceKind, PathDescription, PathStatus, RawSignal, ReachabilityFlags,
};
#[cfg(feature = "host-source")]
pub use source::HostInterfaceSource;
pub use source::{ManualSource, SignalSink, SignalSource, Subscription};
pub use state::{
    CapabilitySet, LinkCost, LinkDetails, NetworkSnapshot, NetworkType, ParseNetworkTypeError,
};
pub use translate::translate;
