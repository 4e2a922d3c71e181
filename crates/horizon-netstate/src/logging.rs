//! Logging targets for network state monitoring.
//!
//! The monitor logs through `tracing` and never installs a subscriber. Use
//! these targets in filter directives, e.g.
//! `RUST_LOG=horizon_netstate::monitor=debug`.
//!
//! Levels: `trace` for every delivered signal and notification, `debug` for
//! suppressed snapshots and lifecycle no-ops, `info` for start, stop and
//! published transitions, `warn` for failed queries and malformed signals,
//! `error` for listener panics and source initialization failures.

pub use horizon_netstate_core::PerfSpan;

/// Target names for log filtering.
pub mod targets {
    /// Monitor lifecycle and publication.
    pub const MONITOR: &str = "horizon_netstate::monitor";
    /// Signal translation.
    pub const TRANSLATE: &str = "horizon_netstate::translate";
    /// Platform signal sources.
    pub const SOURCE: &str = "horizon_netstate::source";
}
