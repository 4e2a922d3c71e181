//! Logging facilities for Horizon NetState.
//!
//! Horizon NetState uses the `tracing` crate for instrumentation. The library
//! never installs a subscriber; to see logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every subsystem logs under its own target so it can be filtered with
//! `RUST_LOG`-style directives, e.g. `horizon_netstate_core::signal=trace`.

/// Target names for log filtering.
pub mod targets {
    /// Core primitives target.
    pub const CORE: &str = "horizon_netstate_core";
    /// Signal/listener registry target.
    pub const SIGNAL: &str = "horizon_netstate_core::signal";
    /// Property publication target.
    pub const PROPERTY: &str = "horizon_netstate_core::property";
    /// Performance span target.
    pub const PERF: &str = "horizon_netstate::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for tracking the duration of an operation when the subscriber is
/// configured to report span close events.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create and enter a new performance span.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: targets::PERF, "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

/// Macros for common tracing patterns.
///
/// These are thin wrappers around the `tracing` macros with a fixed target.
#[macro_export]
macro_rules! netstate_debug {
    ($($arg:tt)*) => {
        tracing::debug!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! netstate_warn {
    ($($arg:tt)*) => {
        tracing::warn!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}

#[macro_export]
macro_rules! netstate_error {
    ($($arg:tt)*) => {
        tracing::error!(target: $crate::logging::targets::CORE, $($arg)*)
    };
}
