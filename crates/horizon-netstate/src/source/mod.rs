//! Platform signal sources.
//!
//! A [`SignalSource`] is the monitor's only view of the platform: it pushes
//! asynchronous [`RawSignal`]s into a [`SignalSink`] while subscribed, and
//! answers synchronous state queries for refreshes.
//!
//! - [`ManualSource`] - driven by the host (bridge layers, tests)
//! - [`HostInterfaceSource`] - desktop interface watcher (`host-source` feature)

#[cfg(feature = "host-source")]
mod host;
mod manual;

use std::fmt;
use std::sync::Arc;

use crate::error::SourceError;
use crate::raw::RawSignal;

#[cfg(feature = "host-source")]
pub use host::HostInterfaceSource;
pub use manual::ManualSource;

/// A platform connectivity signal source.
pub trait SignalSource: Send + Sync + 'static {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Start delivering signals into `sink`.
    ///
    /// Delivery stops when the returned [`Subscription`] is dropped. Signals
    /// may arrive on any thread.
    fn subscribe(&self, sink: SignalSink) -> Result<Subscription, SourceError>;

    /// Read the current platform state synchronously.
    fn query(&self) -> Result<RawSignal, SourceError>;
}

type Deliver = dyn Fn(RawSignal) -> bool + Send + Sync;

/// The receiving end handed to a source on subscription.
///
/// Cloning is cheap. Deliveries made after the subscriber has stopped are
/// discarded.
#[derive(Clone)]
pub struct SignalSink {
    deliver: Arc<Deliver>,
}

impl SignalSink {
    /// Create a sink from a delivery function.
    ///
    /// The function returns whether the signal was accepted.
    pub fn from_fn<F>(deliver: F) -> Self
    where
        F: Fn(RawSignal) -> bool + Send + Sync + 'static,
    {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Hand a signal to the subscriber.
    ///
    /// Returns `false` if the subscriber no longer accepts signals.
    pub fn deliver(&self, signal: RawSignal) -> bool {
        tracing::trace!(target: crate::logging::targets::SOURCE, kind = signal.kind(), "signal delivered");
        (self.deliver)(signal)
    }
}

impl fmt::Debug for SignalSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalSink").finish_non_exhaustive()
    }
}

/// An active source subscription. Dropping it stops delivery.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    on_drop: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// A subscription that runs `cancel` when dropped.
    pub fn new<F>(cancel: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            on_drop: Some(Box::new(cancel)),
        }
    }

    /// A subscription that keeps `handle` alive until dropped, for platform
    /// watchers that unsubscribe on drop.
    pub fn holding<T: Send + 'static>(handle: T) -> Self {
        Self::new(move || drop(handle))
    }

    /// A subscription with nothing to release.
    pub fn detached() -> Self {
        Self { on_drop: None }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.on_drop.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.on_drop.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(SignalSink: Send, Sync);
static_assertions::assert_impl_all!(Subscription: Send);
