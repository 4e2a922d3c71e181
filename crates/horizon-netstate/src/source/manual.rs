//! A signal source driven by the host.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{SignalSink, SignalSource, Subscription};
use crate::error::SourceError;
use crate::raw::{RawSignal, ReachabilityFlags};

/// A source whose signals are pushed in by the host application.
///
/// Bridge layers use it to forward platform callbacks they receive
/// themselves; tests use it to script connectivity changes. Clones share the
/// same state, so a clone can be kept to drive a source owned by a monitor.
///
/// # Example
///
/// ```
/// use horizon_netstate::{ManualSource, NetworkMonitor, PathDescription, InterfaceKind};
///
/// let source = ManualSource::new();
/// let monitor = NetworkMonitor::new(source.clone());
/// monitor.start()?;
///
/// source.push(PathDescription::satisfied([InterfaceKind::Wifi]).into());
/// monitor.force_refresh();
/// assert!(monitor.is_connected_to_wifi());
/// # Ok::<(), horizon_netstate::MonitorError>(())
/// ```
#[derive(Clone)]
pub struct ManualSource {
    inner: Arc<ManualInner>,
}

struct ManualInner {
    name: String,
    /// The active subscriber and its subscription generation.
    subscriber: Mutex<Option<(u64, SignalSink)>>,
    /// Value returned by `query`.
    current: Mutex<RawSignal>,
    subscribe_failure: Mutex<Option<SourceError>>,
    query_failure: Mutex<Option<SourceError>>,
    generation: AtomicU64,
    subscribe_count: AtomicUsize,
    query_count: AtomicUsize,
}

impl ManualSource {
    /// Create a source named `"manual"` whose current state is "no network".
    pub fn new() -> Self {
        Self::named("manual")
    }

    /// Create a source with a custom name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ManualInner {
                name: name.into(),
                subscriber: Mutex::new(None),
                current: Mutex::new(RawSignal::Reachability(ReachabilityFlags::empty())),
                subscribe_failure: Mutex::new(None),
                query_failure: Mutex::new(None),
                generation: AtomicU64::new(0),
                subscribe_count: AtomicUsize::new(0),
                query_count: AtomicUsize::new(0),
            }),
        }
    }

    /// Deliver a signal to the subscriber and make it the current state.
    ///
    /// Returns `true` if a subscriber accepted the signal.
    pub fn push(&self, signal: RawSignal) -> bool {
        *self.inner.current.lock() = signal.clone();
        // Clone the sink so delivery runs without the lock held.
        let sink = self.inner.subscriber.lock().as_ref().map(|(_, sink)| sink.clone());
        match sink {
            Some(sink) => sink.deliver(signal),
            None => {
                tracing::debug!(
                    target: crate::logging::targets::SOURCE,
                    source = %self.inner.name,
                    "no subscriber, signal only recorded"
                );
                false
            }
        }
    }

    /// Change the state returned by `query` without notifying the
    /// subscriber, as if the platform callback had been missed.
    pub fn set_current(&self, signal: RawSignal) {
        *self.inner.current.lock() = signal;
    }

    /// Make the next `subscribe` call fail with `error`.
    pub fn fail_next_subscribe(&self, error: SourceError) {
        *self.inner.subscribe_failure.lock() = Some(error);
    }

    /// Make every `query` call fail with `error` until cleared with `None`.
    pub fn fail_queries(&self, error: Option<SourceError>) {
        *self.inner.query_failure.lock() = error;
    }

    /// Whether a subscriber is attached.
    pub fn is_subscribed(&self) -> bool {
        self.inner.subscriber.lock().is_some()
    }

    /// Number of successful `subscribe` calls so far.
    pub fn subscribe_count(&self) -> usize {
        self.inner.subscribe_count.load(Ordering::Acquire)
    }

    /// Number of `query` calls so far, failed ones included.
    pub fn query_count(&self) -> usize {
        self.inner.query_count.load(Ordering::Acquire)
    }
}

impl Default for ManualSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for ManualSource {
    fn name(&self) -> &str {
        &self.inner.name
    }

    fn subscribe(&self, sink: SignalSink) -> Result<Subscription, SourceError> {
        if let Some(error) = self.inner.subscribe_failure.lock().take() {
            return Err(error);
        }

        let generation = self.inner.generation.fetch_add(1, Ordering::AcqRel) + 1;
        *self.inner.subscriber.lock() = Some((generation, sink));
        self.inner.subscribe_count.fetch_add(1, Ordering::AcqRel);

        let inner = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                let mut subscriber = inner.subscriber.lock();
                // A newer subscription must survive an older one being dropped.
                if matches!(subscriber.as_ref(), Some((current, _)) if *current == generation) {
                    *subscriber = None;
                }
            }
        }))
    }

    fn query(&self) -> Result<RawSignal, SourceError> {
        self.inner.query_count.fetch_add(1, Ordering::AcqRel);
        if let Some(error) = self.inner.query_failure.lock().clone() {
            return Err(error);
        }
        Ok(self.inner.current.lock().clone())
    }
}

impl std::fmt::Debug for ManualSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualSource")
            .field("name", &self.inner.name)
            .field("subscribed", &self.is_subscribed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn counting_sink() -> (SignalSink, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        let sink = SignalSink::from_fn(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            true
        });
        (sink, count)
    }

    #[test]
    fn test_push_without_subscriber_records_state() {
        let source = ManualSource::new();
        assert!(!source.push(RawSignal::Reachability(ReachabilityFlags::REACHABLE)));
        assert_eq!(
            source.query().unwrap(),
            RawSignal::Reachability(ReachabilityFlags::REACHABLE)
        );
    }

    #[test]
    fn test_push_reaches_subscriber_until_dropped() {
        let source = ManualSource::new();
        let (sink, count) = counting_sink();
        let subscription = source.subscribe(sink).unwrap();

        assert!(source.push(RawSignal::malformed("x")));
        assert_eq!(count.load(Ordering::SeqCst), 1);

        drop(subscription);
        assert!(!source.is_subscribed());
        assert!(!source.push(RawSignal::malformed("y")));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_subscription_does_not_detach_newer_one() {
        let source = ManualSource::new();
        let (first_sink, _) = counting_sink();
        let (second_sink, second_count) = counting_sink();

        let first = source.subscribe(first_sink).unwrap();
        let _second = source.subscribe(second_sink).unwrap();
        drop(first);

        assert!(source.is_subscribed());
        source.push(RawSignal::malformed("x"));
        assert_eq!(second_count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_fail_next_subscribe_is_one_shot() {
        let source = ManualSource::new();
        source.fail_next_subscribe(SourceError::PermissionDenied("denied".into()));

        let (sink, _) = counting_sink();
        assert_eq!(
            source.subscribe(sink.clone()).unwrap_err(),
            SourceError::PermissionDenied("denied".into())
        );
        assert!(source.subscribe(sink).is_ok());
        assert_eq!(source.subscribe_count(), 1);
    }

    #[test]
    fn test_query_failures() {
        let source = ManualSource::new();
        source.fail_queries(Some(SourceError::QueryFailed("timeout".into())));
        assert!(source.query().is_err());
        source.fail_queries(None);
        assert!(source.query().is_ok());
        assert_eq!(source.query_count(), 2);
    }
}
