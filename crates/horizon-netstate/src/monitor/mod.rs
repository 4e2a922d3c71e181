//! The network state monitor.
//!
//! [`NetworkMonitor`] owns the single authoritative [`NetworkSnapshot`]. It
//! subscribes to a [`SignalSource`], translates every delivered signal on a
//! dedicated serial update thread, publishes the result when it differs
//! from the current snapshot and then notifies listeners in registration
//! order.
//!
//! # Threading
//!
//! - State is only ever written from the update thread; readers on any
//!   thread get the published `Arc` without waiting on the update thread.
//! - Listeners run on the update thread, or on the host's context when a
//!   [`NotificationDispatcher`] is configured.
//! - Once [`NetworkMonitor::stop`] returns, no listener is invoked until the
//!   monitor is started again. A listener may call `stop` itself; the
//!   remaining listeners of that round are then skipped.
//!
//! # Example
//!
//! ```
//! use horizon_netstate::{InterfaceKind, ManualSource, NetworkMonitor, NetworkType, PathDescription};
//!
//! let source = ManualSource::new();
//! let monitor = NetworkMonitor::new(source.clone());
//!
//! let id = monitor.add_listener(|snapshot: &std::sync::Arc<horizon_netstate::NetworkSnapshot>| {
//!     println!("network is now {}", snapshot.network_type());
//! });
//!
//! monitor.start()?;
//! source.set_current(PathDescription::satisfied([InterfaceKind::WiredEthernet]).into());
//! assert!(monitor.force_refresh());
//! assert_eq!(monitor.current_state().network_type(), NetworkType::Ethernet);
//!
//! monitor.remove_listener(id);
//! monitor.stop();
//! # Ok::<(), horizon_netstate::MonitorError>(())
//! ```

mod builder;
mod dispatch;
mod listener;

use std::cell::Cell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use horizon_netstate_core::{CancellationToken, PerfSpan, Property, SerialWorker, Signal};
use parking_lot::{Mutex, RwLock};

use crate::config::MonitorConfig;
use crate::error::{MonitorError, Result};
use crate::logging::targets;
use crate::raw::RawSignal;
use crate::source::{SignalSink, SignalSource, Subscription};
use crate::state::{CapabilitySet, LinkDetails, NetworkSnapshot, NetworkType};
use crate::translate::translate;

pub use builder::NetworkMonitorBuilder;
pub use dispatch::{
    ChannelDispatcher, DispatchJob, DispatchQueue, NotificationDispatcher, channel_dispatcher,
};
pub use listener::{ListenerGuard, ListenerId, NetworkStateListener};

thread_local! {
    /// Address of the monitor whose listeners this thread is running, or 0.
    static NOTIFYING: Cell<usize> = const { Cell::new(0) };
}

/// Marks the current thread as running a monitor's listeners.
struct NotifyingScope {
    previous: usize,
}

impl NotifyingScope {
    fn enter(shared: &Shared) -> Self {
        let previous = NOTIFYING.with(|current| current.replace(shared.address()));
        Self { previous }
    }
}

impl Drop for NotifyingScope {
    fn drop(&mut self) {
        NOTIFYING.with(|current| current.set(self.previous));
    }
}

/// Observes host connectivity and notifies listeners of changes.
///
/// See the [module documentation](self) for the threading model.
pub struct NetworkMonitor {
    shared: Arc<Shared>,
}

struct Shared {
    source: Arc<dyn SignalSource>,
    config: MonitorConfig,
    /// The single point of publication.
    state: Property<Arc<NetworkSnapshot>>,
    listeners: Arc<Signal<Arc<NetworkSnapshot>>>,
    dispatcher: Option<Arc<dyn NotificationDispatcher>>,
    session: Mutex<Option<Session>>,
    /// Bumped on every start and stop. Work tagged with an older epoch is
    /// discarded.
    epoch: AtomicU64,
    /// Held shared while listeners run; `stop` takes it exclusively to wait
    /// out a fan-out in progress on another thread.
    fanout: RwLock<()>,
    /// The last snapshot handed to listeners. Lags `state` when a stop
    /// dropped a notification.
    announced: Mutex<Arc<NetworkSnapshot>>,
}

/// Resources of a running monitor.
struct Session {
    worker: Arc<SerialWorker>,
    subscription: Subscription,
    epoch: u64,
}

impl NetworkMonitor {
    /// Create a stopped monitor with the default configuration.
    pub fn new(source: impl SignalSource) -> Self {
        Self::from_parts(Arc::new(source), MonitorConfig::default(), None)
    }

    /// Start building a monitor with custom configuration.
    pub fn builder(source: impl SignalSource) -> NetworkMonitorBuilder {
        NetworkMonitorBuilder::new(source)
    }

    pub(crate) fn from_parts(
        source: Arc<dyn SignalSource>,
        config: MonitorConfig,
        dispatcher: Option<Arc<dyn NotificationDispatcher>>,
    ) -> Self {
        let initial = Arc::new(NetworkSnapshot::default());
        Self {
            shared: Arc::new(Shared {
                source,
                config,
                state: Property::new(initial.clone()),
                listeners: Arc::new(Signal::new()),
                dispatcher,
                session: Mutex::new(None),
                epoch: AtomicU64::new(0),
                fanout: RwLock::new(()),
                announced: Mutex::new(initial),
            }),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Subscribe to the signal source.
    ///
    /// Calling `start` on a running monitor does nothing. When the source
    /// cannot be initialized the error is returned, the monitor stays
    /// stopped with the default disconnected state, and registered listeners
    /// remain registered for a later start.
    ///
    /// If a previous session was stopped before listeners heard about its
    /// last state change, that state is announced first.
    ///
    /// With [`MonitorConfig::query_on_start`] the state is seeded from a
    /// synchronous query before `start` returns.
    pub fn start(&self) -> Result<()> {
        let shared = &self.shared;
        {
            let mut session = shared.session.lock();
            if session.is_some() {
                tracing::debug!(target: targets::MONITOR, "monitor already running");
                return Ok(());
            }

            let worker = match SerialWorker::with_config(shared.config.worker_config()) {
                Ok(worker) => Arc::new(worker),
                Err(error) => {
                    tracing::error!(target: targets::MONITOR, %error, "failed to start update thread");
                    shared.reset_state();
                    return Err(MonitorError::Worker(error));
                }
            };

            let epoch = shared.epoch.fetch_add(1, Ordering::AcqRel) + 1;
            // Runs ahead of any signal of this session.
            let resync = Arc::downgrade(shared);
            let cancel = worker.cancellation_token().clone();
            worker.execute(move || {
                if let Some(shared) = resync.upgrade() {
                    shared.resync(epoch, &cancel);
                }
            });

            let sink = Shared::sink(shared, &worker, epoch);
            let subscription = match shared.source.subscribe(sink) {
                Ok(subscription) => subscription,
                Err(reason) => {
                    shared.epoch.fetch_add(1, Ordering::AcqRel);
                    worker.stop_and_join();
                    shared.reset_state();
                    tracing::error!(
                        target: targets::MONITOR,
                        source = shared.source.name(),
                        error = %reason,
                        "signal source unavailable"
                    );
                    return Err(MonitorError::source_unavailable(shared.source.name(), reason));
                }
            };

            *session = Some(Session {
                worker,
                subscription,
                epoch,
            });
            tracing::info!(target: targets::MONITOR, source = shared.source.name(), "network monitor started");
        }

        if shared.config.query_on_start {
            self.force_refresh();
        }
        Ok(())
    }

    /// Unsubscribe from the signal source.
    ///
    /// Calling `stop` on a stopped monitor does nothing. Signals still queued
    /// are discarded and no listener is invoked after `stop` returns. The
    /// last published state is kept unless
    /// [`MonitorConfig::reset_on_stop`] is set.
    pub fn stop(&self) {
        let shared = &self.shared;
        let Some(Session {
            worker,
            subscription,
            ..
        }) = shared.session.lock().take()
        else {
            tracing::debug!(target: targets::MONITOR, "monitor not running");
            return;
        };

        shared.epoch.fetch_add(1, Ordering::AcqRel);
        worker.stop();
        drop(subscription);

        // A listener stopping its own monitor must not wait for itself.
        if NOTIFYING.with(Cell::get) != shared.address() {
            drop(shared.fanout.write());
        }
        worker.join();

        if shared.config.reset_on_stop {
            shared.reset_state();
        }
        tracing::info!(target: targets::MONITOR, source = shared.source.name(), "network monitor stopped");
    }

    /// Whether the monitor is subscribed to its source.
    pub fn is_running(&self) -> bool {
        self.shared.session.lock().is_some()
    }

    /// Query the source and republish its state immediately.
    ///
    /// Blocks until the query has been translated and, if the state changed,
    /// listeners have been notified (or the notification dispatched). An
    /// unchanged state is not re-announced. A failed query publishes the
    /// unknown state.
    ///
    /// Returns `true` if a new snapshot was published, `false` if nothing
    /// changed or the monitor is not running.
    pub fn force_refresh(&self) -> bool {
        let session = self
            .shared
            .session
            .lock()
            .as_ref()
            .map(|session| (session.worker.clone(), session.epoch));
        let Some((worker, epoch)) = session else {
            tracing::debug!(target: targets::MONITOR, "monitor not running, refresh ignored");
            return false;
        };

        let shared = Arc::downgrade(&self.shared);
        let cancel = worker.cancellation_token().clone();
        worker
            .execute_sync(move || {
                shared
                    .upgrade()
                    .is_some_and(|shared| shared.refresh(epoch, &cancel))
            })
            .unwrap_or(false)
    }

    // ========================================================================
    // Listeners
    // ========================================================================

    /// Register a listener for every state change after this call.
    ///
    /// Each call creates an independent registration: registering the same
    /// listener twice notifies it twice per change.
    pub fn add_listener(&self, listener: impl NetworkStateListener) -> ListenerId {
        let id = self
            .shared
            .listeners
            .connect(move |snapshot| listener.on_state_changed(snapshot));
        tracing::debug!(target: targets::MONITOR, ?id, "listener added");
        id
    }

    /// Unregister a listener. Returns `false` if it was already removed.
    ///
    /// A listener removed while a notification round is in progress is not
    /// invoked for the rest of that round if it has not run yet.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.shared.listeners.disconnect(id);
        if removed {
            tracing::debug!(target: targets::MONITOR, ?id, "listener removed");
        }
        removed
    }

    /// Register a listener that is removed when the guard is dropped.
    pub fn subscribe_scoped(&self, listener: impl NetworkStateListener) -> ListenerGuard {
        let guard = self
            .shared
            .listeners
            .connect_scoped(move |snapshot: &Arc<NetworkSnapshot>| listener.on_state_changed(snapshot));
        ListenerGuard { guard }
    }

    pub fn listener_count(&self) -> usize {
        self.shared.listeners.connection_count()
    }

    // ========================================================================
    // State queries
    // ========================================================================

    /// The latest published snapshot.
    ///
    /// Before the first successful start this is the default disconnected
    /// snapshot.
    pub fn current_state(&self) -> Arc<NetworkSnapshot> {
        self.shared.state.get()
    }

    /// Whether the current snapshot has the given transport.
    ///
    /// Only the five transports can be available; `NetworkType::None` and
    /// `NetworkType::Unknown` never are.
    pub fn is_network_type_available(&self, ty: NetworkType) -> bool {
        self.shared.state.with(|snapshot| snapshot.has_transport(ty))
    }

    /// [`is_network_type_available`](Self::is_network_type_available) for a
    /// lowercase type name. Unrecognized names are never available.
    pub fn is_network_type_available_str(&self, name: &str) -> bool {
        name.parse::<NetworkType>()
            .is_ok_and(|ty| self.is_network_type_available(ty))
    }

    /// Signal strength of the current link, or [`LinkDetails::UNKNOWN`].
    pub fn network_strength(&self) -> i32 {
        self.shared.state.with(|snapshot| snapshot.details().strength)
    }

    pub fn is_network_expensive(&self) -> bool {
        self.shared.state.with(|snapshot| snapshot.is_expensive())
    }

    pub fn is_network_metered(&self) -> bool {
        self.shared.state.with(|snapshot| snapshot.is_metered())
    }

    pub fn is_internet_reachable(&self) -> bool {
        self.shared.state.with(|snapshot| snapshot.is_internet_reachable())
    }

    pub fn is_connected_to_wifi(&self) -> bool {
        self.is_network_type_available(NetworkType::Wifi)
    }

    pub fn is_connected_to_cellular(&self) -> bool {
        self.is_network_type_available(NetworkType::Cellular)
    }

    /// Link details while connected over Wi-Fi.
    pub fn wifi_details(&self) -> Option<LinkDetails> {
        self.shared.state.with(|snapshot| {
            snapshot
                .has_transport(NetworkType::Wifi)
                .then(|| *snapshot.details())
        })
    }

    pub fn capabilities(&self) -> CapabilitySet {
        self.shared.state.with(|snapshot| *snapshot.capabilities())
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.shared.config
    }

    /// Name of the underlying signal source.
    pub fn source_name(&self) -> &str {
        self.shared.source.name()
    }
}

impl Drop for NetworkMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for NetworkMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkMonitor")
            .field("source", &self.source_name())
            .field("running", &self.is_running())
            .field("listeners", &self.listener_count())
            .field("state", &self.current_state())
            .finish()
    }
}

static_assertions::assert_impl_all!(NetworkMonitor: Send, Sync);

impl Shared {
    fn address(&self) -> usize {
        self as *const Self as usize
    }

    fn is_current(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::Acquire) == epoch
    }

    fn reset_state(&self) {
        self.state.set_silent(Arc::new(NetworkSnapshot::default()));
    }

    /// Announce the current state if listeners missed it. Runs on the
    /// update thread as the first task of a session.
    fn resync(self: &Arc<Self>, epoch: u64, cancel: &CancellationToken) {
        if !self.is_current(epoch) {
            return;
        }
        let current = self.state.get();
        if *current == **self.announced.lock() {
            return;
        }
        tracing::debug!(
            target: targets::MONITOR,
            network_type = %current.network_type(),
            "announcing state missed by listeners"
        );
        self.notify(epoch, current, cancel);
    }

    /// The sink handed to the source: queues each signal on the update
    /// thread, tagged with the session epoch.
    fn sink(shared: &Arc<Self>, worker: &Arc<SerialWorker>, epoch: u64) -> SignalSink {
        let shared = Arc::downgrade(shared);
        let worker = Arc::downgrade(worker);
        SignalSink::from_fn(move |signal| {
            let (Some(target), Some(worker)) = (shared.upgrade(), worker.upgrade()) else {
                return false;
            };
            if !target.is_current(epoch) {
                tracing::trace!(target: targets::MONITOR, "signal after stop discarded");
                return false;
            }

            let shared = Arc::downgrade(&target);
            let cancel = worker.cancellation_token().clone();
            worker.execute(move || {
                if let Some(shared) = shared.upgrade() {
                    shared.apply(epoch, &signal, &cancel);
                }
            })
        })
    }

    /// Translate and publish a delivered signal. Runs on the update thread.
    fn apply(self: &Arc<Self>, epoch: u64, signal: &RawSignal, cancel: &CancellationToken) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        let _perf = PerfSpan::new("netstate.apply");

        if let RawSignal::Malformed { reason } = signal {
            tracing::warn!(target: targets::TRANSLATE, %reason, "malformed signal, reporting unknown state");
        }
        let snapshot = translate(signal);
        tracing::trace!(
            target: targets::TRANSLATE,
            kind = signal.kind(),
            network_type = %snapshot.network_type(),
            "signal translated"
        );
        self.publish(epoch, snapshot, cancel)
    }

    /// Query the source and publish the result. Runs on the update thread.
    fn refresh(self: &Arc<Self>, epoch: u64, cancel: &CancellationToken) -> bool {
        if !self.is_current(epoch) {
            return false;
        }
        match self.source.query() {
            Ok(signal) => self.apply(epoch, &signal, cancel),
            Err(error) => {
                tracing::warn!(
                    target: targets::MONITOR,
                    source = self.source.name(),
                    %error,
                    "state query failed, reporting unknown state"
                );
                self.publish(epoch, NetworkSnapshot::unknown(), cancel)
            }
        }
    }

    fn publish(self: &Arc<Self>, epoch: u64, snapshot: NetworkSnapshot, cancel: &CancellationToken) -> bool {
        let snapshot = Arc::new(snapshot);
        let Some(previous) = self.state.replace(snapshot.clone()) else {
            tracing::debug!(target: targets::MONITOR, "state unchanged, notification suppressed");
            return false;
        };

        tracing::info!(
            target: targets::MONITOR,
            network_type = %snapshot.network_type(),
            previous_type = %previous.network_type(),
            is_connected = snapshot.is_connected(),
            is_internet_reachable = snapshot.is_internet_reachable(),
            "network state changed"
        );
        self.notify(epoch, snapshot, cancel);
        true
    }

    fn notify(self: &Arc<Self>, epoch: u64, snapshot: Arc<NetworkSnapshot>, cancel: &CancellationToken) {
        match &self.dispatcher {
            None => self.fan_out(epoch, snapshot, cancel),
            Some(dispatcher) => {
                let shared = Arc::downgrade(self);
                let cancel = cancel.clone();
                dispatcher.dispatch(Box::new(move || {
                    if let Some(shared) = shared.upgrade() {
                        shared.fan_out(epoch, snapshot, &cancel);
                    }
                }));
            }
        }
    }

    fn fan_out(&self, epoch: u64, snapshot: Arc<NetworkSnapshot>, cancel: &CancellationToken) {
        let _gate = self.fanout.read_recursive();
        if !self.is_current(epoch) {
            tracing::debug!(target: targets::MONITOR, "monitor stopped, notification dropped");
            return;
        }

        *self.announced.lock() = snapshot.clone();
        let _scope = NotifyingScope::enter(self);
        let report = self.listeners.emit_until(snapshot, cancel);
        tracing::trace!(
            target: targets::MONITOR,
            delivered = report.delivered,
            failed = report.failed,
            skipped = report.skipped,
            "listeners notified"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::{InterfaceKind, PathDescription};
    use crate::source::ManualSource;

    #[test]
    fn test_new_monitor_is_stopped_and_disconnected() {
        let monitor = NetworkMonitor::new(ManualSource::new());
        assert!(!monitor.is_running());
        assert_eq!(*monitor.current_state(), NetworkSnapshot::disconnected());
        assert_eq!(monitor.network_strength(), LinkDetails::UNKNOWN);
        assert!(!monitor.is_network_type_available(NetworkType::None));
        assert!(!monitor.is_network_type_available_str("none"));
        assert!(!monitor.is_network_type_available_str("unknown"));
        assert!(!monitor.force_refresh());
    }

    #[test]
    fn test_start_seeds_state_from_query() {
        let source = ManualSource::new();
        source.set_current(PathDescription::satisfied([InterfaceKind::Wifi]).into());

        let monitor = NetworkMonitor::new(source.clone());
        monitor.start().unwrap();
        assert!(monitor.is_connected_to_wifi());
        assert_eq!(source.query_count(), 1);
        monitor.stop();
    }

    #[test]
    fn test_query_on_start_disabled() {
        let source = ManualSource::new();
        source.set_current(PathDescription::satisfied([InterfaceKind::Wifi]).into());

        let monitor = NetworkMonitor::builder(source.clone())
            .query_on_start(false)
            .build()
            .unwrap();
        monitor.start().unwrap();
        assert_eq!(source.query_count(), 0);
        assert!(!monitor.is_connected_to_wifi());
    }

    #[test]
    fn test_notifying_scope_restores_previous() {
        let monitor = NetworkMonitor::new(ManualSource::new());
        assert_eq!(NOTIFYING.with(Cell::get), 0);
        {
            let _scope = NotifyingScope::enter(&monitor.shared);
            assert_eq!(NOTIFYING.with(Cell::get), monitor.shared.address());
        }
        assert_eq!(NOTIFYING.with(Cell::get), 0);
    }

    #[test]
    fn test_drop_stops_monitor() {
        let source = ManualSource::new();
        let monitor = NetworkMonitor::new(source.clone());
        monitor.start().unwrap();
        assert!(source.is_subscribed());
        drop(monitor);
        assert!(!source.is_subscribed());
    }

    #[test]
    fn test_change_published_across_stop_is_announced_on_restart() {
        let source = ManualSource::new();
        source.set_current(PathDescription::satisfied([InterfaceKind::Wifi]).into());
        let monitor = NetworkMonitor::builder(source.clone())
            .query_on_start(false)
            .build()
            .unwrap();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        monitor.add_listener(move |snapshot: &Arc<NetworkSnapshot>| {
            received_clone.lock().push(snapshot.network_type());
        });
        monitor.start().unwrap();

        // A publish whose fan-out lost the race against stop.
        let stale = monitor.shared.epoch.load(Ordering::Acquire) - 1;
        let wifi = translate(&source.query().unwrap());
        assert!(monitor.shared.publish(stale, wifi, &CancellationToken::new()));
        assert!(received.lock().is_empty());
        monitor.stop();

        monitor.start().unwrap();
        // Settles behind the announcement queued by start.
        monitor.force_refresh();
        assert_eq!(*received.lock(), vec![NetworkType::Wifi]);

        monitor.stop();
        monitor.start().unwrap();
        monitor.force_refresh();
        assert_eq!(received.lock().len(), 1);
    }
}
