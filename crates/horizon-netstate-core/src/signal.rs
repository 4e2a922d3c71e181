//! Ordered signal/listener registry for Horizon NetState.
//!
//! A [`Signal<Args>`] holds a set of connected slots (callbacks) and invokes
//! them, in connection order, every time it is emitted.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type used for emitting notifications
//! - [`ConnectionId`] - Unique identifier returned when connecting a slot
//! - [`ConnectionGuard`] - RAII guard that disconnects when dropped
//! - [`EmitReport`] - Outcome of a single emission
//!
//! # Delivery Guarantees
//!
//! - Slots run in the order they were connected.
//! - Connecting the same closure twice yields two independent connections,
//!   each of which is invoked.
//! - The registry lock is *not* held while slots run. A slot may connect or
//!   disconnect (itself or others) while an emission is in progress; a slot
//!   disconnected mid-emission is not invoked for the rest of that emission.
//! - A panicking slot is isolated: the panic is caught and logged, and the
//!   remaining slots are still invoked.
//!
//! # Example
//!
//! ```
//! use horizon_netstate_core::Signal;
//!
//! let state_changed = Signal::<String>::new();
//!
//! let conn_id = state_changed.connect(|text| {
//!     println!("State changed to: {}", text);
//! });
//!
//! state_changed.emit("wifi".to_string());
//! state_changed.disconnect(conn_id);
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::cancellation::CancellationToken;
use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    /// IDs are never reused: once disconnected, an ID stays invalid even if
    /// its storage slot is recycled for a later connection.
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Connected slots plus their connection order.
struct Registry<Args> {
    slots: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

impl<Args> Registry<Args> {
    fn new() -> Self {
        Self {
            slots: SlotMap::with_key(),
            order: Vec::new(),
        }
    }

    /// Clone out the current slots in connection order.
    fn ordered_slots(&self) -> Vec<(ConnectionId, Slot<Args>)> {
        self.order
            .iter()
            .filter_map(|id| self.slots.get(*id).map(|slot| (*id, Arc::clone(slot))))
            .collect()
    }
}

/// Outcome of a single [`Signal`] emission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmitReport {
    /// Slots that ran to completion.
    pub delivered: usize,
    /// Slots that panicked.
    pub failed: usize,
    /// Slots that were skipped because they were disconnected mid-emission
    /// or the emission was cancelled.
    pub skipped: usize,
}

impl EmitReport {
    /// Total number of slots the emission considered.
    pub fn total(&self) -> usize {
        self.delivered + self.failed + self.skipped
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// `Signal<Args>` is `Send + Sync` and can be shared between threads, usually
/// behind an `Arc`.
pub struct Signal<Args> {
    registry: Mutex<Registry<Args>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            registry: Mutex::new(Registry::new()),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut registry = self.registry.lock();
        let id = registry.slots.insert(Arc::new(slot));
        registry.order.push(id);
        tracing::trace!(target: targets::SIGNAL, ?id, connection_count = registry.slots.len(), "slot connected");
        id
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` if it
    /// was already disconnected.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut registry = self.registry.lock();
        if registry.slots.remove(id).is_some() {
            registry.order.retain(|existing| *existing != id);
            tracing::trace!(target: targets::SIGNAL, ?id, "slot disconnected");
            true
        } else {
            false
        }
    }

    /// Check whether a connection is still active.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.registry.lock().slots.contains_key(id)
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.registry.lock().slots.len()
    }

    /// Emit the signal, invoking all connected slots in connection order.
    pub fn emit(&self, args: Args) -> EmitReport {
        self.emit_until(args, &CancellationToken::new())
    }

    /// Emit the signal, stopping before the next slot once `cancel` is set.
    ///
    /// Slots not invoked because of cancellation are counted as skipped.
    #[tracing::instrument(skip_all, target = "horizon_netstate_core::signal", level = "trace")]
    pub fn emit_until(&self, args: Args, cancel: &CancellationToken) -> EmitReport {
        let mut report = EmitReport::default();
        // Snapshot the slots so the lock is released while they run.
        let slots = self.registry.lock().ordered_slots();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for (id, slot) in slots {
            if cancel.is_cancelled() {
                report.skipped += 1;
                continue;
            }
            if !self.is_connected(id) {
                report.skipped += 1;
                continue;
            }

            match panic::catch_unwind(AssertUnwindSafe(|| slot(&args))) {
                Ok(()) => report.delivered += 1,
                Err(payload) => {
                    report.failed += 1;
                    tracing::error!(
                        target: targets::SIGNAL,
                        ?id,
                        panic = panic_message(payload.as_ref()),
                        "slot panicked during emission"
                    );
                }
            }
        }

        report
    }
}

impl<Args: 'static> Signal<Args> {
    /// Connect a slot that is disconnected automatically when the returned
    /// guard is dropped.
    ///
    /// The guard holds only a weak reference, so it never keeps the signal
    /// alive and is harmless if it outlives it.
    pub fn connect_scoped<F>(self: &Arc<Self>, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            signal: Arc::downgrade(self),
            id,
        }
    }
}

/// A connection guard that automatically disconnects when dropped.
///
/// Created via [`Signal::connect_scoped`].
///
/// # Example
///
/// ```
/// use horizon_netstate_core::Signal;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use std::sync::Arc;
///
/// let signal = Arc::new(Signal::<i32>::new());
/// let counter = Arc::new(AtomicI32::new(0));
/// {
///     let counter_clone = counter.clone();
///     let _guard = signal.connect_scoped(move |&n| {
///         counter_clone.fetch_add(n, Ordering::SeqCst);
///     });
///     signal.emit(42);
/// }
/// signal.emit(43); // Nothing happens - connection was dropped
/// assert_eq!(counter.load(Ordering::SeqCst), 42);
/// ```
pub struct ConnectionGuard<Args: 'static> {
    signal: Weak<Signal<Args>>,
    id: ConnectionId,
}

impl<Args: 'static> ConnectionGuard<Args> {
    /// The ID of the guarded connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Release the connection without disconnecting it.
    pub fn forget(mut self) -> ConnectionId {
        self.signal = Weak::new();
        self.id
    }
}

impl<Args: 'static> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.upgrade() {
            signal.disconnect(self.id);
        }
    }
}

impl<Args: 'static> std::fmt::Debug for ConnectionGuard<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard").field("id", &self.id).finish()
    }
}

static_assertions::assert_impl_all!(Signal<u32>: Send, Sync);

/// Best-effort extraction of a panic payload message.
pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_signal_connect_emit() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(42);
        signal.emit(100);

        assert_eq!(*received.lock(), vec![42, 100]);
    }

    #[test]
    fn test_signal_disconnect() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);
        assert!(signal.disconnect(conn_id));
        assert!(!signal.disconnect(conn_id), "second disconnect is a no-op");
        signal.emit(2);

        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_emission_follows_connection_order() {
        let signal = Signal::<()>::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        let ids: Vec<_> = (0..4)
            .map(|i| {
                let order = order.clone();
                signal.connect(move |_| order.lock().push(i))
            })
            .collect();

        // Free a storage slot, then connect again: the new slot may reuse the
        // freed storage but must still run last.
        signal.disconnect(ids[1]);
        let order_clone = order.clone();
        signal.connect(move |_| order_clone.lock().push(99));

        signal.emit(());
        assert_eq!(*order.lock(), vec![0, 2, 3, 99]);
    }

    #[test]
    fn test_duplicate_connections_are_independent() {
        let signal = Signal::<()>::new();
        let count = Arc::new(AtomicUsize::new(0));

        let slot = {
            let count = count.clone();
            move |_: &()| {
                count.fetch_add(1, Ordering::SeqCst);
            }
        };
        let first = signal.connect(slot.clone());
        let second = signal.connect(slot);
        assert_ne!(first, second);

        signal.emit(());
        assert_eq!(count.load(Ordering::SeqCst), 2);

        signal.disconnect(first);
        signal.emit(());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_panicking_slot_is_isolated() {
        let signal = Signal::<i32>::new();
        let received = Arc::new(Mutex::new(Vec::new()));

        signal.connect(|_| panic!("listener failure"));
        let received_clone = received.clone();
        signal.connect(move |&value| received_clone.lock().push(value));

        let report = signal.emit(7);
        assert_eq!(report.failed, 1);
        assert_eq!(report.delivered, 1);
        assert_eq!(*received.lock(), vec![7]);

        // The signal keeps working after a panic.
        signal.emit(8);
        assert_eq!(*received.lock(), vec![7, 8]);
    }

    #[test]
    fn test_disconnect_during_emission() {
        let signal = Arc::new(Signal::<i32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));
        let victim = Arc::new(Mutex::new(None::<ConnectionId>));

        // First slot removes the second one mid-emission.
        let signal_clone = signal.clone();
        let victim_clone = victim.clone();
        signal.connect(move |_| {
            if let Some(id) = victim_clone.lock().take() {
                signal_clone.disconnect(id);
            }
        });

        let received_clone = received.clone();
        let id = signal.connect(move |&value| received_clone.lock().push(value));
        *victim.lock() = Some(id);

        let report = signal.emit(1);
        assert_eq!(report.skipped, 1);
        signal.emit(2);

        assert!(received.lock().is_empty());
        assert_eq!(signal.connection_count(), 1);
    }

    #[test]
    fn test_connect_during_emission_does_not_deadlock() {
        let signal = Arc::new(Signal::<()>::new());
        let signal_clone = signal.clone();
        signal.connect(move |_| {
            signal_clone.connect(|_| {});
        });

        signal.emit(());
        assert_eq!(signal.connection_count(), 2);
    }

    #[test]
    fn test_emit_until_cancelled() {
        let signal = Signal::<()>::new();
        let token = CancellationToken::new();
        let count = Arc::new(AtomicUsize::new(0));

        let token_clone = token.clone();
        let count_clone = count.clone();
        signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            token_clone.cancel();
        });
        let count_clone = count.clone();
        signal.connect(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        let report = signal.emit_until((), &token);
        assert_eq!(report.delivered, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.total(), 2);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_connection_guard() {
        let signal = Arc::new(Signal::<i32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        {
            let received_clone = received.clone();
            let _guard = signal.connect_scoped(move |&value| {
                received_clone.lock().push(value);
            });
            signal.emit(1);
        }

        signal.emit(2);
        assert_eq!(*received.lock(), vec![1]);
    }

    #[test]
    fn test_connection_guard_outlives_signal() {
        let signal = Arc::new(Signal::<i32>::new());
        let guard = signal.connect_scoped(|_| {});
        drop(signal);
        drop(guard);
    }

    #[test]
    fn test_connection_guard_forget() {
        let signal = Arc::new(Signal::<i32>::new());
        let guard = signal.connect_scoped(|_| {});
        let id = guard.forget();
        assert!(signal.is_connected(id));
    }

    #[test]
    fn test_emit_from_multiple_threads() {
        let signal = Arc::new(Signal::<i32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        let mut handles = vec![];
        for i in 0..10 {
            let signal_clone = signal.clone();
            handles.push(std::thread::spawn(move || {
                signal_clone.emit(i);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        let values = received.lock();
        assert_eq!(values.len(), 10);
        for i in 0..10 {
            assert!(values.contains(&i), "Missing value {}", i);
        }
    }

    #[test]
    fn test_disconnect_from_different_thread() {
        let signal = Arc::new(Signal::<i32>::new());
        let received = Arc::new(Mutex::new(Vec::new()));

        let received_clone = received.clone();
        let conn_id = signal.connect(move |&value| {
            received_clone.lock().push(value);
        });

        signal.emit(1);

        let signal_clone = signal.clone();
        let disconnected = std::thread::spawn(move || signal_clone.disconnect(conn_id))
            .join()
            .unwrap();
        assert!(disconnected);

        signal.emit(2);
        assert_eq!(*received.lock(), vec![1]);
    }
}
