//! Listener registration types.

use std::sync::Arc;

use horizon_netstate_core::{ConnectionGuard, ConnectionId};

use crate::state::NetworkSnapshot;

/// Handle returned by [`NetworkMonitor::add_listener`](super::NetworkMonitor::add_listener).
pub type ListenerId = ConnectionId;

/// Receives network state changes.
///
/// Implemented for every `Fn(&Arc<NetworkSnapshot>) + Send + Sync` closure,
/// so most callers never implement it by hand.
pub trait NetworkStateListener: Send + Sync + 'static {
    fn on_state_changed(&self, snapshot: &Arc<NetworkSnapshot>);
}

impl<F> NetworkStateListener for F
where
    F: Fn(&Arc<NetworkSnapshot>) + Send + Sync + 'static,
{
    fn on_state_changed(&self, snapshot: &Arc<NetworkSnapshot>) {
        self(snapshot)
    }
}

/// Removes its listener when dropped.
///
/// Created by [`NetworkMonitor::subscribe_scoped`](super::NetworkMonitor::subscribe_scoped).
/// The guard does not keep the monitor alive.
#[must_use = "dropping a ListenerGuard removes the listener immediately"]
#[derive(Debug)]
pub struct ListenerGuard {
    pub(super) guard: ConnectionGuard<Arc<NetworkSnapshot>>,
}

impl ListenerGuard {
    pub fn id(&self) -> ListenerId {
        self.guard.id()
    }

    /// Keep the listener registered past the guard's lifetime.
    pub fn forget(self) -> ListenerId {
        self.guard.forget()
    }
}
