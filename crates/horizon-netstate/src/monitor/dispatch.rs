//! Marshalling of listener notifications onto a host-chosen context.
//!
//! By default listeners run on the monitor's serial update thread. Hosts
//! whose callbacks conventionally fire on a specific thread (a UI thread, an
//! event loop) install a [`NotificationDispatcher`] instead. State updates
//! stay on the update thread either way; only the fan-out moves.

use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};

/// A boxed notification job.
pub type DispatchJob = Box<dyn FnOnce() + Send + 'static>;

/// Runs notification jobs on the host's preferred context.
///
/// Jobs must run in the order they are dispatched.
pub trait NotificationDispatcher: Send + Sync + 'static {
    fn dispatch(&self, job: DispatchJob);
}

/// Create a dispatcher that posts jobs to a [`DispatchQueue`].
///
/// The queue is drained by whichever thread the host wants notifications
/// on, typically from its event loop.
pub fn channel_dispatcher() -> (ChannelDispatcher, DispatchQueue) {
    let (sender, receiver) = unbounded();
    (ChannelDispatcher { sender }, DispatchQueue { receiver })
}

/// The posting half of [`channel_dispatcher`].
#[derive(Debug, Clone)]
pub struct ChannelDispatcher {
    sender: Sender<DispatchJob>,
}

impl NotificationDispatcher for ChannelDispatcher {
    fn dispatch(&self, job: DispatchJob) {
        if self.sender.send(job).is_err() {
            tracing::debug!(target: crate::logging::targets::MONITOR, "dispatch queue dropped, notification discarded");
        }
    }
}

/// The draining half of [`channel_dispatcher`].
#[derive(Debug)]
pub struct DispatchQueue {
    receiver: Receiver<DispatchJob>,
}

impl DispatchQueue {
    /// Run every job queued so far. Returns the number of jobs run.
    pub fn run_pending(&self) -> usize {
        let mut count = 0;
        while let Ok(job) = self.receiver.try_recv() {
            job();
            count += 1;
        }
        count
    }

    /// Wait up to `timeout` for one job and run it.
    ///
    /// Returns `false` on timeout or when every dispatcher is gone.
    pub fn run_next_timeout(&self, timeout: Duration) -> bool {
        match self.receiver.recv_timeout(timeout) {
            Ok(job) => {
                job();
                true
            }
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => false,
        }
    }

    /// Number of queued jobs.
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn test_jobs_run_in_order_on_drain() {
        let (dispatcher, queue) = channel_dispatcher();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..3 {
            let order_clone = order.clone();
            dispatcher.dispatch(Box::new(move || order_clone.lock().push(i)));
        }

        assert_eq!(queue.len(), 3);
        assert!(order.lock().is_empty());
        assert_eq!(queue.run_pending(), 3);
        assert_eq!(*order.lock(), vec![0, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_run_next_timeout() {
        let (dispatcher, queue) = channel_dispatcher();
        assert!(!queue.run_next_timeout(Duration::from_millis(10)));

        dispatcher.dispatch(Box::new(|| {}));
        assert!(queue.run_next_timeout(Duration::from_millis(10)));

        drop(dispatcher);
        assert!(!queue.run_next_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn test_dispatch_after_queue_dropped_is_harmless() {
        let (dispatcher, queue) = channel_dispatcher();
        drop(queue);
        dispatcher.dispatch(Box::new(|| panic!("must not run")));
    }
}
