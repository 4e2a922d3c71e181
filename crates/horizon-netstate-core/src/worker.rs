//! Dedicated serial worker thread.
//!
//! A [`SerialWorker`] owns one background thread and a FIFO task queue. Tasks
//! run one at a time, in submission order, which makes the worker a serial
//! execution context: state that is only mutated from worker tasks needs no
//! further locking against itself.
//!
//! # Example
//!
//! ```no_run
//! use horizon_netstate_core::worker::{SerialWorker, WorkerConfig};
//!
//! let worker = SerialWorker::with_config(WorkerConfig {
//!     name: "state-updates".to_string(),
//!     ..Default::default()
//! })?;
//!
//! worker.execute(|| println!("runs on the worker thread"));
//!
//! // Block until a task has run and hand its result back.
//! let answer = worker.execute_sync(|| 6 * 7);
//! assert_eq!(answer, Some(42));
//!
//! // Drain queued tasks and wait for the thread to exit.
//! worker.stop_and_join();
//! # Ok::<(), horizon_netstate_core::WorkerError>(())
//! ```

use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle, ThreadId};

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded, unbounded};
use parking_lot::Mutex;

use crate::cancellation::CancellationToken;
use crate::error::WorkerError;
use crate::signal::panic_message;

/// Configuration for creating a worker.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Name for the worker thread.
    pub name: String,
    /// Stack size for the worker thread in bytes. `None` uses the default.
    pub stack_size: Option<usize>,
    /// Capacity of the task queue. `None` means unbounded.
    ///
    /// With a bound, submitting to a full queue blocks the submitting thread
    /// until the worker catches up.
    pub queue_capacity: Option<usize>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            name: "netstate-worker".to_string(),
            stack_size: None,
            queue_capacity: None,
        }
    }
}

/// Internal state shared between the worker handle and worker thread.
struct WorkerState {
    /// Whether the worker accepts new tasks.
    running: AtomicBool,
    /// Cancellation token for cooperative shutdown.
    cancellation: CancellationToken,
    /// Count of queued tasks that have not finished yet.
    pending_tasks: AtomicUsize,
}

/// A task sent to the worker.
enum WorkerTask {
    /// Execute a job.
    Execute(Box<dyn FnOnce() + Send>),
    /// Drain the queue and exit.
    Shutdown,
}

/// A dedicated worker thread with its own FIFO task queue.
///
/// `SerialWorker` is `Send + Sync`; any thread may submit tasks.
pub struct SerialWorker {
    /// Channel sender for submitting tasks.
    task_sender: Sender<WorkerTask>,
    /// Whether the queue is bounded (and sends may block).
    bounded: bool,
    /// Thread handle for joining.
    handle: Mutex<Option<JoinHandle<()>>>,
    /// Identity of the worker thread.
    thread_id: ThreadId,
    /// Shared state with the worker thread.
    state: Arc<WorkerState>,
}

impl SerialWorker {
    /// Create a new worker with default configuration.
    pub fn new() -> Result<Self, WorkerError> {
        Self::with_config(WorkerConfig::default())
    }

    /// Create a new worker with custom configuration.
    ///
    /// The worker thread starts immediately.
    pub fn with_config(config: WorkerConfig) -> Result<Self, WorkerError> {
        let (sender, receiver) = match config.queue_capacity {
            Some(capacity) => bounded(capacity.max(1)),
            None => unbounded(),
        };
        let state = Arc::new(WorkerState {
            running: AtomicBool::new(true),
            cancellation: CancellationToken::new(),
            pending_tasks: AtomicUsize::new(0),
        });

        let thread_state = state.clone();
        let mut builder = thread::Builder::new().name(config.name.clone());
        if let Some(stack_size) = config.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder
            .spawn(move || {
                worker_loop(receiver, &thread_state);
                thread_state.running.store(false, Ordering::Release);
            })
            .map_err(WorkerError::SpawnFailed)?;

        crate::netstate_debug!(name = %config.name, "worker thread started");

        Ok(Self {
            task_sender: sender,
            bounded: config.queue_capacity.is_some(),
            thread_id: handle.thread().id(),
            handle: Mutex::new(Some(handle)),
            state,
        })
    }

    /// Check if the worker still accepts tasks.
    pub fn is_running(&self) -> bool {
        self.state.running.load(Ordering::Acquire)
    }

    /// Get the number of queued tasks that have not finished yet.
    pub fn pending_tasks(&self) -> usize {
        self.state.pending_tasks.load(Ordering::Acquire)
    }

    /// Check whether the calling thread is this worker's thread.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Get the cancellation token for this worker.
    ///
    /// The token is cancelled by [`stop`](Self::stop).
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.state.cancellation
    }

    /// Queue a task for execution on the worker thread.
    ///
    /// Returns `true` if the task was queued, `false` if the worker has been
    /// stopped. A task that panics is logged and does not take the worker
    /// down.
    pub fn execute<F>(&self, task: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        if !self.is_running() {
            return false;
        }

        self.state.pending_tasks.fetch_add(1, Ordering::AcqRel);
        if self.submit(WorkerTask::Execute(Box::new(task))) {
            true
        } else {
            self.state.pending_tasks.fetch_sub(1, Ordering::AcqRel);
            false
        }
    }

    /// Run a task on the worker thread and block until it completes,
    /// returning its result.
    ///
    /// When called from the worker thread itself the task runs inline, so a
    /// task may safely call back into code that uses `execute_sync`.
    ///
    /// Returns `None` if the worker has been stopped or the task panicked.
    pub fn execute_sync<F, R>(&self, task: F) -> Option<R>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        if !self.is_running() {
            return None;
        }
        if self.is_current() {
            return Some(task());
        }

        let (result_sender, result_receiver) = bounded(1);
        let queued = self.execute(move || {
            let _ = result_sender.send(task());
        });

        if queued {
            result_receiver.recv().ok()
        } else {
            None
        }
    }

    /// Request the worker to stop after processing already queued tasks.
    ///
    /// This is a non-blocking call. After it returns no new tasks are
    /// accepted. Use [`join`](Self::join) to wait for the thread to exit.
    pub fn stop(&self) {
        if !self.state.running.swap(false, Ordering::AcqRel) {
            return;
        }
        self.state.cancellation.cancel();
        if !self.submit(WorkerTask::Shutdown) {
            crate::netstate_warn!("worker queue closed before shutdown request");
        }
    }

    /// Wait for the worker thread to finish.
    ///
    /// Returns `true` if the worker was joined successfully, `false` if it was
    /// already joined, the thread panicked, or this is called from the worker
    /// thread itself (which cannot join itself).
    pub fn join(&self) -> bool {
        if self.is_current() {
            return false;
        }
        let handle = self.handle.lock().take();
        match handle {
            Some(handle) => handle.join().is_ok(),
            None => false,
        }
    }

    /// Stop the worker and wait for it to finish.
    pub fn stop_and_join(&self) -> bool {
        self.stop();
        self.join()
    }

    fn submit(&self, task: WorkerTask) -> bool {
        // A bounded queue must never block the worker on itself.
        if self.bounded && self.is_current() {
            match self.task_sender.try_send(task) {
                Ok(()) => true,
                Err(TrySendError::Full(_)) => {
                    crate::netstate_warn!("worker queue full, dropping task submitted from worker thread");
                    false
                }
                Err(TrySendError::Disconnected(_)) => false,
            }
        } else {
            self.task_sender.send(task).is_ok()
        }
    }
}

impl Drop for SerialWorker {
    fn drop(&mut self) {
        self.stop();
        // Don't block in drop - just request shutdown
    }
}

impl std::fmt::Debug for SerialWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialWorker")
            .field("thread_id", &self.thread_id)
            .field("running", &self.is_running())
            .field("pending_tasks", &self.pending_tasks())
            .finish()
    }
}

static_assertions::assert_impl_all!(SerialWorker: Send, Sync);

/// The main worker loop that processes tasks.
fn worker_loop(receiver: Receiver<WorkerTask>, state: &WorkerState) {
    while let Ok(task) = receiver.recv() {
        match task {
            WorkerTask::Execute(job) => run_job(job, state),
            WorkerTask::Shutdown => {
                // Process remaining tasks before exiting
                while let Ok(task) = receiver.try_recv() {
                    if let WorkerTask::Execute(job) = task {
                        run_job(job, state);
                    }
                }
                break;
            }
        }
    }
    crate::netstate_debug!("worker thread exiting");
}

fn run_job(job: Box<dyn FnOnce() + Send>, state: &WorkerState) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
        crate::netstate_error!(panic = panic_message(payload.as_ref()), "worker task panicked");
    }
    state.pending_tasks.fetch_sub(1, Ordering::AcqRel);
}
