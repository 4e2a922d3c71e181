//! Core primitives for Horizon NetState.
//!
//! This crate provides the building blocks the network state monitor is made
//! of. None of them know anything about networks:
//!
//! - **Signal/Slot System**: ordered, panic-isolating listener registry
//! - **Property System**: change-tracked values with atomic replacement
//! - **Serial Worker**: a dedicated thread with a FIFO task queue
//! - **Cancellation**: cooperative cancellation tokens
//!
//! # Example
//!
//! ```
//! use horizon_netstate_core::{Property, Signal};
//!
//! let value = Property::new(0);
//! let value_changed = Signal::<i32>::new();
//!
//! value_changed.connect(|value| println!("Value changed to: {}", value));
//!
//! if value.set(42) {
//!     value_changed.emit(42);
//! }
//! ```

mod cancellation;
mod error;
pub mod logging;
pub mod property;
pub mod signal;
pub mod worker;

pub use cancellation::CancellationToken;
pub use error::WorkerError;
pub use logging::PerfSpan;
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, EmitReport, Signal};
pub use worker::{SerialWorker, WorkerConfig};
