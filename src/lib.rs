//! mriqueue: bounded most-recently-inserted queues.
//!
//! A most-recently-inserted (MRI) queue is a FIFO queue with a fixed capacity
//! that never rejects an insertion: when it is full, the oldest element is
//! evicted to make room. Three variants share that contract:
//!
//! - [`MriQueue`]: single-threaded, `&mut self`.
//! - [`LockedMriQueue`]: one mutex around an `MriQueue`.
//! - [`BlockingMriQueue`]: two-lock producer/consumer queue with blocking,
//!   timed and cancellable retrieval.
//!
//! See `DESIGN.md` for internal architecture and invariants.

pub mod builder;
pub mod ds;
pub mod error;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod queue;

#[cfg(feature = "concurrency")]
pub mod sync;

pub mod traits;

pub use crate::ds::{ChainCursor, NodeChain, SlotArena, SlotId};
pub use crate::error::{ArgumentError, ConfigError, Interrupted, InvariantError, StateError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::QueueMetricsSnapshot;
#[cfg(feature = "concurrency")]
pub use crate::queue::blocking::BlockingMriQueue;
#[cfg(feature = "concurrency")]
pub use crate::queue::locked::LockedMriQueue;
pub use crate::queue::mri::MriQueue;
#[cfg(feature = "concurrency")]
pub use crate::sync::CancelToken;
