//! Synchronization helpers shared by the concurrent queues.

pub mod cancel;

pub use cancel::{CANCEL_POLL_INTERVAL, CancelToken};
