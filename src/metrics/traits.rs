//! # Metrics Trait Hierarchy
//!
//! Separates *recording*, *snapshotting*, and *export* into small traits so
//! queue code only ever writes counters.
//!
//! ```text
//!   ┌─────────────────────────────┐
//!   │    QueueMetricsRecorder     │   written by MriQueue, LockedMriQueue,
//!   │  offer/evict/poll/take/...  │   BlockingMriQueue on every operation
//!   └──────────────┬──────────────┘
//!                  │
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Recorders take `&self`: the blocking queue records from both the put and
//! the take side without holding a common lock, so counters are atomics.

/// Counters shared by every queue variant.
pub trait QueueMetricsRecorder {
    fn record_offer(&self);
    fn record_eviction(&self);
    fn record_poll_hit(&self);
    fn record_poll_miss(&self);
    fn record_take(&self);
    fn record_timeout(&self);
    fn record_cancellation(&self);
    fn record_drain(&self, moved: usize);
    fn record_remove_call(&self);
    fn record_remove_found(&self);
    fn record_clear(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&self);
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
