use std::sync::atomic::{AtomicU64, Ordering};

use crate::metrics::snapshot::QueueMetricsSnapshot;
use crate::metrics::traits::{MetricsReset, QueueMetricsRecorder};

/// Atomic counters recorded by every queue variant.
#[derive(Debug, Default)]
pub struct QueueMetrics {
    pub offer_calls: AtomicU64,
    pub evictions: AtomicU64,
    pub poll_hits: AtomicU64,
    pub poll_misses: AtomicU64,
    pub takes: AtomicU64,
    pub timeouts: AtomicU64,
    pub cancellations: AtomicU64,
    pub drain_calls: AtomicU64,
    pub drained_entries: AtomicU64,
    pub remove_calls: AtomicU64,
    pub remove_found: AtomicU64,
    pub clear_calls: AtomicU64,
}

#[inline]
fn bump(counter: &AtomicU64) {
    counter.fetch_add(1, Ordering::Relaxed);
}

impl QueueMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the counters; `len` and `capacity` are supplied by the queue.
    pub fn snapshot(&self, len: usize, capacity: usize) -> QueueMetricsSnapshot {
        QueueMetricsSnapshot {
            offer_calls: self.offer_calls.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            poll_hits: self.poll_hits.load(Ordering::Relaxed),
            poll_misses: self.poll_misses.load(Ordering::Relaxed),
            takes: self.takes.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            cancellations: self.cancellations.load(Ordering::Relaxed),
            drain_calls: self.drain_calls.load(Ordering::Relaxed),
            drained_entries: self.drained_entries.load(Ordering::Relaxed),
            remove_calls: self.remove_calls.load(Ordering::Relaxed),
            remove_found: self.remove_found.load(Ordering::Relaxed),
            clear_calls: self.clear_calls.load(Ordering::Relaxed),
            len,
            capacity,
        }
    }
}

impl QueueMetricsRecorder for QueueMetrics {
    fn record_offer(&self) {
        bump(&self.offer_calls);
    }

    fn record_eviction(&self) {
        bump(&self.evictions);
    }

    fn record_poll_hit(&self) {
        bump(&self.poll_hits);
    }

    fn record_poll_miss(&self) {
        bump(&self.poll_misses);
    }

    fn record_take(&self) {
        bump(&self.takes);
    }

    fn record_timeout(&self) {
        bump(&self.timeouts);
    }

    fn record_cancellation(&self) {
        bump(&self.cancellations);
    }

    fn record_drain(&self, moved: usize) {
        bump(&self.drain_calls);
        self.drained_entries
            .fetch_add(moved as u64, Ordering::Relaxed);
    }

    fn record_remove_call(&self) {
        bump(&self.remove_calls);
    }

    fn record_remove_found(&self) {
        bump(&self.remove_found);
    }

    fn record_clear(&self) {
        bump(&self.clear_calls);
    }
}

impl MetricsReset for QueueMetrics {
    fn reset_metrics(&self) {
        for counter in [
            &self.offer_calls,
            &self.evictions,
            &self.poll_hits,
            &self.poll_misses,
            &self.takes,
            &self.timeouts,
            &self.cancellations,
            &self.drain_calls,
            &self.drained_entries,
            &self.remove_calls,
            &self.remove_found,
            &self.clear_calls,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
