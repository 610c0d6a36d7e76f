/// Point-in-time copy of a queue's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct QueueMetricsSnapshot {
    pub offer_calls: u64,
    pub evictions: u64,

    pub poll_hits: u64,
    pub poll_misses: u64,
    pub takes: u64,
    pub timeouts: u64,
    pub cancellations: u64,

    pub drain_calls: u64,
    pub drained_entries: u64,

    pub remove_calls: u64,
    pub remove_found: u64,
    pub clear_calls: u64,

    // gauges captured at snapshot time
    pub len: usize,
    pub capacity: usize,
}

impl QueueMetricsSnapshot {
    /// Values that left the queue through a consumer (poll, take, drain).
    pub fn consumed(&self) -> u64 {
        self.poll_hits + self.takes + self.drained_entries
    }
}
