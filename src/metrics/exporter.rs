use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::QueueMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for queue metrics snapshots.
///
/// Writes the Prometheus text exposition format so the output can be scraped
/// directly or forwarded to a collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Consumes the exporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_metric(&self, kind: &str, name: &str, value: u64) {
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_metric("counter", &self.metric_name(suffix), value);
    }

    fn write_gauge(&self, suffix: &str, value: u64) {
        self.write_metric("gauge", &self.metric_name(suffix), value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<QueueMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &QueueMetricsSnapshot) {
        self.write_counter("offer_calls_total", snapshot.offer_calls);
        self.write_counter("evictions_total", snapshot.evictions);
        self.write_counter("poll_hits_total", snapshot.poll_hits);
        self.write_counter("poll_misses_total", snapshot.poll_misses);
        self.write_counter("takes_total", snapshot.takes);
        self.write_counter("timeouts_total", snapshot.timeouts);
        self.write_counter("cancellations_total", snapshot.cancellations);
        self.write_counter("drain_calls_total", snapshot.drain_calls);
        self.write_counter("drained_entries_total", snapshot.drained_entries);
        self.write_counter("remove_calls_total", snapshot.remove_calls);
        self.write_counter("remove_found_total", snapshot.remove_found);
        self.write_counter("clear_calls_total", snapshot.clear_calls);
        self.write_gauge("len", snapshot.len as u64);
        self.write_gauge("capacity", snapshot.capacity as u64);
    }
}
