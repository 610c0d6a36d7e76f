//! Queue metrics (feature `metrics`).
//!
//! Every queue variant owns a [`QueueMetrics`](metrics_impl::QueueMetrics)
//! and exposes it through [`MetricsSnapshotProvider`](traits::MetricsSnapshotProvider).

pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
