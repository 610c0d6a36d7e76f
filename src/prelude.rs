pub use crate::builder::QueueBuilder;
#[cfg(feature = "concurrency")]
pub use crate::builder::{AnyQueue, QueueKind};
pub use crate::error::{ArgumentError, ConfigError, Interrupted, InvariantError, StateError};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::QueueMetricsSnapshot;
#[cfg(feature = "metrics")]
pub use crate::metrics::traits::MetricsSnapshotProvider;
#[cfg(feature = "concurrency")]
pub use crate::queue::blocking::BlockingMriQueue;
#[cfg(feature = "concurrency")]
pub use crate::queue::locked::LockedMriQueue;
pub use crate::queue::mri::MriQueue;
#[cfg(feature = "concurrency")]
pub use crate::sync::CancelToken;
#[cfg(feature = "concurrency")]
pub use crate::traits::BlockingQueue;
pub use crate::traits::{ConcurrentQueue, Queue};
