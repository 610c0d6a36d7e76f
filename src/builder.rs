//! Unified queue builder for all MRI queue variants.
//!
//! Provides one entry point for constructing queues and a type-erased
//! [`AnyQueue`] wrapper for code that picks the variant at runtime.
//!
//! ## Example
//!
//! ```rust
//! use mriqueue::builder::{QueueBuilder, QueueKind};
//!
//! let queue = QueueBuilder::new(2).build::<&str>(QueueKind::Blocking);
//! queue.offer("a");
//! queue.offer("b");
//! queue.offer("c");
//! assert_eq!(queue.len(), 2);
//! assert_eq!(queue.poll(), Some("b"));
//! ```

use crate::error::ConfigError;
#[cfg(feature = "concurrency")]
use crate::queue::blocking::BlockingMriQueue;
#[cfg(feature = "concurrency")]
use crate::queue::locked::LockedMriQueue;
use crate::queue::mri::MriQueue;
#[cfg(feature = "concurrency")]
use crate::traits::ConcurrentQueue;

/// Thread-safe queue variants selectable at runtime.
#[cfg(feature = "concurrency")]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueKind {
    /// One mutex around a sequential queue.
    Locked,
    /// Separate producer and consumer locks; supports blocking retrieval.
    Blocking,
}

/// Unified queue wrapper that provides a consistent API regardless of variant.
#[cfg(feature = "concurrency")]
#[derive(Debug)]
pub struct AnyQueue<T> {
    inner: AnyQueueInner<T>,
}

#[cfg(feature = "concurrency")]
#[derive(Debug)]
enum AnyQueueInner<T> {
    Locked(LockedMriQueue<T>),
    Blocking(BlockingMriQueue<T>),
}

#[cfg(feature = "concurrency")]
impl<T> AnyQueue<T> {
    pub fn kind(&self) -> QueueKind {
        match &self.inner {
            AnyQueueInner::Locked(_) => QueueKind::Locked,
            AnyQueueInner::Blocking(_) => QueueKind::Blocking,
        }
    }

    /// Returns the blocking queue, if that is the variant in use.
    pub fn as_blocking(&self) -> Option<&BlockingMriQueue<T>> {
        match &self.inner {
            AnyQueueInner::Blocking(queue) => Some(queue),
            AnyQueueInner::Locked(_) => None,
        }
    }

    pub fn offer(&self, item: T) -> bool {
        match &self.inner {
            AnyQueueInner::Locked(queue) => queue.offer(item),
            AnyQueueInner::Blocking(queue) => queue.offer(item),
        }
    }

    pub fn poll(&self) -> Option<T> {
        match &self.inner {
            AnyQueueInner::Locked(queue) => queue.poll(),
            AnyQueueInner::Blocking(queue) => queue.poll(),
        }
    }

    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        match &self.inner {
            AnyQueueInner::Locked(queue) => queue.peek(),
            AnyQueueInner::Blocking(queue) => queue.peek(),
        }
    }

    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        match &self.inner {
            AnyQueueInner::Locked(queue) => queue.remove(item),
            AnyQueueInner::Blocking(queue) => queue.remove(item),
        }
    }

    pub fn drain_to<E: Extend<T>>(&self, sink: &mut E, max: usize) -> usize {
        match &self.inner {
            AnyQueueInner::Locked(queue) => queue.drain_to(sink, max),
            AnyQueueInner::Blocking(queue) => queue.drain_to(sink, max),
        }
    }

    pub fn len(&self) -> usize {
        match &self.inner {
            AnyQueueInner::Locked(queue) => queue.len(),
            AnyQueueInner::Blocking(queue) => queue.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        match &self.inner {
            AnyQueueInner::Locked(queue) => queue.capacity(),
            AnyQueueInner::Blocking(queue) => queue.capacity(),
        }
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity().saturating_sub(self.len())
    }

    pub fn clear(&self) {
        match &self.inner {
            AnyQueueInner::Locked(queue) => queue.clear(),
            AnyQueueInner::Blocking(queue) => queue.clear(),
        }
    }
}

#[cfg(feature = "concurrency")]
impl<T: Send> ConcurrentQueue<T> for AnyQueue<T> {
    fn offer(&self, item: T) -> bool {
        AnyQueue::offer(self, item)
    }

    fn poll(&self) -> Option<T> {
        AnyQueue::poll(self)
    }

    fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        AnyQueue::peek(self)
    }

    fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        AnyQueue::remove(self, item)
    }

    fn len(&self) -> usize {
        AnyQueue::len(self)
    }

    fn capacity(&self) -> usize {
        AnyQueue::capacity(self)
    }

    fn clear(&self) {
        AnyQueue::clear(self)
    }
}

/// Builder for creating queue instances.
#[derive(Debug, Clone, Copy)]
pub struct QueueBuilder {
    capacity: usize,
}

impl QueueBuilder {
    /// Create a new queue builder with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Builds a single-threaded queue.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero.
    pub fn build_sequential<T>(self) -> MriQueue<T> {
        MriQueue::new(self.capacity)
    }

    pub fn try_build_sequential<T>(self) -> Result<MriQueue<T>, ConfigError> {
        MriQueue::try_new(self.capacity)
    }

    /// Builds a mutex-wrapped queue.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero.
    #[cfg(feature = "concurrency")]
    pub fn build_locked<T>(self) -> LockedMriQueue<T> {
        LockedMriQueue::new(self.capacity)
    }

    /// Builds a two-lock blocking queue.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero.
    #[cfg(feature = "concurrency")]
    pub fn build_blocking<T>(self) -> BlockingMriQueue<T> {
        BlockingMriQueue::new(self.capacity)
    }

    /// Build a queue of the specified kind.
    ///
    /// # Panics
    ///
    /// Panics if the capacity is zero. Use [`try_build`](Self::try_build)
    /// for user-supplied capacities.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mriqueue::builder::{QueueBuilder, QueueKind};
    ///
    /// let locked = QueueBuilder::new(16).build::<u64>(QueueKind::Locked);
    /// let blocking = QueueBuilder::new(16).build::<u64>(QueueKind::Blocking);
    /// assert_eq!(locked.kind(), QueueKind::Locked);
    /// assert!(blocking.as_blocking().is_some());
    /// ```
    #[cfg(feature = "concurrency")]
    pub fn build<T>(self, kind: QueueKind) -> AnyQueue<T> {
        match self.try_build(kind) {
            Ok(queue) => queue,
            Err(err) => panic!("{}", err),
        }
    }

    #[cfg(feature = "concurrency")]
    pub fn try_build<T>(self, kind: QueueKind) -> Result<AnyQueue<T>, ConfigError> {
        let inner = match kind {
            QueueKind::Locked => AnyQueueInner::Locked(LockedMriQueue::try_new(self.capacity)?),
            QueueKind::Blocking => {
                AnyQueueInner::Blocking(BlockingMriQueue::try_new(self.capacity)?)
            },
        };
        Ok(AnyQueue { inner })
    }
}
