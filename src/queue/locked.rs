//! Coarse-grained thread-safe MRI queue.
//!
//! [`LockedMriQueue`] wraps an [`MriQueue`] in a single `parking_lot::Mutex`
//! held for the duration of every operation. It has the same observable
//! semantics as the sequential queue and is the simplest correct shared
//! variant; [`BlockingMriQueue`](crate::queue::blocking::BlockingMriQueue)
//! trades that simplicity for independent producer and consumer locks.
//!
//! References cannot outlive the guard, so [`peek`](LockedMriQueue::peek) and
//! [`LockedIter`] hand out clones.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use mriqueue::queue::locked::LockedMriQueue;
//!
//! let queue = Arc::new(LockedMriQueue::new(100));
//! let handles: Vec<_> = (0..4)
//!     .map(|t| {
//!         let queue = Arc::clone(&queue);
//!         thread::spawn(move || {
//!             for i in 0..50 {
//!                 queue.offer(t * 1000 + i);
//!             }
//!         })
//!     })
//!     .collect();
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(queue.len(), 100);
//! ```

use std::fmt;

use parking_lot::Mutex;

use crate::ds::node_chain::ChainCursor;
use crate::error::{ConfigError, InvariantError, StateError};
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::QueueMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::MetricsSnapshotProvider;
use crate::queue::mri::MriQueue;
use crate::traits::ConcurrentQueue;

/// [`MriQueue`] behind one mutex.
pub struct LockedMriQueue<T> {
    inner: Mutex<MriQueue<T>>,
}

impl<T> LockedMriQueue<T> {
    /// Creates an empty queue.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        Self::from_queue(MriQueue::new(capacity))
    }

    /// Creates an empty queue, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        MriQueue::try_new(capacity).map(Self::from_queue)
    }

    /// Wraps an existing sequential queue.
    pub fn from_queue(queue: MriQueue<T>) -> Self {
        Self {
            inner: Mutex::new(queue),
        }
    }

    /// Unwraps the sequential queue.
    pub fn into_inner(self) -> MriQueue<T> {
        self.inner.into_inner()
    }

    /// Inserts `item`, evicting the oldest element if full. Always `true`.
    pub fn offer(&self, item: T) -> bool {
        let mut queue = self.inner.lock();
        queue.offer(item)
    }

    /// Inserts `item` if the lock is free right now.
    /// Returns the item back when the lock is contended.
    pub fn try_offer(&self, item: T) -> Result<(), T> {
        match self.inner.try_lock() {
            Some(mut queue) => {
                queue.offer(item);
                Ok(())
            },
            None => Err(item),
        }
    }

    /// Inserts `item` and returns the element it evicted, if any.
    pub fn offer_evicting(&self, item: T) -> Option<T> {
        let mut queue = self.inner.lock();
        queue.offer_evicting(item)
    }

    pub fn poll(&self) -> Option<T> {
        let mut queue = self.inner.lock();
        queue.poll()
    }

    /// Returns a clone of the oldest element.
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        let queue = self.inner.lock();
        queue.peek().cloned()
    }

    /// Removes the first element equal to `item`.
    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        let mut queue = self.inner.lock();
        queue.remove(item)
    }

    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        let queue = self.inner.lock();
        queue.contains(item)
    }

    /// Keeps only the elements for which `keep` returns `true`.
    ///
    /// `keep` runs under the queue lock and must not touch this queue.
    pub fn retain(&self, keep: impl FnMut(&T) -> bool) -> usize {
        let mut queue = self.inner.lock();
        queue.retain(keep)
    }

    /// Moves up to `max` elements, oldest first, into `sink`.
    pub fn drain_to<E: Extend<T>>(&self, sink: &mut E, max: usize) -> usize {
        let mut drained = Vec::new();
        let moved = {
            let mut queue = self.inner.lock();
            queue.drain_to(&mut drained, max)
        };
        sink.extend(drained);
        moved
    }

    pub fn len(&self) -> usize {
        let queue = self.inner.lock();
        queue.len()
    }

    pub fn is_empty(&self) -> bool {
        let queue = self.inner.lock();
        queue.is_empty()
    }

    pub fn capacity(&self) -> usize {
        let queue = self.inner.lock();
        queue.capacity()
    }

    pub fn remaining_capacity(&self) -> usize {
        let queue = self.inner.lock();
        queue.remaining_capacity()
    }

    pub fn clear(&self) {
        let mut queue = self.inner.lock();
        queue.clear();
    }

    /// Copies the elements, oldest first.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let queue = self.inner.lock();
        queue.to_vec()
    }

    /// Returns a weakly consistent iterator yielding clones.
    ///
    /// The iterator never fails because of concurrent modification. Elements
    /// removed by other threads before the iterator reaches them are skipped.
    pub fn iter(&self) -> LockedIter<'_, T> {
        let queue = self.inner.lock();
        LockedIter {
            cursor: ChainCursor::new(queue.chain()),
            queue: self,
        }
    }

    /// Runs `f` with exclusive access to the underlying queue.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut MriQueue<T>) -> R) -> R {
        let mut queue = self.inner.lock();
        f(&mut queue)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let queue = self.inner.lock();
        queue.check_invariants()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        let queue = self.inner.lock();
        queue.debug_validate_invariants();
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> QueueMetricsSnapshot {
        let queue = self.inner.lock();
        queue.metrics_snapshot()
    }
}

impl<T: fmt::Debug> fmt::Debug for LockedMriQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_lock() {
            Some(queue) => f
                .debug_struct("LockedMriQueue")
                .field("queue", &*queue)
                .finish(),
            None => f
                .debug_struct("LockedMriQueue")
                .field("queue", &"<locked>")
                .finish(),
        }
    }
}

impl<T: Send> ConcurrentQueue<T> for LockedMriQueue<T> {
    fn offer(&self, item: T) -> bool {
        LockedMriQueue::offer(self, item)
    }

    fn poll(&self) -> Option<T> {
        LockedMriQueue::poll(self)
    }

    fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        LockedMriQueue::peek(self)
    }

    fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        LockedMriQueue::remove(self, item)
    }

    fn len(&self) -> usize {
        LockedMriQueue::len(self)
    }

    fn capacity(&self) -> usize {
        LockedMriQueue::capacity(self)
    }

    fn remaining_capacity(&self) -> usize {
        LockedMriQueue::remaining_capacity(self)
    }

    fn clear(&self) {
        LockedMriQueue::clear(self)
    }
}

#[cfg(feature = "metrics")]
impl<T> MetricsSnapshotProvider<QueueMetricsSnapshot> for LockedMriQueue<T> {
    fn snapshot(&self) -> QueueMetricsSnapshot {
        self.metrics_snapshot()
    }
}

/// Weakly consistent iterator over a [`LockedMriQueue`].
///
/// Each step takes the queue lock. If the element the iterator was about to
/// visit has been removed in the meantime, it resumes at the first element
/// inserted after the last one it returned.
pub struct LockedIter<'a, T> {
    queue: &'a LockedMriQueue<T>,
    cursor: ChainCursor,
}

impl<T> LockedIter<'_, T> {
    /// Removes the element returned by the last call to `next`.
    ///
    /// Returns `Ok(false)` if another thread already removed it.
    pub fn remove(&mut self) -> Result<bool, StateError> {
        let id = self.cursor.take_last()?;
        let mut queue = self.queue.inner.lock();
        Ok(queue.remove_id(id).is_some())
    }
}

impl<T: Clone> Iterator for LockedIter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let queue = self.queue.inner.lock();
        let id = self.cursor.advance(queue.chain())?;
        queue.chain().get(id).cloned()
    }
}
