//! Single-threaded most-recently-inserted (MRI) queue.
//!
//! A FIFO queue with a fixed capacity that never rejects an insertion: when
//! the queue is full, `offer` evicts the oldest element and admits the new
//! one. The queue therefore always holds the `capacity` most recently
//! inserted elements that have not been removed yet.
//!
//! ## Architecture
//!
//! ```text
//!   offer(D) on a full queue, capacity = 3
//!
//!   before:  head ─► [·] ─► [A] ─► [B] ─► [C] ◄── tail         len = 3
//!   append:  head ─► [·] ─► [A] ─► [B] ─► [C] ─► [D] ◄── tail
//!   evict:           [·]✗   head ─► [·] ─► [B] ─► [C] ─► [D]    len = 3
//!                    retired        (A moved out, its node is
//!                                    the new sentinel)
//! ```
//!
//! ## Operations
//!
//! | Operation   | Time | Notes                                   |
//! |-------------|------|-----------------------------------------|
//! | `offer`     | O(1) | Evicts the oldest element when full     |
//! | `poll`      | O(1) | `None` on an empty queue                |
//! | `peek`      | O(1) |                                         |
//! | `remove`    | O(n) | First equal element                     |
//! | `cursor`    | O(1) | Iterator-driven removal via `remove()`  |
//! | `clear`     | O(n) | Resets to a fresh sentinel              |
//!
//! ## Example Usage
//!
//! ```
//! use mriqueue::queue::mri::MriQueue;
//!
//! let mut queue = MriQueue::new(2);
//! queue.offer("A");
//! queue.offer("B");
//! queue.offer("C"); // evicts "A"
//!
//! assert_eq!(queue.len(), 2);
//! assert_eq!(queue.peek(), Some(&"B"));
//! assert_eq!(queue.poll(), Some("B"));
//! assert_eq!(queue.peek(), Some(&"C"));
//! ```
//!
//! ## Thread Safety
//!
//! Not thread-safe. [`LockedMriQueue`](crate::queue::locked::LockedMriQueue)
//! wraps this type in a mutex; [`BlockingMriQueue`](crate::queue::blocking::BlockingMriQueue)
//! splits producers and consumers onto separate locks.

use std::fmt;

use log::{debug, trace};

use crate::ds::node_chain::{self, ChainCursor, NodeChain};
use crate::ds::slot_arena::SlotId;
use crate::error::{ConfigError, InvariantError, StateError, validate_capacity};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::QueueMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::QueueMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MetricsSnapshotProvider, QueueMetricsRecorder};
use crate::traits::Queue;

/// Bounded FIFO queue that evicts its oldest element on overflow.
pub struct MriQueue<T> {
    chain: NodeChain<T>,
    #[cfg(feature = "metrics")]
    metrics: QueueMetrics,
}

impl<T> MriQueue<T> {
    /// Creates an empty queue.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. Use [`try_new`](Self::try_new) for
    /// user-supplied capacities.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(queue) => queue,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates an empty queue, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        let capacity = validate_capacity(capacity)?;
        debug!("created MriQueue with capacity {}", capacity);
        Ok(Self {
            chain: NodeChain::new(capacity),
            #[cfg(feature = "metrics")]
            metrics: QueueMetrics::default(),
        })
    }

    /// Creates a queue holding the last `capacity` items of `iter`.
    pub fn from_iter_with_capacity(
        capacity: usize,
        iter: impl IntoIterator<Item = T>,
    ) -> Result<Self, ConfigError> {
        let mut queue = Self::try_new(capacity)?;
        queue.extend(iter);
        Ok(queue)
    }

    /// Inserts `item`. If the queue is full the oldest element is evicted
    /// first. Always returns `true`.
    pub fn offer(&mut self, item: T) -> bool {
        self.offer_evicting(item);
        true
    }

    /// Inserts `item` and returns the element it evicted, if any.
    pub fn offer_evicting(&mut self, item: T) -> Option<T> {
        #[cfg(feature = "metrics")]
        self.metrics.record_offer();
        let evicted = self.chain.push(item);
        if evicted.is_some() {
            trace!("MriQueue full at {}, evicted oldest", self.chain.capacity());
            #[cfg(feature = "metrics")]
            self.metrics.record_eviction();
        }
        evicted
    }

    /// Removes and returns the oldest element.
    pub fn poll(&mut self) -> Option<T> {
        let item = self.chain.pop_front();
        #[cfg(feature = "metrics")]
        if item.is_some() {
            self.metrics.record_poll_hit();
        } else {
            self.metrics.record_poll_miss();
        }
        item
    }

    /// Returns the oldest element without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.chain.front()
    }

    /// Removes the first element equal to `item`.
    pub fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();
        let found = self.chain.remove_first(|v| v == item).is_some();
        #[cfg(feature = "metrics")]
        if found {
            self.metrics.record_remove_found();
        }
        found
    }

    /// Returns `true` if an element equal to `item` is queued.
    pub fn contains(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        self.chain.iter().any(|v| v == item)
    }

    /// Keeps only the elements for which `keep` returns `true`.
    /// Returns the number of elements removed.
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) -> usize {
        self.chain.retain(keep)
    }

    /// Moves up to `max` elements, oldest first, into `sink`.
    pub fn drain_to<E: Extend<T>>(&mut self, sink: &mut E, max: usize) -> usize {
        let drained = self.chain.pop_front_n(max);
        let moved = drained.len();
        sink.extend(drained);
        #[cfg(feature = "metrics")]
        self.metrics.record_drain(moved);
        moved
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.chain.capacity()
    }

    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        self.chain.remaining_capacity()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.chain.clear();
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Returns an iterator from oldest to newest.
    pub fn iter(&self) -> node_chain::Iter<'_, T> {
        self.chain.iter()
    }

    /// Returns a cursor that can remove the element it last yielded.
    pub fn cursor(&mut self) -> Cursor<'_, T> {
        Cursor {
            state: ChainCursor::new(&self.chain),
            queue: self,
        }
    }

    /// Copies the elements, oldest first.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.chain.iter().cloned().collect()
    }

    /// Verifies the structural invariants of the underlying chain.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.chain.check_invariants()
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        self.chain.debug_validate_invariants();
    }

    pub(crate) fn chain(&self) -> &NodeChain<T> {
        &self.chain
    }

    /// Unlinks the node behind `id`, counting it as a targeted removal.
    pub(crate) fn remove_id(&mut self, id: SlotId) -> Option<T> {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();
        let item = self.chain.unlink_id(id);
        #[cfg(feature = "metrics")]
        if item.is_some() {
            self.metrics.record_remove_found();
        }
        item
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> QueueMetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity())
    }
}

impl<T> Extend<T> for MriQueue<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.offer(item);
        }
    }
}

impl<'a, T> IntoIterator for &'a MriQueue<T> {
    type Item = &'a T;
    type IntoIter = node_chain::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: fmt::Debug> fmt::Debug for MriQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MriQueue")
            .field("capacity", &self.capacity())
            .field("items", &DebugItems(self))
            .finish()
    }
}

struct DebugItems<'a, T>(&'a MriQueue<T>);

impl<T: fmt::Debug> fmt::Debug for DebugItems<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

impl<T> Queue<T> for MriQueue<T> {
    fn offer(&mut self, item: T) -> bool {
        MriQueue::offer(self, item)
    }

    fn poll(&mut self) -> Option<T> {
        MriQueue::poll(self)
    }

    fn peek(&self) -> Option<&T> {
        MriQueue::peek(self)
    }

    fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq,
    {
        MriQueue::remove(self, item)
    }

    fn len(&self) -> usize {
        MriQueue::len(self)
    }

    fn capacity(&self) -> usize {
        MriQueue::capacity(self)
    }

    fn clear(&mut self) {
        MriQueue::clear(self)
    }
}

#[cfg(feature = "metrics")]
impl<T> MetricsSnapshotProvider<QueueMetricsSnapshot> for MriQueue<T> {
    fn snapshot(&self) -> QueueMetricsSnapshot {
        self.metrics_snapshot()
    }
}

/// Forward cursor over an [`MriQueue`] supporting removal of the element it
/// last returned.
///
/// ```
/// use mriqueue::queue::mri::MriQueue;
///
/// let mut queue = MriQueue::new(4);
/// queue.extend([1, 2, 3, 4]);
///
/// let mut cursor = queue.cursor();
/// while let Some(&value) = cursor.next() {
///     if value % 2 == 0 {
///         cursor.remove().unwrap();
///     }
/// }
/// assert_eq!(queue.to_vec(), vec![1, 3]);
/// ```
pub struct Cursor<'a, T> {
    queue: &'a mut MriQueue<T>,
    state: ChainCursor,
}

impl<T> Cursor<'_, T> {
    /// Advances and returns the next element, or `None` once exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        let id = self.state.advance(self.queue.chain())?;
        self.queue.chain().get(id)
    }

    /// Removes the element returned by the last call to [`next`](Self::next).
    pub fn remove(&mut self) -> Result<T, StateError> {
        let id = self.state.take_last()?;
        self.queue
            .remove_id(id)
            .ok_or_else(|| StateError::new("element was already removed"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(MriQueue::<i32>::try_new(0).is_err());
    }

    #[test]
    #[should_panic(expected = "capacity")]
    fn new_panics_on_zero_capacity() {
        let _ = MriQueue::<i32>::new(0);
    }

    #[test]
    fn empty_queue_polls_and_peeks_none() {
        let mut queue = MriQueue::<i32>::new(1);
        assert_eq!(queue.poll(), None);
        assert_eq!(queue.peek(), None);
        assert!(queue.is_empty());
        assert_eq!(queue.remaining_capacity(), 1);
    }

    #[test]
    fn offer_poll_peek_scenario_capacity_two() {
        let mut queue = MriQueue::new(2);

        assert!(queue.offer("A"));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.peek(), Some(&"A"));

        assert!(queue.offer("B"));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(), Some(&"A"));

        assert!(queue.offer("C"));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.peek(), Some(&"B"));

        assert_eq!(queue.poll(), Some("B"));
        assert_eq!(queue.peek(), Some(&"C"));
        assert_eq!(queue.len(), 1);

        queue.clear();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.peek(), None);
        assert_eq!(queue.poll(), None);
        queue.debug_validate_invariants();
    }

    #[test]
    fn offer_evicting_reports_evicted_item() {
        let mut queue = MriQueue::new(1);
        assert_eq!(queue.offer_evicting(1), None);
        assert_eq!(queue.offer_evicting(2), Some(1));
        assert_eq!(queue.to_vec(), vec![2]);
    }

    #[test]
    fn iterator_is_fifo_and_exhausts() {
        let mut queue = MriQueue::new(2);
        queue.offer(1);
        queue.offer(2);
        let mut iter = queue.iter();
        assert_eq!(iter.next(), Some(&1));
        assert_eq!(iter.next(), Some(&2));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);

        let empty = MriQueue::<i32>::new(1);
        assert_eq!(empty.iter().next(), None);
    }

    #[test]
    fn targeted_remove_and_contains() {
        let mut queue = MriQueue::new(4);
        queue.extend([1, 2, 3]);
        assert!(queue.contains(&2));
        assert!(queue.remove(&2));
        assert!(!queue.contains(&2));
        assert!(!queue.remove(&2));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.to_vec(), vec![1, 3]);
        queue.debug_validate_invariants();
    }

    #[test]
    fn remove_of_evicted_element_is_false() {
        let mut queue = MriQueue::new(2);
        queue.extend([1, 2, 3]);
        assert!(!queue.remove(&1));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn remove_tail_then_offer_appends_after_new_tail() {
        let mut queue = MriQueue::new(3);
        queue.extend([1, 2, 3]);
        assert!(queue.remove(&3));
        queue.offer(4);
        assert_eq!(queue.to_vec(), vec![1, 2, 4]);
        queue.debug_validate_invariants();
    }

    #[test]
    fn cursor_remove_requires_next() {
        let mut queue = MriQueue::new(2);
        queue.offer(1);
        let mut cursor = queue.cursor();
        assert!(cursor.remove().is_err());
        assert_eq!(cursor.next(), Some(&1));
        assert_eq!(cursor.remove(), Ok(1));
        assert!(cursor.remove().is_err());
        assert_eq!(cursor.next(), None);
        assert!(queue.is_empty());
        queue.debug_validate_invariants();
    }

    #[test]
    fn cursor_removes_every_element() {
        let mut queue = MriQueue::new(5);
        queue.extend(0..5);
        let mut cursor = queue.cursor();
        let mut removed = Vec::new();
        while cursor.next().is_some() {
            removed.push(cursor.remove().unwrap());
        }
        assert_eq!(removed, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
        queue.offer(9);
        assert_eq!(queue.to_vec(), vec![9]);
        queue.debug_validate_invariants();
    }

    #[test]
    fn drain_to_moves_in_order() {
        let mut queue = MriQueue::new(4);
        queue.extend([1, 2, 3, 4]);
        let mut sink = Vec::new();
        assert_eq!(queue.drain_to(&mut sink, 2), 2);
        assert_eq!(sink, vec![1, 2]);
        assert_eq!(queue.drain_to(&mut sink, usize::MAX), 2);
        assert_eq!(sink, vec![1, 2, 3, 4]);
        assert!(queue.is_empty());
        assert_eq!(queue.drain_to(&mut sink, 0), 0);
    }

    #[test]
    fn retain_filters_elements() {
        let mut queue = MriQueue::new(6);
        queue.extend(1..=6);
        assert_eq!(queue.retain(|v| *v > 3), 3);
        assert_eq!(queue.to_vec(), vec![4, 5, 6]);
    }

    #[test]
    fn from_iter_with_capacity_keeps_latest() {
        let queue = MriQueue::from_iter_with_capacity(3, 0..10).unwrap();
        assert_eq!(queue.to_vec(), vec![7, 8, 9]);
        assert!(MriQueue::from_iter_with_capacity(0, 0..1).is_err());
    }

    #[test]
    fn debug_lists_items() {
        let mut queue = MriQueue::new(2);
        queue.extend([1, 2]);
        let dbg = format!("{:?}", queue);
        assert!(dbg.contains("capacity: 2"));
        assert!(dbg.contains("[1, 2]"));
    }

    #[test]
    fn queue_trait_dispatch() {
        fn exercise<Q: Queue<u8>>(q: &mut Q) {
            assert!(q.offer(1));
            assert!(q.offer(2));
            assert_eq!(q.remaining_capacity(), q.capacity() - 2);
            assert!(q.remove(&1));
            assert_eq!(q.poll(), Some(2));
            assert!(q.is_empty());
        }
        let mut queue = MriQueue::new(3);
        exercise(&mut queue);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn metrics_track_offers_and_evictions() {
        let mut queue = MriQueue::new(2);
        queue.extend([1, 2, 3]);
        queue.poll();
        queue.poll();
        queue.poll();
        let snap = queue.snapshot();
        assert_eq!(snap.offer_calls, 3);
        assert_eq!(snap.evictions, 1);
        assert_eq!(snap.poll_hits, 2);
        assert_eq!(snap.poll_misses, 1);
        assert_eq!(snap.len, 0);
        assert_eq!(snap.capacity, 2);
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Offer(u16),
            Poll,
            Remove(u16),
            Clear,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                6 => any::<u16>().prop_map(Op::Offer),
                3 => Just(Op::Poll),
                1 => any::<u16>().prop_map(Op::Remove),
                1 => Just(Op::Clear),
            ]
        }

        proptest! {
            /// Property: len() never exceeds capacity
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_len_within_capacity(
                capacity in 1usize..16,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut queue = MriQueue::new(capacity);
                for op in ops {
                    match op {
                        Op::Offer(v) => { queue.offer(v); }
                        Op::Poll => { queue.poll(); }
                        Op::Remove(v) => { queue.remove(&v); }
                        Op::Clear => queue.clear(),
                    }
                    prop_assert!(queue.len() <= capacity);
                    prop_assert!(queue.check_invariants().is_ok());
                }
            }

            /// Property: without removals, the queue holds the last `capacity` inserts
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_holds_most_recent_inserts(
                capacity in 1usize..32,
                items in prop::collection::vec(any::<u32>(), 0..128)
            ) {
                let mut queue = MriQueue::new(capacity);
                for &item in &items {
                    queue.offer(item);
                }
                let start = items.len().saturating_sub(capacity);
                prop_assert_eq!(queue.to_vec(), items[start..].to_vec());
            }

            /// Property: matches a VecDeque model under mixed operations
            #[cfg_attr(miri, ignore)]
            #[test]
            fn prop_matches_model(
                capacity in 1usize..8,
                ops in prop::collection::vec(op_strategy(), 0..200)
            ) {
                let mut queue = MriQueue::new(capacity);
                let mut model = std::collections::VecDeque::new();
                for op in ops {
                    match op {
                        Op::Offer(v) => {
                            if model.len() == capacity {
                                model.pop_front();
                            }
                            model.push_back(v);
                            queue.offer(v);
                        },
                        Op::Poll => prop_assert_eq!(queue.poll(), model.pop_front()),
                        Op::Remove(v) => {
                            let expected = match model.iter().position(|x| *x == v) {
                                Some(pos) => {
                                    model.remove(pos);
                                    true
                                },
                                None => false,
                            };
                            prop_assert_eq!(queue.remove(&v), expected);
                        },
                        Op::Clear => {
                            model.clear();
                            queue.clear();
                        },
                    }
                    prop_assert_eq!(queue.peek(), model.front());
                    prop_assert_eq!(queue.len(), model.len());
                }
            }
        }
    }
}
