//! Singly linked sentinel chain backed by `SlotArena`, with bounded
//! evict-on-overflow insertion.
//!
//! The chain always starts with an empty sentinel node; the front element is
//! the sentinel's successor. Nodes are linked by `SlotId`, so a node that has
//! been retired (its slot freed and its generation bumped) can be detected by
//! any cursor still holding its id.
//!
//! ## Architecture
//!
//! ```text
//!   arena (SlotArena<Node<T>>)
//!   ┌────────┬──────────────────────────────────────────┐
//!   │ SlotId │ Node { value, next, seq }                │
//!   ├────────┼──────────────────────────────────────────┤
//!   │ id_0   │ { value: None,    next: id_1, seq: 0 }   │  ◄── head (sentinel)
//!   │ id_1   │ { value: Some(A), next: id_2, seq: 1 }   │
//!   │ id_2   │ { value: Some(B), next: None, seq: 2 }   │  ◄── tail
//!   └────────┴──────────────────────────────────────────┘
//!
//!   head ─► [sentinel] ─► [A] ─► [B] ◄── tail
//! ```
//!
//! ## Eviction
//!
//! `push` appends after `tail`. While `count < capacity` the count grows;
//! once full, the front node is dequeued in the same call, so the chain
//! keeps exactly the `capacity` most recently pushed live values.
//!
//! Dequeue promotes the front node to be the new sentinel (its value moves
//! out to the caller) and retires the old sentinel slot.
//!
//! ## Cursor resynchronization
//!
//! Every node carries a monotonically increasing `seq`. A [`ChainCursor`]
//! remembers the seq of the last node it yielded; when the node it was about
//! to visit has been retired, it resumes at the first live node with a larger
//! seq instead of failing. Each live value is therefore yielded at most once.
//!
//! ## Performance
//! - `push` / `pop_front` / `front`: O(1)
//! - `unlink` / `remove_first` / `retain`: O(n) scan for the predecessor
//! - cursor resync: O(n), only after a concurrent retirement

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::{InvariantError, StateError};

#[derive(Debug)]
struct Node<T> {
    value: Option<T>,
    next: Option<SlotId>,
    seq: u64,
}

/// Bounded singly linked chain with a sentinel head.
#[derive(Debug)]
pub struct NodeChain<T> {
    arena: SlotArena<Node<T>>,
    head: SlotId,
    tail: SlotId,
    capacity: usize,
    count: usize,
    next_seq: u64,
}

impl<T> NodeChain<T> {
    /// Creates an empty chain. `capacity` must already be validated.
    pub fn new(capacity: usize) -> Self {
        debug_assert!(capacity > 0);
        let mut arena = SlotArena::new();
        let head = arena.insert(Node {
            value: None,
            next: None,
            seq: 0,
        });
        Self {
            arena,
            head,
            tail: head,
            capacity,
            count: 0,
            next_seq: 1,
        }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        self.capacity - self.count
    }

    /// Appends `value`; returns the evicted front value when the chain was full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let seq = self.next_seq;
        self.next_seq += 1;
        let id = self.arena.insert(Node {
            value: Some(value),
            next: None,
            seq,
        });
        if let Some(tail) = self.arena.get_mut(self.tail) {
            tail.next = Some(id);
        }
        self.tail = id;

        if self.count < self.capacity {
            self.count += 1;
            None
        } else {
            self.dequeue()
        }
    }

    /// Removes and returns the front value.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.count == 0 {
            return None;
        }
        let value = self.dequeue();
        self.count -= 1;
        value
    }

    /// Removes up to `max` front values, oldest first.
    pub fn pop_front_n(&mut self, max: usize) -> Vec<T> {
        let n = max.min(self.count);
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            if let Some(value) = self.dequeue() {
                out.push(value);
            }
        }
        self.count -= n;
        out
    }

    /// Returns the front value without removing it.
    pub fn front(&self) -> Option<&T> {
        self.front_id().and_then(|id| self.get(id))
    }

    /// Returns the id of the front node.
    pub fn front_id(&self) -> Option<SlotId> {
        self.arena.get(self.head).and_then(|node| node.next)
    }

    /// Returns the value of a live node.
    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).and_then(|node| node.value.as_ref())
    }

    /// Returns `true` if `id` is a live (non-retired, non-sentinel) node.
    pub fn contains_id(&self, id: SlotId) -> bool {
        self.get(id).is_some()
    }

    /// Returns the successor of a live node.
    pub fn next_id(&self, id: SlotId) -> Option<SlotId> {
        self.arena.get(id).and_then(|node| node.next)
    }

    fn seq(&self, id: SlotId) -> Option<u64> {
        self.arena.get(id).map(|node| node.seq)
    }

    /// Returns the first live node whose seq is greater than `after`.
    fn first_after(&self, after: Option<u64>) -> Option<SlotId> {
        let mut current = self.front_id();
        while let Some(id) = current {
            let node = self.arena.get(id)?;
            match after {
                Some(seq) if node.seq <= seq => current = node.next,
                _ => return Some(id),
            }
        }
        None
    }

    /// Unlinks the live node `id`; returns its value.
    pub fn unlink_id(&mut self, id: SlotId) -> Option<T> {
        if !self.contains_id(id) {
            return None;
        }
        let mut trail = self.head;
        while let Some(p) = self.next_id(trail) {
            if p == id {
                return self.unlink(p, trail);
            }
            trail = p;
        }
        None
    }

    /// Unlinks the first value matching `pred`; returns it.
    pub fn remove_first(&mut self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        let mut trail = self.head;
        while let Some(p) = self.next_id(trail) {
            if self.get(p).is_some_and(&mut pred) {
                return self.unlink(p, trail);
            }
            trail = p;
        }
        None
    }

    /// Keeps only the values for which `keep` returns `true`.
    /// Returns the number of values removed.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let mut removed = 0;
        let mut trail = self.head;
        while let Some(p) = self.next_id(trail) {
            if self.get(p).is_some_and(&mut keep) {
                trail = p;
            } else {
                self.unlink(p, trail);
                removed += 1;
            }
        }
        removed
    }

    /// Drops every value and starts over from a fresh sentinel.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.head = self.arena.insert(Node {
            value: None,
            next: None,
            seq: 0,
        });
        self.tail = self.head;
        self.count = 0;
    }

    /// Returns an iterator from front to back.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            chain: self,
            current: self.front_id(),
            remaining: self.count,
        }
    }

    /// Promotes the front node to sentinel and retires the old sentinel.
    /// Leaves `count` untouched.
    fn dequeue(&mut self) -> Option<T> {
        let first = self.front_id()?;
        let old_head = std::mem::replace(&mut self.head, first);
        self.arena.remove(old_head);
        self.arena.get_mut(first).and_then(|node| node.value.take())
    }

    /// Requires `trail.next == target`.
    fn unlink(&mut self, target: SlotId, trail: SlotId) -> Option<T> {
        let next = self.arena.get(target)?.next;
        if let Some(trail_node) = self.arena.get_mut(trail) {
            trail_node.next = next;
        }
        if self.tail == target {
            self.tail = trail;
        }
        self.count -= 1;
        self.arena.remove(target).and_then(|node| node.value)
    }

    /// Verifies the structural invariants of the chain.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let head = self
            .arena
            .get(self.head)
            .ok_or_else(|| InvariantError::new("head sentinel is not allocated"))?;
        if head.value.is_some() {
            return Err(InvariantError::new("head sentinel holds a value"));
        }
        if self.count > self.capacity {
            return Err(InvariantError::new(format!(
                "count {} exceeds capacity {}",
                self.count, self.capacity
            )));
        }

        let mut live = 0usize;
        let mut last = self.head;
        let mut last_seq = head.seq;
        let mut current = head.next;
        while let Some(id) = current {
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new("chain links to a retired slot"))?;
            if node.value.is_none() {
                return Err(InvariantError::new("live chain node holds no value"));
            }
            if node.seq <= last_seq {
                return Err(InvariantError::new("chain seqs are not increasing"));
            }
            live += 1;
            if live > self.count {
                return Err(InvariantError::new("chain is longer than count"));
            }
            last_seq = node.seq;
            last = id;
            current = node.next;
        }

        if live != self.count {
            return Err(InvariantError::new(format!(
                "chain holds {} values but count is {}",
                live, self.count
            )));
        }
        if last != self.tail {
            return Err(InvariantError::new("tail is not the last chain node"));
        }
        if self.arena.len() != self.count + 1 {
            return Err(InvariantError::new("arena holds unreachable nodes"));
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("node chain invariant violated: {}", err);
        }
    }
}

/// Iterator over chain values from front to back.
pub struct Iter<'a, T> {
    chain: &'a NodeChain<T>,
    current: Option<SlotId>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        let node = self.chain.arena.get(id)?;
        self.current = node.next;
        self.remaining = self.remaining.saturating_sub(1);
        node.value.as_ref()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

/// Detached cursor state over a [`NodeChain`].
///
/// Holds ids only, so it can outlive a lock guard and be re-validated
/// against the chain on every step.
#[derive(Debug, Clone, Default)]
pub struct ChainCursor {
    next: Option<SlotId>,
    last_seq: Option<u64>,
    last_returned: Option<SlotId>,
}

impl ChainCursor {
    /// Positions a cursor at the current front of `chain`.
    pub fn new<T>(chain: &NodeChain<T>) -> Self {
        Self {
            next: chain.front_id(),
            last_seq: None,
            last_returned: None,
        }
    }

    /// Advances to the next live node and returns its id.
    ///
    /// If the node the cursor was about to visit has been retired, resumes at
    /// the first live node newer than the last one yielded.
    pub fn advance<T>(&mut self, chain: &NodeChain<T>) -> Option<SlotId> {
        let pending = self.next?;
        let id = if chain.contains_id(pending) {
            pending
        } else {
            match chain.first_after(self.last_seq) {
                Some(id) => id,
                None => {
                    self.next = None;
                    return None;
                },
            }
        };
        self.last_seq = chain.seq(id);
        self.last_returned = Some(id);
        self.next = chain.next_id(id);
        Some(id)
    }

    /// Takes the id of the last yielded node for removal.
    pub fn take_last(&mut self) -> Result<SlotId, StateError> {
        self.last_returned
            .take()
            .ok_or_else(StateError::remove_without_next)
    }
}
