//! Two-lock blocking MRI queue.
//!
//! A linked producer/consumer queue with separate locks for the insertion
//! side (`tail`) and the removal side (`head`), a condition variable that
//! consumers wait on while the queue is empty, and an atomic element count
//! that lets each side observe the other without taking its lock.
//!
//! Unlike a classic bounded blocking queue, insertion never waits for space:
//! when the queue is full the oldest element is evicted.
//!
//! ## Architecture
//!
//! ```text
//!    put_lock guards tail                 take_lock guards head
//!    ────────────────────                 ─────────────────────
//!                                           not_empty: Condvar
//!
//!   head ─► [sentinel] ─► [A] ─► [B] ─► [C] ◄── tail
//!                                              count = 3 (AtomicUsize)
//!
//!   offer(D), count < capacity        offer(D), count == capacity
//!   ──────────────────────────        ───────────────────────────
//!   lock put                          lock put, then lock take
//!   link D after tail                 link D after tail
//!   count += 1                        promote A to sentinel (evict A)
//!   if count was 0: signal            count unchanged
//! ```
//!
//! Lock order wherever both locks are held: put, then take.
//!
//! ## Node Lifecycle
//!
//! ```text
//!   live ──dequeue──► sentinel ──next dequeue──► retired (next = Retired)
//!     │
//!     └──unlink (remove / iterator remove)──► detached (item cleared,
//!                                              next left intact)
//! ```
//!
//! A retired node's link is `Link::Retired`. An iterator parked on a
//! retired node resumes at the current front instead of walking dead nodes.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use std::thread;
//!
//! use mriqueue::queue::blocking::BlockingMriQueue;
//!
//! let queue = Arc::new(BlockingMriQueue::new(2));
//!
//! let consumer = {
//!     let queue = Arc::clone(&queue);
//!     thread::spawn(move || queue.take())
//! };
//!
//! queue.offer(42);
//! assert_eq!(consumer.join().unwrap(), 42);
//! ```

use std::cell::UnsafeCell;
use std::fmt;
use std::mem;
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::{debug, trace};
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::error::{
    ArgumentError, ConfigError, Interrupted, InvariantError, StateError, validate_capacity,
};
#[cfg(feature = "metrics")]
use crate::metrics::metrics_impl::QueueMetrics;
#[cfg(feature = "metrics")]
use crate::metrics::snapshot::QueueMetricsSnapshot;
#[cfg(feature = "metrics")]
use crate::metrics::traits::{MetricsSnapshotProvider, QueueMetricsRecorder};
use crate::sync::cancel::{
    CancelToken, Waker, deadline_after, lock_cancellable, lock_until_cancellable,
};
use crate::traits::{BlockingQueue, ConcurrentQueue};

struct Node<T> {
    /// `None` for the sentinel and for unlinked nodes.
    item: UnsafeCell<Option<T>>,
    next: UnsafeCell<Link<T>>,
}

impl<T> Node<T> {
    fn new(item: Option<T>) -> Arc<Self> {
        Arc::new(Self {
            item: UnsafeCell::new(item),
            next: UnsafeCell::new(Link::End),
        })
    }
}

/// Forward link of a node.
enum Link<T> {
    /// Last node in the chain.
    End,
    Next(Arc<Node<T>>),
    /// The node was dequeued; its successor is whatever `head.next` is now.
    Retired,
}

impl<T> Link<T> {
    fn node(&self) -> Option<&Arc<Node<T>>> {
        match self {
            Link::Next(node) => Some(node),
            Link::End | Link::Retired => None,
        }
    }
}

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        match self {
            Link::End => Link::End,
            Link::Next(node) => Link::Next(Arc::clone(node)),
            Link::Retired => Link::Retired,
        }
    }
}

/// Both guards, acquired put-then-take.
struct FullLock<'a> {
    _take: MutexGuard<'a, ()>,
    _put: MutexGuard<'a, ()>,
}

/// Thread-safe MRI queue with blocking retrieval.
///
/// Producers and consumers contend on different locks; they only meet when
/// an insertion into a full queue has to evict the oldest element.
pub struct BlockingMriQueue<T> {
    capacity: usize,
    count: AtomicUsize,
    /// Guarded by `take_lock`.
    head: UnsafeCell<Arc<Node<T>>>,
    /// Guarded by `put_lock`.
    tail: UnsafeCell<Arc<Node<T>>>,
    // Shared with cancellation wakers, which must not borrow the queue.
    take_lock: Arc<Mutex<()>>,
    not_empty: Arc<Condvar>,
    put_lock: Mutex<()>,
    #[cfg(feature = "metrics")]
    metrics: QueueMetrics,
}

// SAFETY: `head` and `tail` (and every node reachable through them) are only
// accessed while holding `take_lock` / `put_lock` respectively, or both.
// Elements are moved across threads but never shared, so `T: Send` suffices.
unsafe impl<T: Send> Send for BlockingMriQueue<T> {}

// SAFETY: see `Send`. Shared access to an element (`peek`, iteration) only
// happens under the lock that guards it.
unsafe impl<T: Send> Sync for BlockingMriQueue<T> {}

impl<T> BlockingMriQueue<T> {
    /// Creates an empty queue.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(queue) => queue,
            Err(err) => panic!("{}", err),
        }
    }

    /// Creates an empty queue, rejecting a zero capacity.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        let capacity = validate_capacity(capacity)?;
        let sentinel = Node::new(None);
        debug!("created BlockingMriQueue with capacity {}", capacity);
        Ok(Self {
            capacity,
            count: AtomicUsize::new(0),
            head: UnsafeCell::new(Arc::clone(&sentinel)),
            tail: UnsafeCell::new(sentinel),
            take_lock: Arc::new(Mutex::new(())),
            not_empty: Arc::new(Condvar::new()),
            put_lock: Mutex::new(()),
            #[cfg(feature = "metrics")]
            metrics: QueueMetrics::default(),
        })
    }

    // -----------------------------------------------------------------------
    // Insertion
    // -----------------------------------------------------------------------

    /// Inserts `item`, evicting the oldest element if the queue is full.
    /// Always returns `true`; waits only for the insertion lock.
    pub fn offer(&self, item: T) -> bool {
        let put = self.put_lock.lock();
        self.insert_locked(put, item);
        true
    }

    /// Inserts `item`. Identical to [`offer`](Self::offer); never waits for
    /// space.
    pub fn put(&self, item: T) {
        self.offer(item);
    }

    /// Inserts `item`, giving up if `token` is cancelled before the insertion
    /// lock is acquired. On cancellation nothing is inserted.
    pub fn put_cancellable(&self, item: T, token: &CancelToken) -> Result<(), Interrupted> {
        match lock_cancellable(&self.put_lock, token) {
            Ok(put) => {
                self.insert_locked(put, item);
                Ok(())
            },
            Err(err) => {
                self.on_cancelled("put");
                Err(err)
            },
        }
    }

    /// Inserts `item` if the insertion lock is acquired within `timeout`.
    pub fn offer_timeout(&self, item: T, timeout: Duration) -> bool {
        match self.put_lock.try_lock_for(timeout) {
            Some(put) => {
                self.insert_locked(put, item);
                true
            },
            None => {
                #[cfg(feature = "metrics")]
                self.metrics.record_timeout();
                false
            },
        }
    }

    /// Like [`offer_timeout`](Self::offer_timeout), also honoring `token`.
    pub fn offer_timeout_cancellable(
        &self,
        item: T,
        timeout: Duration,
        token: &CancelToken,
    ) -> Result<bool, Interrupted> {
        match lock_until_cancellable(&self.put_lock, deadline_after(timeout), token) {
            Ok(Some(put)) => {
                self.insert_locked(put, item);
                Ok(true)
            },
            Ok(None) => {
                #[cfg(feature = "metrics")]
                self.metrics.record_timeout();
                Ok(false)
            },
            Err(err) => {
                self.on_cancelled("offer_timeout");
                Err(err)
            },
        }
    }

    fn insert_locked(&self, put: MutexGuard<'_, ()>, item: T) {
        #[cfg(feature = "metrics")]
        self.metrics.record_offer();
        let node = Node::new(Some(item));

        if self.count.load(Ordering::Acquire) == self.capacity {
            let take = self.take_lock.lock();
            // count only drops under the take lock, so re-check it here
            if self.count.load(Ordering::Acquire) == self.capacity {
                // SAFETY: both locks held.
                let evicted = unsafe {
                    self.enqueue(node);
                    self.dequeue()
                };
                drop(take);
                drop(put);
                trace!("BlockingMriQueue full at {}, evicted oldest", self.capacity);
                #[cfg(feature = "metrics")]
                self.metrics.record_eviction();
                drop(evicted);
                return;
            }
            // count cannot grow while the put lock is held
            drop(take);
        }

        // SAFETY: put lock held.
        unsafe { self.enqueue(node) };
        let previous = self.count.fetch_add(1, Ordering::AcqRel);
        drop(put);
        if previous == 0 {
            self.signal_not_empty();
        }
    }

    /// Wakes one consumer. Must not be called with the take lock held.
    fn signal_not_empty(&self) {
        let _take = self.take_lock.lock();
        self.not_empty.notify_one();
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Removes and returns the oldest element, waiting until one exists.
    pub fn take(&self) -> T {
        match self.wait_and_dequeue(None, None) {
            Ok(Some(item)) => item,
            // no deadline and no token: the wait only ends with an element
            _ => unreachable!("untimed take returned without an element"),
        }
    }

    /// Like [`take`](Self::take), but returns `Err(Interrupted)` without
    /// removing anything once `token` is cancelled.
    pub fn take_cancellable(&self, token: &CancelToken) -> Result<T, Interrupted> {
        match self.wait_and_dequeue(None, Some(token)) {
            Ok(Some(item)) => Ok(item),
            Ok(None) => unreachable!("untimed take returned without an element"),
            Err(err) => {
                self.on_cancelled("take");
                Err(err)
            },
        }
    }

    /// Removes the oldest element, waiting at most `timeout` for one.
    pub fn poll_timeout(&self, timeout: Duration) -> Option<T> {
        // without a token the wait cannot be interrupted
        self.wait_and_dequeue(deadline_after(timeout), None)
            .unwrap_or_default()
    }

    /// Like [`poll_timeout`](Self::poll_timeout), also honoring `token`.
    pub fn poll_timeout_cancellable(
        &self,
        timeout: Duration,
        token: &CancelToken,
    ) -> Result<Option<T>, Interrupted> {
        self.wait_and_dequeue(deadline_after(timeout), Some(token))
            .inspect_err(|_| self.on_cancelled("poll_timeout"))
    }

    /// Shared body of the waiting retrievals. `deadline == None` waits
    /// forever; `Ok(None)` means the deadline passed with the queue empty.
    fn wait_and_dequeue(
        &self,
        deadline: Option<Instant>,
        token: Option<&CancelToken>,
    ) -> Result<Option<T>, Interrupted> {
        let mut take = match token {
            Some(token) => lock_cancellable(&*self.take_lock, token)?,
            None => self.take_lock.lock(),
        };
        let _registration = token.map(|token| token.register(self.cancel_waker()));

        let (item, remaining) = loop {
            if token.is_some_and(CancelToken::is_cancelled) {
                // pass on a signal this waiter may have consumed
                if self.count.load(Ordering::Acquire) > 0 {
                    self.not_empty.notify_one();
                }
                return Err(Interrupted);
            }
            if self.count.load(Ordering::Acquire) > 0 {
                // SAFETY: take lock held and count > 0.
                let item = unsafe { self.dequeue() };
                let previous = self.count.fetch_sub(1, Ordering::AcqRel);
                break (item, previous - 1);
            }
            match deadline {
                None => self.not_empty.wait(&mut take),
                Some(deadline) => {
                    if Instant::now() >= deadline {
                        #[cfg(feature = "metrics")]
                        self.metrics.record_timeout();
                        return Ok(None);
                    }
                    self.not_empty.wait_until(&mut take, deadline);
                },
            }
        };

        if remaining > 0 {
            self.not_empty.notify_all();
        }
        drop(take);
        #[cfg(feature = "metrics")]
        self.metrics.record_take();
        Ok(Some(item))
    }

    /// Waker that broadcasts `not_empty` under the take lock, so a waiter
    /// between its flag check and its wait cannot miss the cancellation.
    fn cancel_waker(&self) -> Waker {
        let take_lock = Arc::clone(&self.take_lock);
        let not_empty = Arc::clone(&self.not_empty);
        Arc::new(move || {
            let _take = take_lock.lock();
            not_empty.notify_all();
        })
    }

    fn on_cancelled(&self, operation: &str) {
        debug!("BlockingMriQueue {} cancelled", operation);
        #[cfg(feature = "metrics")]
        self.metrics.record_cancellation();
    }

    /// Removes and returns the oldest element without waiting.
    pub fn poll(&self) -> Option<T> {
        if self.count.load(Ordering::Acquire) == 0 {
            #[cfg(feature = "metrics")]
            self.metrics.record_poll_miss();
            return None;
        }
        let take = self.take_lock.lock();
        if self.count.load(Ordering::Acquire) == 0 {
            drop(take);
            #[cfg(feature = "metrics")]
            self.metrics.record_poll_miss();
            return None;
        }
        // SAFETY: take lock held and count > 0.
        let item = unsafe { self.dequeue() };
        let previous = self.count.fetch_sub(1, Ordering::AcqRel);
        if previous > 1 {
            self.not_empty.notify_all();
        }
        drop(take);
        #[cfg(feature = "metrics")]
        self.metrics.record_poll_hit();
        Some(item)
    }

    /// Returns a clone of the oldest element without removing it.
    pub fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }
        let _take = self.take_lock.lock();
        if self.count.load(Ordering::Acquire) == 0 {
            return None;
        }
        // SAFETY: take lock held and count > 0, so head.next is published
        // and its item is only modified under the take lock.
        unsafe {
            let head = &*self.head.get();
            let first = (*head.next.get()).node()?;
            (*first.item.get()).clone()
        }
    }

    /// Moves up to `max` elements, oldest first, into `sink`.
    ///
    /// Only the take lock is held, and only while the elements are detached;
    /// `sink` is extended after the lock is released.
    pub fn drain_to<E: Extend<T>>(&self, sink: &mut E, max: usize) -> usize {
        let drained = self.detach_front(max);
        let moved = drained.len();
        sink.extend(drained);
        moved
    }

    /// Moves every element into `sink`.
    pub fn drain_all<E: Extend<T>>(&self, sink: &mut E) -> usize {
        self.drain_to(sink, usize::MAX)
    }

    /// Moves up to `max` elements into another queue, which may evict.
    ///
    /// Draining a queue into itself is rejected before anything moves.
    pub fn drain_into(
        &self,
        target: &BlockingMriQueue<T>,
        max: usize,
    ) -> Result<usize, ArgumentError> {
        if ptr::eq(self, target) {
            return Err(ArgumentError::new("cannot drain a queue into itself"));
        }
        let drained = self.detach_front(max);
        let moved = drained.len();
        for item in drained {
            target.offer(item);
        }
        Ok(moved)
    }

    fn detach_front(&self, max: usize) -> Vec<T> {
        if max == 0 {
            return Vec::new();
        }
        let take = self.take_lock.lock();
        let n = max.min(self.count.load(Ordering::Acquire));
        let mut drained = Vec::with_capacity(n);
        for _ in 0..n {
            // SAFETY: take lock held; count >= n and only the take side
            // decrements it.
            drained.push(unsafe { self.dequeue() });
        }
        if n > 0 {
            let previous = self.count.fetch_sub(n, Ordering::AcqRel);
            if previous > n {
                self.not_empty.notify_all();
            }
        }
        drop(take);
        trace!("BlockingMriQueue drained {} of max {}", n, max);
        #[cfg(feature = "metrics")]
        self.metrics.record_drain(n);
        drained
    }

    // -----------------------------------------------------------------------
    // Whole-queue operations (both locks)
    // -----------------------------------------------------------------------

    fn fully_lock(&self) -> FullLock<'_> {
        let put = self.put_lock.lock();
        let take = self.take_lock.lock();
        FullLock {
            _take: take,
            _put: put,
        }
    }

    /// Removes the first element equal to `item`.
    pub fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        #[cfg(feature = "metrics")]
        self.metrics.record_remove_call();
        let removed = {
            let _locks = self.fully_lock();
            // SAFETY: both locks held.
            unsafe { self.unlink_first(|candidate| candidate == item) }
        };
        let found = removed.is_some();
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
        let _locks = self.fully_lock();
        let mut found = false;
        // SAFETY: both locks held.
        unsafe { self.for_each_live(|candidate| found |= candidate == item) };
        found
    }

    /// Copies the elements, oldest first.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        let _locks = self.fully_lock();
        let mut out = Vec::with_capacity(self.len());
        // SAFETY: both locks held.
        unsafe { self.for_each_live(|item| out.push(item.clone())) };
        out
    }

    /// Keeps only the elements for which `keep` returns `true`.
    /// Returns the number removed.
    ///
    /// `keep` runs with both locks held and must not touch this queue.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let mut removed = Vec::new();
        {
            let _locks = self.fully_lock();
            // SAFETY: both locks held.
            unsafe {
                let mut trail = Arc::clone(&*self.head.get());
                while let Some(p) = (*trail.next.get()).node().cloned() {
                    let kept = (*p.item.get()).as_ref().is_none_or(&mut keep);
                    if kept {
                        trail = p;
                    } else if let Some(item) = self.unlink(&p, &trail) {
                        removed.push(item);
                    }
                }
            }
        }
        removed.len()
    }

    /// Removes every element.
    pub fn clear(&self) {
        let mut dropped = Vec::new();
        {
            let _locks = self.fully_lock();
            // SAFETY: both locks held.
            unsafe {
                let mut h = Arc::clone(&*self.head.get());
                while let Some(p) = (*h.next.get()).node().cloned() {
                    *h.next.get() = Link::Retired;
                    if let Some(item) = (*p.item.get()).take() {
                        dropped.push(item);
                    }
                    h = p;
                }
                *self.head.get() = h;
            }
            self.count.store(0, Ordering::Release);
        }
        debug!("BlockingMriQueue cleared {} elements", dropped.len());
        #[cfg(feature = "metrics")]
        self.metrics.record_clear();
    }

    /// Returns a weakly consistent iterator yielding clones, oldest first.
    ///
    /// The iterator never fails because of concurrent modification. It may
    /// yield an element that was removed after it was prefetched, and skips
    /// elements removed before it reaches them.
    pub fn iter(&self) -> Iter<'_, T>
    where
        T: Clone,
    {
        let _locks = self.fully_lock();
        // SAFETY: both locks held.
        let (next, next_item) = unsafe {
            let head = &*self.head.get();
            self.first_live_from((*head.next.get()).node().cloned())
        };
        Iter {
            queue: self,
            next,
            next_item,
            last_returned: None,
        }
    }

    // -----------------------------------------------------------------------
    // Size
    // -----------------------------------------------------------------------

    #[inline]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// `capacity - len`. A snapshot that may be stale immediately.
    #[inline]
    pub fn remaining_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Verifies the structural invariants under both locks.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let _locks = self.fully_lock();
        let count = self.count.load(Ordering::Acquire);
        if count > self.capacity {
            return Err(InvariantError::new(format!(
                "count {} exceeds capacity {}",
                count, self.capacity
            )));
        }
        // SAFETY: both locks held.
        unsafe {
            let head = &*self.head.get();
            if (*head.item.get()).is_some() {
                return Err(InvariantError::new("sentinel holds an element"));
            }
            let mut live = 0;
            let mut last = Arc::clone(head);
            loop {
                match &*last.next.get() {
                    Link::Retired => {
                        return Err(InvariantError::new("retired node reachable from head"));
                    },
                    Link::End => break,
                    Link::Next(node) => {
                        if (*node.item.get()).is_none() {
                            return Err(InvariantError::new("empty node reachable from head"));
                        }
                        live += 1;
                        let node = Arc::clone(node);
                        last = node;
                    },
                }
            }
            if live != count {
                return Err(InvariantError::new(format!(
                    "count {} but {} reachable elements",
                    count, live
                )));
            }
            if !Arc::ptr_eq(&last, &*self.tail.get()) {
                return Err(InvariantError::new("tail is not the last reachable node"));
            }
        }
        Ok(())
    }

    #[cfg(any(test, debug_assertions))]
    pub fn debug_validate_invariants(&self) {
        if let Err(err) = self.check_invariants() {
            panic!("{}", err);
        }
    }

    #[cfg(feature = "metrics")]
    pub fn metrics_snapshot(&self) -> QueueMetricsSnapshot {
        self.metrics.snapshot(self.len(), self.capacity)
    }

    // -----------------------------------------------------------------------
    // Chain surgery
    // -----------------------------------------------------------------------

    /// Links `node` after `tail`.
    ///
    /// # Safety
    /// Caller holds the put lock.
    unsafe fn enqueue(&self, node: Arc<Node<T>>) {
        // SAFETY: the put lock guards `tail` and the tail node's link.
        unsafe {
            let tail = &mut *self.tail.get();
            *tail.next.get() = Link::Next(Arc::clone(&node));
            *tail = node;
        }
    }

    /// Promotes `head.next` to sentinel, retires the old sentinel and
    /// returns the element. Leaves `count` untouched.
    ///
    /// # Safety
    /// Caller holds the take lock and has observed `count > 0`.
    unsafe fn dequeue(&self) -> T {
        // SAFETY: the take lock guards `head`; `count > 0` means the put side
        // published `head.next` and will not write it again.
        unsafe {
            let head = &mut *self.head.get();
            let first = (*head.next.get())
                .node()
                .cloned()
                .expect("non-empty queue has no first node");
            let old_head = mem::replace(head, first);
            *old_head.next.get() = Link::Retired;
            (*head.item.get())
                .take()
                .expect("live node missing its element")
        }
    }

    /// Unlinks `p`, whose predecessor is `trail`. `p` keeps its forward
    /// link so iterators parked on it can continue.
    ///
    /// # Safety
    /// Caller holds both locks and `trail.next == p`.
    unsafe fn unlink(&self, p: &Arc<Node<T>>, trail: &Arc<Node<T>>) -> Option<T> {
        // SAFETY: both locks held.
        unsafe {
            let item = (*p.item.get()).take();
            *trail.next.get() = (*p.next.get()).clone();
            let tail = &mut *self.tail.get();
            if Arc::ptr_eq(tail, p) {
                *tail = Arc::clone(trail);
            }
            self.count.fetch_sub(1, Ordering::AcqRel);
            item
        }
    }

    /// # Safety
    /// Caller holds both locks.
    unsafe fn unlink_first(&self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        // SAFETY: both locks held; nodes reachable from head are never retired.
        unsafe {
            let mut trail = Arc::clone(&*self.head.get());
            while let Some(p) = (*trail.next.get()).node().cloned() {
                if (*p.item.get()).as_ref().is_some_and(&mut pred) {
                    return self.unlink(&p, &trail);
                }
                trail = p;
            }
        }
        None
    }

    /// # Safety
    /// Caller holds both locks.
    unsafe fn unlink_node(&self, target: &Arc<Node<T>>) -> Option<T> {
        // SAFETY: both locks held.
        unsafe {
            let mut trail = Arc::clone(&*self.head.get());
            while let Some(p) = (*trail.next.get()).node().cloned() {
                if Arc::ptr_eq(&p, target) {
                    return self.unlink(&p, &trail);
                }
                trail = p;
            }
        }
        None
    }

    /// # Safety
    /// Caller holds both locks.
    unsafe fn for_each_live(&self, mut f: impl FnMut(&T)) {
        // SAFETY: both locks held.
        unsafe {
            let head = &*self.head.get();
            let mut current = (*head.next.get()).node().cloned();
            while let Some(node) = current {
                if let Some(item) = (*node.item.get()).as_ref() {
                    f(item);
                }
                current = (*node.next.get()).node().cloned();
            }
        }
    }

    /// Successor of `node`; a retired node continues at the current front.
    ///
    /// # Safety
    /// Caller holds both locks.
    unsafe fn successor(&self, node: &Arc<Node<T>>) -> Option<Arc<Node<T>>> {
        // SAFETY: both locks held.
        unsafe {
            match &*node.next.get() {
                Link::Retired => {
                    let head = &*self.head.get();
                    (*head.next.get()).node().cloned()
                },
                Link::Next(next) => Some(Arc::clone(next)),
                Link::End => None,
            }
        }
    }

    /// First node at or after `start` that still holds an element, with a
    /// clone of that element.
    ///
    /// # Safety
    /// Caller holds both locks.
    unsafe fn first_live_from(
        &self,
        start: Option<Arc<Node<T>>>,
    ) -> (Option<Arc<Node<T>>>, Option<T>)
    where
        T: Clone,
    {
        let mut current = start;
        // SAFETY: both locks held.
        unsafe {
            while let Some(node) = current {
                if let Some(item) = (*node.item.get()).as_ref() {
                    let item = item.clone();
                    return (Some(node), Some(item));
                }
                current = self.successor(&node);
            }
        }
        (None, None)
    }
}

impl<T> Drop for BlockingMriQueue<T> {
    fn drop(&mut self) {
        // unlink iteratively so a long chain does not recurse in Arc::drop
        let head = self.head.get_mut();
        // SAFETY: `&mut self` excludes every other accessor.
        let mut link = unsafe { mem::replace(&mut *head.next.get(), Link::End) };
        while let Link::Next(node) = link {
            link = match Arc::try_unwrap(node) {
                Ok(node) => node.next.into_inner(),
                Err(_) => break,
            };
        }
    }
}

impl<T> fmt::Debug for BlockingMriQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockingMriQueue")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

impl<T: Send> ConcurrentQueue<T> for BlockingMriQueue<T> {
    fn offer(&self, item: T) -> bool {
        BlockingMriQueue::offer(self, item)
    }

    fn poll(&self) -> Option<T> {
        BlockingMriQueue::poll(self)
    }

    fn peek(&self) -> Option<T>
    where
        T: Clone,
    {
        BlockingMriQueue::peek(self)
    }

    fn remove(&self, item: &T) -> bool
    where
        T: PartialEq,
    {
        BlockingMriQueue::remove(self, item)
    }

    fn len(&self) -> usize {
        BlockingMriQueue::len(self)
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&self) {
        BlockingMriQueue::clear(self)
    }
}

impl<T: Send> BlockingQueue<T> for BlockingMriQueue<T> {
    fn put(&self, item: T) {
        BlockingMriQueue::put(self, item)
    }

    fn put_cancellable(&self, item: T, token: &CancelToken) -> Result<(), Interrupted> {
        BlockingMriQueue::put_cancellable(self, item, token)
    }

    fn offer_timeout(&self, item: T, timeout: Duration) -> bool {
        BlockingMriQueue::offer_timeout(self, item, timeout)
    }

    fn offer_timeout_cancellable(
        &self,
        item: T,
        timeout: Duration,
        token: &CancelToken,
    ) -> Result<bool, Interrupted> {
        BlockingMriQueue::offer_timeout_cancellable(self, item, timeout, token)
    }

    fn take(&self) -> T {
        BlockingMriQueue::take(self)
    }

    fn take_cancellable(&self, token: &CancelToken) -> Result<T, Interrupted> {
        BlockingMriQueue::take_cancellable(self, token)
    }

    fn poll_timeout(&self, timeout: Duration) -> Option<T> {
        BlockingMriQueue::poll_timeout(self, timeout)
    }

    fn poll_timeout_cancellable(
        &self,
        timeout: Duration,
        token: &CancelToken,
    ) -> Result<Option<T>, Interrupted> {
        BlockingMriQueue::poll_timeout_cancellable(self, timeout, token)
    }

    fn drain_to<E: Extend<T>>(&self, sink: &mut E, max: usize) -> usize {
        BlockingMriQueue::drain_to(self, sink, max)
    }
}

#[cfg(feature = "metrics")]
impl<T> MetricsSnapshotProvider<QueueMetricsSnapshot> for BlockingMriQueue<T> {
    fn snapshot(&self) -> QueueMetricsSnapshot {
        self.metrics_snapshot()
    }
}

/// Weakly consistent iterator over a [`BlockingMriQueue`].
///
/// Each step takes both queue locks. The next element is prefetched, so
/// `next` may return an element another thread removed in the meantime.
pub struct Iter<'a, T> {
    queue: &'a BlockingMriQueue<T>,
    next: Option<Arc<Node<T>>>,
    next_item: Option<T>,
    last_returned: Option<Arc<Node<T>>>,
}

impl<T> Iter<'_, T> {
    /// Removes the element returned by the last call to `next`.
    ///
    /// Returns `Ok(false)` if it was already removed by another thread.
    pub fn remove(&mut self) -> Result<bool, StateError> {
        let target = self
            .last_returned
            .take()
            .ok_or_else(StateError::remove_without_next)?;
        let removed = {
            let _locks = self.queue.fully_lock();
            // SAFETY: both locks held.
            unsafe { self.queue.unlink_node(&target) }
        };
        Ok(removed.is_some())
    }
}

impl<T: Clone> Iterator for Iter<'_, T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let current = self.next.take()?;
        let item = self.next_item.take();
        let _locks = self.queue.fully_lock();
        // SAFETY: both locks held.
        let (next, next_item) = unsafe {
            let successor = self.queue.successor(&current);
            self.queue.first_live_from(successor)
        };
        self.next = next;
        self.next_item = next_item;
        self.last_returned = Some(current);
        item
    }
}

impl<T> fmt::Debug for Iter<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter")
            .field("exhausted", &self.next.is_none())
            .finish()
    }
}
