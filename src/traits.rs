//! # Queue Trait Hierarchy
//!
//! Unified interfaces for the three MRI queue variants. Exclusive-access and
//! shared-access queues get separate traits, the way single-threaded caches
//! and concurrent stores are split: `&mut self` for the sequential queue,
//! `&self` for anything that can be shared between threads.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────┐      ┌────────────────────────────────┐
//!   │           Queue<T>             │      │      ConcurrentQueue<T>        │
//!   │                                │      │      (Send + Sync)             │
//!   │  offer(&mut, T) → bool         │      │  offer(&, T) → bool            │
//!   │  poll(&mut) → Option<T>        │      │  poll(&) → Option<T>           │
//!   │  peek(&) → Option<&T>          │      │  peek(&) → Option<T>  (Clone)  │
//!   │  remove(&mut, &T) → bool       │      │  remove(&, &T) → bool          │
//!   │  len / capacity / clear        │      │  len / capacity / clear        │
//!   └───────────────┬────────────────┘      └───────────────┬────────────────┘
//!                   │                                       │
//!                   ▼                          ┌────────────┴────────────┐
//!             ┌───────────┐                    ▼                         ▼
//!             │ MriQueue  │            ┌───────────────┐     ┌──────────────────────┐
//!             └───────────┘            │LockedMriQueue │     │  BlockingQueue<T>    │
//!                                      └───────────────┘     │                      │
//!                                                            │  put / take          │
//!                                                            │  offer_timeout       │
//!                                                            │  poll_timeout        │
//!                                                            │  *_cancellable       │
//!                                                            │  drain_to            │
//!                                                            └──────────┬───────────┘
//!                                                                       ▼
//!                                                             ┌──────────────────┐
//!                                                             │ BlockingMriQueue │
//!                                                             └──────────────────┘
//! ```
//!
//! ## MRI Semantics
//!
//! Every implementation shares one contract: `offer` never fails and never
//! waits for space. When the queue is full, the oldest element is evicted to
//! make room, so the queue always holds the `capacity` most recently inserted
//! elements that have not been removed yet.
//!
//! ## Example
//!
//! ```
//! use mriqueue::queue::mri::MriQueue;
//! use mriqueue::traits::Queue;
//!
//! fn fill<Q: Queue<u32>>(queue: &mut Q, n: u32) {
//!     for i in 0..n {
//!         assert!(queue.offer(i));
//!     }
//! }
//!
//! let mut queue = MriQueue::new(3);
//! fill(&mut queue, 5);
//! assert_eq!(queue.len(), 3);
//! assert_eq!(queue.peek(), Some(&2));
//! ```

#[cfg(feature = "concurrency")]
use std::time::Duration;

#[cfg(feature = "concurrency")]
use crate::error::Interrupted;
#[cfg(feature = "concurrency")]
use crate::sync::CancelToken;

/// Bounded MRI queue with exclusive (`&mut self`) access.
pub trait Queue<T> {
    /// Inserts `item`, evicting the oldest element if full. Always `true`.
    fn offer(&mut self, item: T) -> bool;

    /// Removes and returns the oldest element.
    fn poll(&mut self) -> Option<T>;

    /// Returns the oldest element without removing it.
    fn peek(&self) -> Option<&T>;

    /// Removes the first element equal to `item`.
    fn remove(&mut self, item: &T) -> bool
    where
        T: PartialEq;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    /// `capacity - len`.
    fn remaining_capacity(&self) -> usize {
        self.capacity() - self.len()
    }

    fn clear(&mut self);
}

/// Bounded MRI queue that can be shared between threads.
pub trait ConcurrentQueue<T>: Send + Sync {
    /// Inserts `item`, evicting the oldest element if full. Always `true`.
    fn offer(&self, item: T) -> bool;

    /// Removes and returns the oldest element without waiting.
    fn poll(&self) -> Option<T>;

    /// Returns a clone of the oldest element.
    fn peek(&self) -> Option<T>
    where
        T: Clone;

    /// Removes the first element equal to `item`.
    fn remove(&self, item: &T) -> bool
    where
        T: PartialEq;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    fn remaining_capacity(&self) -> usize {
        self.capacity().saturating_sub(self.len())
    }

    fn clear(&self);
}

/// Concurrent MRI queue whose consumers can wait for elements.
#[cfg(feature = "concurrency")]
pub trait BlockingQueue<T>: ConcurrentQueue<T> {
    /// Inserts `item`, waiting only for the insertion lock.
    fn put(&self, item: T);

    /// Like [`put`](Self::put), but gives up if `token` is cancelled while
    /// waiting for the insertion lock.
    fn put_cancellable(&self, item: T, token: &CancelToken) -> Result<(), Interrupted>;

    /// Inserts `item` if the insertion lock can be acquired within `timeout`.
    fn offer_timeout(&self, item: T, timeout: Duration) -> bool;

    /// Like [`offer_timeout`](Self::offer_timeout), also giving up once
    /// `token` is cancelled. Nothing is inserted on `Err`.
    fn offer_timeout_cancellable(
        &self,
        item: T,
        timeout: Duration,
        token: &CancelToken,
    ) -> Result<bool, Interrupted>;

    /// Removes the oldest element, waiting until one is available.
    fn take(&self) -> T;

    /// Like [`take`](Self::take), but returns `Err(Interrupted)` without
    /// removing anything if `token` is cancelled.
    fn take_cancellable(&self, token: &CancelToken) -> Result<T, Interrupted>;

    /// Removes the oldest element, waiting at most `timeout`.
    fn poll_timeout(&self, timeout: Duration) -> Option<T>;

    /// Like [`poll_timeout`](Self::poll_timeout), but returns
    /// `Err(Interrupted)` without removing anything once `token` is cancelled.
    fn poll_timeout_cancellable(
        &self,
        timeout: Duration,
        token: &CancelToken,
    ) -> Result<Option<T>, Interrupted>;

    /// Moves up to `max` elements, oldest first, into `sink`.
    fn drain_to<E: Extend<T>>(&self, sink: &mut E, max: usize) -> usize
    where
        Self: Sized;
}
