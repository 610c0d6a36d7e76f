//! Cooperative cancellation for blocking queue operations.
//!
//! A [`CancelToken`] is a cloneable handle shared between the thread that
//! blocks and whoever may want to stop it. Cancelling sets a sticky flag and
//! runs every registered waker, so a thread parked on a condition variable
//! wakes up, observes the flag, and returns [`Interrupted`].
//!
//! ```text
//!   blocked thread                         canceller
//!   ──────────────                         ─────────
//!   lock take side
//!   register waker ───────────┐
//!   flag set? no              │
//!   wait(not_empty) ◄─────────┼──────────  cancel()
//!                             └──► waker:    set flag
//!   wake, flag set? yes                      lock take side, notify_all
//!   return Err(Interrupted)
//! ```
//!
//! The waker takes the waiter's mutex before notifying, so a cancel that
//! races with the waiter's flag check cannot be lost: either the waiter sees
//! the flag, or it is already parked when the notification arrives.
//!
//! Mutex acquisition cannot be woken externally; cancellable lock acquisition
//! retries `try_lock_for` in slices of [`CANCEL_POLL_INTERVAL`].

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, MutexGuard};

use crate::error::Interrupted;

/// Upper bound on how long a cancelled lock acquisition keeps trying.
pub const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(2);

pub(crate) type Waker = Arc<dyn Fn() + Send + Sync>;

struct Inner {
    cancelled: AtomicBool,
    next_waker_id: AtomicU64,
    wakers: Mutex<Vec<(u64, Waker)>>,
}

/// Shared cancellation flag for blocking operations.
///
/// # Example
///
/// ```
/// use mriqueue::sync::CancelToken;
///
/// let token = CancelToken::new();
/// let handle = token.clone();
/// assert!(!token.is_cancelled());
/// handle.cancel();
/// assert!(token.is_cancelled());
/// token.reset();
/// assert!(!handle.is_cancelled());
/// ```
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                next_waker_id: AtomicU64::new(0),
                wakers: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Requests cancellation and wakes every operation blocked on this token.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        // run wakers outside the registry lock; a waker takes a queue lock
        let wakers: Vec<Waker> = self
            .inner
            .wakers
            .lock()
            .iter()
            .map(|(_, waker)| Arc::clone(waker))
            .collect();
        for waker in wakers {
            (*waker)();
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Clears the flag so the token can be reused.
    pub fn reset(&self) {
        self.inner.cancelled.store(false, Ordering::SeqCst);
    }

    /// Returns `Err(Interrupted)` if cancellation was requested.
    #[inline]
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_cancelled() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Registers `waker` until the returned guard is dropped.
    pub(crate) fn register(&self, waker: Waker) -> WakerRegistration<'_> {
        let id = self.inner.next_waker_id.fetch_add(1, Ordering::Relaxed);
        self.inner.wakers.lock().push((id, waker));
        WakerRegistration { token: self, id }
    }

    #[cfg(test)]
    fn registered(&self) -> usize {
        self.inner.wakers.lock().len()
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

pub(crate) struct WakerRegistration<'a> {
    token: &'a CancelToken,
    id: u64,
}

impl Drop for WakerRegistration<'_> {
    fn drop(&mut self) {
        let mut wakers = self.token.inner.wakers.lock();
        if let Some(pos) = wakers.iter().position(|(id, _)| *id == self.id) {
            wakers.swap_remove(pos);
        }
    }
}

/// Acquires `lock`, giving up when `token` is cancelled.
///
/// Fails immediately if the token is already cancelled, even when the lock
/// is free.
pub(crate) fn lock_cancellable<'a, T>(
    lock: &'a Mutex<T>,
    token: &CancelToken,
) -> Result<MutexGuard<'a, T>, Interrupted> {
    loop {
        token.check()?;
        if let Some(guard) = lock.try_lock_for(CANCEL_POLL_INTERVAL) {
            return Ok(guard);
        }
    }
}

/// Acquires `lock` before `deadline`, giving up when `token` is cancelled.
/// `Ok(None)` means the deadline passed.
pub(crate) fn lock_until_cancellable<'a, T>(
    lock: &'a Mutex<T>,
    deadline: Option<Instant>,
    token: &CancelToken,
) -> Result<Option<MutexGuard<'a, T>>, Interrupted> {
    loop {
        token.check()?;
        let slice = match deadline {
            Some(deadline) => {
                let now = Instant::now();
                if now >= deadline {
                    return Ok(lock.try_lock());
                }
                (deadline - now).min(CANCEL_POLL_INTERVAL)
            },
            None => CANCEL_POLL_INTERVAL,
        };
        if let Some(guard) = lock.try_lock_for(slice) {
            return Ok(Some(guard));
        }
    }
}

/// `now + timeout`, or `None` when the sum does not fit in an `Instant`.
pub(crate) fn deadline_after(timeout: Duration) -> Option<Instant> {
    Instant::now().checked_add(timeout)
}
