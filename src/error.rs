//! Error types for the mriqueue library.
//!
//! ## Key Components
//!
//! - [`ConfigError`]: Returned when a queue is constructed with an invalid
//!   capacity (zero).
//! - [`InvariantError`]: Returned when internal chain invariants are violated
//!   (`check_invariants` methods).
//! - [`Interrupted`]: Returned when a blocking operation is cancelled through
//!   a [`CancelToken`](crate::sync::CancelToken) before it could complete.
//! - [`StateError`]: Returned on illegal cursor/iterator use, such as calling
//!   `remove` before `next` or twice in a row.
//! - [`ArgumentError`]: Returned when an operation receives an argument it
//!   cannot accept, such as draining a queue into itself.
//!
//! ## Example Usage
//!
//! ```
//! use mriqueue::error::ConfigError;
//! use mriqueue::queue::mri::MriQueue;
//!
//! // Fallible constructor for user-configurable capacities
//! let queue: Result<MriQueue<String>, ConfigError> = MriQueue::try_new(16);
//! assert!(queue.is_ok());
//!
//! // Zero capacity is caught without panicking
//! let bad = MriQueue::<String>::try_new(0);
//! assert!(bad.is_err());
//! ```

use std::fmt;

/// Defines a string-carrying error type with `new`, `message`, `Display`
/// and `std::error::Error`.
macro_rules! message_error {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name(String);

        impl $name {
            #[inline]
            pub fn new(msg: impl Into<String>) -> Self {
                Self(msg.into())
            }

            /// Returns the error description.
            #[inline]
            pub fn message(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::error::Error for $name {}
    };
}

message_error! {
    /// Internal queue invariants are violated.
    ///
    /// Produced by `check_invariants` methods on queue types
    /// (e.g. [`MriQueue::check_invariants`](crate::queue::mri::MriQueue::check_invariants)).
    /// Carries a human-readable description of which invariant failed.
    InvariantError
}

message_error! {
    /// Queue configuration parameters are invalid.
    ///
    /// Produced by fallible constructors such as
    /// [`MriQueue::try_new`](crate::queue::mri::MriQueue::try_new) and
    /// [`QueueBuilder::try_build`](crate::builder::QueueBuilder::try_build).
    ///
    /// # Example
    ///
    /// ```
    /// use mriqueue::queue::mri::MriQueue;
    ///
    /// let err = MriQueue::<u64>::try_new(0).unwrap_err();
    /// assert!(err.to_string().contains("capacity"));
    /// ```
    ConfigError
}

message_error! {
    /// A cursor or iterator was used out of order.
    ///
    /// Calling `remove` before the first successful `next`, or twice without
    /// an intervening `next`, is a programming error. The queue is left
    /// untouched.
    StateError
}

message_error! {
    /// An argument was rejected before any state was touched.
    ArgumentError
}

impl ConfigError {
    pub(crate) fn zero_capacity() -> Self {
        Self::new("capacity must be greater than zero")
    }
}

impl StateError {
    pub(crate) fn remove_without_next() -> Self {
        Self::new("remove called without a preceding call to next")
    }
}

/// Validates a queue capacity.
pub(crate) fn validate_capacity(capacity: usize) -> Result<usize, ConfigError> {
    if capacity == 0 {
        Err(ConfigError::zero_capacity())
    } else {
        Ok(capacity)
    }
}

/// Error returned when a blocking operation is cancelled.
///
/// A cancelled operation leaves the queue exactly as it found it: nothing is
/// removed by a cancelled `take`, nothing is inserted by a cancelled `put`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Interrupted;

impl fmt::Display for Interrupted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation interrupted by cancellation")
    }
}

impl std::error::Error for Interrupted {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
