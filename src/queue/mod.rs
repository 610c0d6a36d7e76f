//! Queue implementations.
//!
//! | Type                | Module     | Access                  |
//! |---------------------|------------|-------------------------|
//! | `MriQueue`          | `mri`      | `&mut self`             |
//! | `LockedMriQueue`    | `locked`   | one mutex               |
//! | `BlockingMriQueue`  | `blocking` | put lock + take lock    |

#[cfg(feature = "concurrency")]
pub mod blocking;
#[cfg(feature = "concurrency")]
pub mod locked;
pub mod mri;
