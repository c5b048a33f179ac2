//! Page visibility tracking with pluggable document hosts.
//!
//! A [`VisibilityTracker`] watches a document-like host for hidden/visible
//! transitions and exposes two flags: the current visibility and a one-way
//! latch recording whether visibility was ever lost. The host is injected
//! through the [`DocumentHost`] trait, so anything that can answer "is the
//! page hidden?" and deliver change events can back a tracker.

pub mod api;
pub mod error;
pub mod host;
mod tracker;

pub use api::VisibilityApi;
pub use error::HostError;
pub use host::{DocumentHost, ListenerId, MemoryDocument, VisibilityListener};
#[cfg(target_os = "linux")]
pub use host::X11Document;
pub use tracker::{VisibilityState, VisibilityTracker};

use log::warn;
use std::sync::{Mutex, MutexGuard};

/// Lock a mutex, recovering from poisoning if necessary
pub(crate) fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
