//! Session tokens
//!
//! Every aggregation cycle carries a token. Issuing a new token from the same
//! source makes all earlier ones stale, and stale cycles must drop their
//! results instead of committing them.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Monotonic epoch shared by all cycles of one view
#[derive(Debug, Clone, Default)]
pub struct TokenSource {
    epoch: Arc<AtomicU64>,
}

/// Identifies one cycle; current until the source issues another
#[derive(Debug, Clone)]
pub struct SessionToken {
    value: u64,
    epoch: Arc<AtomicU64>,
}

impl TokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh token, superseding every token issued before it
    pub fn issue(&self) -> SessionToken {
        let value = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        SessionToken {
            value,
            epoch: Arc::clone(&self.epoch),
        }
    }

    /// The latest issued epoch, 0 before the first `issue`
    pub fn current(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

impl SessionToken {
    pub fn is_current(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) == self.value
    }

    pub fn value(&self) -> u64 {
        self.value
    }
}

impl PartialEq for SessionToken {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value && Arc::ptr_eq(&self.epoch, &other.epoch)
    }
}

impl Eq for SessionToken {}
