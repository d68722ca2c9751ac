//! Tests for the dispatch engine
//!
//! Shared fixtures live here; scenarios are grouped by behaviour in the
//! `tests/` submodules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;


/// Payload that counts how many times it has been released
pub(super) struct DropCounter {
    drops: Arc<AtomicUsize>,
}

impl DropCounter {
    pub(super) fn new(drops: &Arc<AtomicUsize>) -> Self {
        Self {
            drops: Arc::clone(drops),
        }
    }
}

impl Drop for DropCounter {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}
