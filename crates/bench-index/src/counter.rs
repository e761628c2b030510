//! Counters shared by all workers of a benchmark.
//!
//! These are the only mutable state the workers share. Both use
//! fetch-and-increment, so concurrent callers never observe the same value.

use bytes::Bytes;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Prefix of every minted key.
pub const KEY_PREFIX: &str = "key-";

/// Mints globally unique keys `key-0`, `key-1`, ...
///
/// Clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct KeyMinter {
    next: Arc<AtomicU64>,
}

impl KeyMinter {
    /// Create a minter whose first key is `key-{start}`.
    pub fn new(start: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Mint the next key.
    pub fn next_key(&self) -> Bytes {
        let postfix = self.next.fetch_add(1, Ordering::SeqCst);
        Bytes::from(format!("{KEY_PREFIX}{postfix}"))
    }

    /// Rewind so the next key is `key-{start}`. Must not race with `next_key`.
    pub fn reset(&self, start: u64) {
        self.next.store(start, Ordering::SeqCst);
    }
}

/// Hands out transaction timestamps `start`, `start + 1`, ...
///
/// Clones share the same counter.
#[derive(Debug, Clone)]
pub struct TimestampClock {
    next: Arc<AtomicU64>,
}

impl TimestampClock {
    /// Create a clock whose first timestamp is `start`.
    pub fn new(start: u64) -> Self {
        Self {
            next: Arc::new(AtomicU64::new(start)),
        }
    }

    /// Take the next timestamp.
    pub fn tick(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

impl Default for TimestampClock {
    fn default() -> Self {
        Self::new(1)
    }
}
