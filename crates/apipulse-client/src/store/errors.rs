//! Capped distinct-key count table, shared by the validation error and server
//! error sub-tables.

use std::collections::HashMap;
use std::hash::Hash;
use std::mem;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Counts occurrences per distinct key, with a hard cap on how many distinct
/// keys are tracked. Bounds memory under adversarial or fuzzing traffic.
#[derive(Debug)]
pub(crate) struct CappedCountTable<K> {
    counts: Mutex<HashMap<K, u64>>,
    cap: usize,
    dropped: AtomicU64,
}

impl<K: Eq + Hash> CappedCountTable<K> {
    pub fn new(cap: usize) -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
            cap,
            dropped: AtomicU64::new(0),
        }
    }

    /// Count one occurrence. A new distinct key beyond the cap is silently
    /// dropped and only the overflow counter moves; existing keys always keep
    /// counting.
    pub fn add(&self, key: K) {
        let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = counts.get_mut(&key) {
            *count += 1;
            return;
        }
        if counts.len() >= self.cap {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        counts.insert(key, 1);
    }

    /// Drain all counts plus the overflow counter, resetting both.
    pub fn drain(&self) -> (Vec<(K, u64)>, u64) {
        let drained = {
            let mut counts = self.counts.lock().unwrap_or_else(|e| e.into_inner());
            mem::take(&mut *counts)
        };
        let dropped = self.dropped.swap(0, Ordering::Relaxed);
        (drained.into_iter().collect(), dropped)
    }
}
