//! # LFU (Least Frequently Used) Policy
//!
//! Evicts an entry with the lowest access count; among entries sharing that
//! count, the one that entered the bucket first goes first.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LfuCache<K, V>                              │
//!   │                                                                      │
//!   │   index: FxHashMap<K, Location { freq, slot }>                       │
//!   │                                                                      │
//!   │   buckets: FxHashMap<u64, IntrusiveList<Entry<K, V>>>                │
//!   │                                                                      │
//!   │     min_freq = 1                                                     │
//!   │        │                                                             │
//!   │        ▼                                                             │
//!   │     freq=1: front ─► [B] ◄──► [D] ◄── back   (front = oldest)        │
//!   │     freq=3: front ─► [A] ◄── back                                    │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frequency Lifecycle
//!
//! ```text
//!   put(new)  ──► freq = 1, appended to bucket 1, min_freq = 1
//!   get(hit)  ──► unlinked from bucket f, appended to bucket f+1
//!                 if bucket f emptied and f == min_freq: min_freq += 1
//!   evict     ──► pop front of bucket min_freq
//! ```
//!
//! Every operation is O(1): the minimum only ever moves up by one on a
//! promotion and is reset to 1 by each new insertion.
//!
//! ## Example
//!
//! ```
//! use edgesim::policy::lfu::LfuCache;
//! use edgesim::traits::EvictionPolicy;
//!
//! let mut cache = LfuCache::new(2);
//! cache.put("A", 1);
//! cache.put("B", 2);
//! for _ in 0..3 {
//!     cache.get(&"A");
//! }
//! cache.get(&"B");
//! cache.put("C", 3); // "B" has the lower frequency
//!
//! assert_eq!(cache.frequency(&"A"), Some(4));
//! assert!(!cache.contains(&"B"));
//! ```

use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::ds::{IntrusiveList, SlotId};
use crate::error::InvariantError;
use crate::traits::{AccessCounters, EvictionPolicy, PolicyStats};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location {
    freq: u64,
    slot: SlotId,
}

/// Frequency-bucketed cache with FIFO tie-breaking inside a bucket.
pub struct LfuCache<K, V> {
    capacity: usize,
    index: FxHashMap<K, Location>,
    buckets: FxHashMap<u64, IntrusiveList<Entry<K, V>>>,
    min_freq: u64,
    counters: AccessCounters,
}

impl<K, V> LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
            counters: AccessCounters::default(),
        }
    }

    /// Access count of `key` (1 right after insertion).
    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.index.get(key).map(|loc| loc.freq)
    }

    /// Key that the next eviction would remove.
    pub fn peek_victim(&self) -> Option<&K> {
        self.buckets
            .get(&self.min_freq)
            .and_then(|bucket| bucket.front())
            .map(|entry| &entry.key)
    }

    /// Moves `key` from its bucket to the next frequency bucket.
    fn promote(&mut self, key: &K) -> Option<Location> {
        let old = *self.index.get(key)?;
        let bucket = self.buckets.get_mut(&old.freq)?;
        let entry = bucket.remove(old.slot)?;
        if bucket.is_empty() {
            self.buckets.remove(&old.freq);
            if self.min_freq == old.freq {
                self.min_freq = self.min_freq.saturating_add(1);
            }
        }

        let freq = old.freq.saturating_add(1);
        let slot = self.buckets.entry(freq).or_default().push_back(entry);
        let new = Location { freq, slot };
        if let Some(loc) = self.index.get_mut(key) {
            *loc = new;
        }
        Some(new)
    }

    fn evict_lfu(&mut self) -> Option<K> {
        if !self.buckets.contains_key(&self.min_freq) {
            // Only reachable if min_freq went stale; recover from the buckets.
            self.min_freq = *self.buckets.keys().min()?;
        }
        let freq = self.min_freq;
        let bucket = self.buckets.get_mut(&freq)?;
        let entry = bucket.pop_front()?;
        if bucket.is_empty() {
            self.buckets.remove(&freq);
        }
        self.index.remove(&entry.key);
        Some(entry.key)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let total: usize = self.buckets.values().map(IntrusiveList::len).sum();
        if total != self.index.len() {
            return Err(InvariantError::new(format!(
                "buckets hold {total} entries but index has {}",
                self.index.len()
            )));
        }
        if total > self.capacity {
            return Err(InvariantError::new("lfu cache over capacity"));
        }
        if total == 0 {
            return Ok(());
        }

        let lowest = self.buckets.keys().min().copied();
        if lowest != Some(self.min_freq) {
            return Err(InvariantError::new(format!(
                "min_freq is {} but lowest bucket is {lowest:?}",
                self.min_freq
            )));
        }

        for (&freq, bucket) in &self.buckets {
            if bucket.is_empty() {
                return Err(InvariantError::new(format!("bucket {freq} is empty")));
            }
            bucket.check_invariants()?;
        }

        for (key, loc) in &self.index {
            let found = self
                .buckets
                .get(&loc.freq)
                .and_then(|bucket| bucket.get(loc.slot))
                .is_some_and(|entry| entry.key == *key);
            if !found {
                return Err(InvariantError::new(format!(
                    "index entry at freq {} points at the wrong slot",
                    loc.freq
                )));
            }
        }
        Ok(())
    }
}

impl<K, V> EvictionPolicy<K, V> for LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(loc) = self.promote(key) else {
            self.counters.record(false);
            return None;
        };
        self.counters.record(true);
        self.buckets
            .get(&loc.freq)
            .and_then(|bucket| bucket.get(loc.slot))
            .map(|entry| &entry.value)
    }

    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(loc) = self.promote(&key) {
            if let Some(entry) = self
                .buckets
                .get_mut(&loc.freq)
                .and_then(|bucket| bucket.get_mut(loc.slot))
            {
                entry.value = value;
            }
            return;
        }

        if self.index.len() >= self.capacity {
            self.evict_lfu();
        }

        let slot = self.buckets.entry(1).or_default().push_back(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, Location { freq: 1, slot });
        self.min_freq = 1;
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn stats(&self) -> PolicyStats {
        self.counters.stats(self.index.len(), self.capacity)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("capacity", &self.capacity)
            .field("len", &self.index.len())
            .field("min_freq", &self.min_freq)
            .field("buckets", &self.buckets.len())
            .finish_non_exhaustive()
    }
}
