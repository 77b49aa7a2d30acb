//! # Hybrid Frequency/Recency Policy
//!
//! Evicts the key with the lowest access count; when several keys share that
//! count, the least recently used of them goes first. Hits and updates both
//! bump the frequency and refresh recency.
//!
//! ```text
//!   entries: FxHashMap<K, Meta { value, freq, tick }>
//!   order:   BTreeMap<(freq, tick), K>
//!
//!            (1, 4) ─► "D"   ◄── first entry = victim
//!            (1, 7) ─► "B"
//!            (3, 9) ─► "A"
//! ```
//!
//! `tick` comes from a counter shared by every key in the cache, so it
//! defines one global recency order. Each access removes the key's old
//! `(freq, tick)` pair and inserts the new one, which keeps eviction at
//! O(log n) instead of scanning every key.
//!
//! ## Example
//!
//! ```
//! use edgesim::policy::hybrid::HybridCache;
//! use edgesim::traits::EvictionPolicy;
//!
//! let mut cache = HybridCache::new(2);
//! cache.put("A", 1);
//! cache.put("B", 2);
//! cache.put("C", 3); // A and B both have frequency 1; A is older
//!
//! assert!(!cache.contains(&"A"));
//! assert!(cache.contains(&"B"));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

use rustc_hash::FxHashMap;

use crate::error::InvariantError;
use crate::traits::{AccessCounters, EvictionPolicy, PolicyStats};

#[derive(Debug)]
struct Meta<V> {
    value: V,
    freq: u64,
    tick: u64,
}

impl<V> Meta<V> {
    fn rank(&self) -> (u64, u64) {
        (self.freq, self.tick)
    }
}

/// Frequency-first eviction with least-recently-used tie-breaking.
pub struct HybridCache<K, V> {
    capacity: usize,
    entries: FxHashMap<K, Meta<V>>,
    order: BTreeMap<(u64, u64), K>,
    tick: u64,
    counters: AccessCounters,
}

impl<K, V> HybridCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: BTreeMap::new(),
            tick: 0,
            counters: AccessCounters::default(),
        }
    }

    pub fn frequency(&self, key: &K) -> Option<u64> {
        self.entries.get(key).map(|meta| meta.freq)
    }

    /// Key that the next eviction would remove.
    pub fn peek_victim(&self) -> Option<&K> {
        self.order.values().next()
    }

    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    /// Bumps frequency and recency of a cached key.
    fn touch(&mut self, key: &K) -> bool {
        let tick = self.next_tick();
        let Some(meta) = self.entries.get_mut(key) else {
            return false;
        };
        if let Some(k) = self.order.remove(&meta.rank()) {
            meta.freq = meta.freq.saturating_add(1);
            meta.tick = tick;
            self.order.insert(meta.rank(), k);
        }
        true
    }

    fn evict_one(&mut self) -> Option<K> {
        let (_, victim) = self.order.pop_first()?;
        self.entries.remove(&victim);
        Some(victim)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.entries.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "{} entries but {} ordering slots",
                self.entries.len(),
                self.order.len()
            )));
        }
        if self.entries.len() > self.capacity {
            return Err(InvariantError::new("hybrid cache over capacity"));
        }
        for (key, meta) in &self.entries {
            if meta.freq == 0 {
                return Err(InvariantError::new("cached key with zero frequency"));
            }
            if meta.tick > self.tick {
                return Err(InvariantError::new("entry tick ahead of the clock"));
            }
            if self.order.get(&meta.rank()) != Some(key) {
                return Err(InvariantError::new(format!(
                    "ordering slot {:?} does not point back at its key",
                    meta.rank()
                )));
            }
        }
        Ok(())
    }
}

impl<K, V> EvictionPolicy<K, V> for HybridCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let hit = self.touch(key);
        self.counters.record(hit);
        if !hit {
            return None;
        }
        self.entries.get(key).map(|meta| &meta.value)
    }

    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if self.touch(&key) {
            if let Some(meta) = self.entries.get_mut(&key) {
                meta.value = value;
            }
            return;
        }

        if self.entries.len() >= self.capacity {
            self.evict_one();
        }

        let meta = Meta {
            value,
            freq: 1,
            tick: self.next_tick(),
        };
        self.order.insert(meta.rank(), key.clone());
        self.entries.insert(key, meta);
    }

    fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    fn stats(&self) -> PolicyStats {
        self.counters.stats(self.entries.len(), self.capacity)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

impl<K, V> fmt::Debug for HybridCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HybridCache")
            .field("capacity", &self.capacity)
            .field("len", &self.entries.len())
            .field("tick", &self.tick)
            .finish_non_exhaustive()
    }
}
