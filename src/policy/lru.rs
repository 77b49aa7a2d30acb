//! # LRU (Least Recently Used) Policy
//!
//! Evicts the entry that has gone longest without being read or written.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────┐
//!   │                         LruCache<K, V>                           │
//!   │                                                                  │
//!   │   index: FxHashMap<K, SlotId>                                    │
//!   │                                                                  │
//!   │   order: IntrusiveList<Entry<K, V>>                              │
//!   │     head (MRU) ─► [C] ◄──► [A] ◄──► [B] ◄── tail (LRU, victim)   │
//!   └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Operation   | Time | Notes                                   |
//! |-------------|------|-----------------------------------------|
//! | `get` (hit) | O(1) | moves the entry to the MRU position     |
//! | `put` (new) | O(1) | evicts the tail first when full         |
//! | `put` (upd) | O(1) | replaces the value and moves it to MRU  |
//! | `contains`  | O(1) | no reordering                           |
//!
//! ## Example
//!
//! ```
//! use edgesim::policy::lru::LruCache;
//! use edgesim::traits::EvictionPolicy;
//!
//! let mut cache = LruCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");      // "b" is now least recently used
//! cache.put("c", 3);    // evicts "b"
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
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

/// Recency-ordered cache: hits and updates move the key to the MRU end.
pub struct LruCache<K, V> {
    capacity: usize,
    index: FxHashMap<K, SlotId>,
    order: IntrusiveList<Entry<K, V>>,
    counters: AccessCounters,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            order: IntrusiveList::with_capacity(capacity),
            counters: AccessCounters::default(),
        }
    }

    /// Key that the next eviction would remove.
    pub fn peek_victim(&self) -> Option<&K> {
        self.order.back().map(|entry| &entry.key)
    }

    /// Keys from most to least recently used.
    pub fn keys_by_recency(&self) -> impl Iterator<Item = &K> {
        self.order.iter().map(|entry| &entry.key)
    }

    fn evict_lru(&mut self) -> Option<K> {
        let entry = self.order.pop_back()?;
        self.index.remove(&entry.key);
        Some(entry.key)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.order.check_invariants()?;
        if self.index.len() != self.order.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys but recency list has {}",
                self.index.len(),
                self.order.len()
            )));
        }
        if self.order.len() > self.capacity {
            return Err(InvariantError::new("lru cache over capacity"));
        }
        for (key, id) in &self.index {
            match self.order.get(*id) {
                Some(entry) if entry.key == *key => {},
                _ => return Err(InvariantError::new("index points at the wrong slot")),
            }
        }
        Ok(())
    }
}

impl<K, V> EvictionPolicy<K, V> for LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&id) = self.index.get(key) else {
            self.counters.record(false);
            return None;
        };
        self.order.move_to_front(id);
        self.counters.record(true);
        self.order.get(id).map(|entry| &entry.value)
    }

    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.order.get_mut(id) {
                entry.value = value;
            }
            self.order.move_to_front(id);
            return;
        }

        if self.order.len() >= self.capacity {
            self.evict_lru();
        }

        let id = self.order.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn stats(&self) -> PolicyStats {
        self.counters.stats(self.order.len(), self.capacity)
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.index.clear();
        self.order.clear();
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("capacity", &self.capacity)
            .field("len", &self.order.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod basic_behavior {
        use super::*;

        #[test]
        fn get_returns_stored_value() {
            let mut cache = LruCache::new(3);
            cache.put("a", 1);
            cache.put("b", 2);
            assert_eq!(cache.get(&"a"), Some(&1));
            assert_eq!(cache.get(&"b"), Some(&2));
            assert_eq!(cache.get(&"z"), None);
        }

        #[test]
        fn put_updates_existing_value() {
            let mut cache = LruCache::new(2);
            cache.put("a", 1);
            cache.put("a", 10);
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.get(&"a"), Some(&10));
        }

        #[test]
        fn stats_count_hits_and_misses() {
            let mut cache = LruCache::new(2);
            cache.put(1, ());
            cache.get(&1);
            cache.get(&1);
            cache.get(&2);
            let stats = cache.stats();
            assert_eq!(stats.hits, 2);
            assert_eq!(stats.misses, 1);
            assert_eq!(stats.size, 1);
            assert_eq!(stats.capacity, 2);
        }

        #[test]
        fn contains_has_no_side_effects() {
            let mut cache = LruCache::new(2);
            cache.put("a", 1);
            cache.put("b", 2);
            assert!(cache.contains(&"a"));
            assert!(!cache.contains(&"z"));
            assert_eq!(cache.stats().hits + cache.stats().misses, 0);

            // "a" is still the victim since contains() did not promote it.
            assert_eq!(cache.peek_victim(), Some(&"a"));
        }
    }

    mod eviction {
        use super::*;

        #[test]
        fn accessed_key_survives_eviction() {
            let mut cache = LruCache::new(2);
            cache.put("A", ());
            cache.put("B", ());
            assert!(cache.get(&"A").is_some());
            cache.put("C", ());

            assert!(cache.contains(&"A"));
            assert!(!cache.contains(&"B"));
            assert!(cache.contains(&"C"));
        }

        #[test]
        fn update_promotes_to_mru() {
            let mut cache = LruCache::new(2);
            cache.put("A", 1);
            cache.put("B", 2);
            cache.put("A", 3);
            cache.put("C", 4);
            assert!(cache.contains(&"A"));
            assert!(!cache.contains(&"B"));
        }

        #[test]
        fn recency_order_is_tracked() {
            let mut cache = LruCache::new(3);
            cache.put(1, ());
            cache.put(2, ());
            cache.put(3, ());
            cache.get(&1);
            let order: Vec<_> = cache.keys_by_recency().copied().collect();
            assert_eq!(order, vec![1, 3, 2]);
            assert_eq!(cache.peek_victim(), Some(&2));
        }

        #[test]
        fn never_exceeds_capacity() {
            let mut cache = LruCache::new(4);
            for i in 0..100 {
                cache.put(i, i);
                assert!(cache.len() <= 4);
            }
            cache.check_invariants().unwrap();
        }
    }

    mod edge_cases {
        use super::*;

        #[test]
        fn zero_capacity_stores_nothing() {
            let mut cache = LruCache::new(0);
            cache.put("a", 1);
            assert_eq!(cache.len(), 0);
            assert_eq!(cache.get(&"a"), None);
            assert_eq!(cache.stats().hit_ratio(), 0.0);
        }

        #[test]
        fn single_slot_cache_replaces_entry() {
            let mut cache = LruCache::new(1);
            cache.put("a", 1);
            cache.put("b", 2);
            assert_eq!(cache.len(), 1);
            assert!(cache.contains(&"b"));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn clear_keeps_counters() {
            let mut cache = LruCache::new(2);
            cache.put("a", 1);
            cache.get(&"a");
            cache.clear();
            assert!(cache.is_empty());
            assert_eq!(cache.stats().hits, 1);
            cache.check_invariants().unwrap();
        }
    }
}
