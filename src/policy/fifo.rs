//! # FIFO (First In, First Out) Policy
//!
//! Evicts the earliest-inserted key still present. Reads never reorder
//! anything and an update keeps the key's original queue position, so
//! eviction order depends on insertion sequence alone.
//!
//! ```text
//!   queue: front (oldest, victim) ─► [A] ◄──► [B] ◄──► [C] ◄── back (newest)
//!   index: FxHashMap<K, SlotId>
//! ```
//!
//! Unlike a `VecDeque` of keys, the queue is an [`IntrusiveList`] so every
//! cached key has exactly one queue node and no stale entries accumulate.
//!
//! ## Example
//!
//! ```
//! use edgesim::policy::fifo::FifoCache;
//! use edgesim::traits::EvictionPolicy;
//!
//! let mut cache = FifoCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");   // does not protect "a"
//! cache.put("c", 3);
//!
//! assert!(!cache.contains(&"a"));
//! assert!(cache.contains(&"b"));
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

pub struct FifoCache<K, V> {
    capacity: usize,
    index: FxHashMap<K, SlotId>,
    queue: IntrusiveList<Entry<K, V>>,
    counters: AccessCounters,
}

impl<K, V> FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            queue: IntrusiveList::with_capacity(capacity),
            counters: AccessCounters::default(),
        }
    }

    /// Oldest key, i.e. the next one to be evicted.
    pub fn peek_victim(&self) -> Option<&K> {
        self.queue.front().map(|entry| &entry.key)
    }

    /// Keys from oldest to newest insertion.
    pub fn keys_in_order(&self) -> impl Iterator<Item = &K> {
        self.queue.iter().map(|entry| &entry.key)
    }

    fn evict_oldest(&mut self) -> Option<K> {
        let entry = self.queue.pop_front()?;
        self.index.remove(&entry.key);
        Some(entry.key)
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.queue.check_invariants()?;
        if self.index.len() != self.queue.len() {
            return Err(InvariantError::new(format!(
                "index has {} keys but queue has {}",
                self.index.len(),
                self.queue.len()
            )));
        }
        if self.queue.len() > self.capacity {
            return Err(InvariantError::new("fifo cache over capacity"));
        }
        let consistent = self
            .index
            .iter()
            .all(|(key, id)| self.queue.get(*id).is_some_and(|entry| entry.key == *key));
        if !consistent {
            return Err(InvariantError::new("index points at the wrong queue slot"));
        }
        Ok(())
    }
}

impl<K, V> EvictionPolicy<K, V> for FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let id = self.index.get(key).copied();
        self.counters.record(id.is_some());
        id.and_then(|id| self.queue.get(id)).map(|entry| &entry.value)
    }

    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some(&id) = self.index.get(&key) {
            if let Some(entry) = self.queue.get_mut(id) {
                entry.value = value;
            }
            return;
        }

        if self.queue.len() >= self.capacity {
            self.evict_oldest();
        }

        let id = self.queue.push_back(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn stats(&self) -> PolicyStats {
        self.counters.stats(self.queue.len(), self.capacity)
    }

    fn len(&self) -> usize {
        self.queue.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.index.clear();
        self.queue.clear();
    }
}

impl<K, V> fmt::Debug for FifoCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoCache")
            .field("capacity", &self.capacity)
            .field("len", &self.queue.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_in_insertion_order() {
        let mut cache = FifoCache::new(3);
        for k in 1..=3 {
            cache.put(k, k * 10);
        }
        cache.put(4, 40);
        assert!(!cache.contains(&1));
        cache.put(5, 50);
        assert!(!cache.contains(&2));
        let order: Vec<_> = cache.keys_in_order().copied().collect();
        assert_eq!(order, vec![3, 4, 5]);
    }

    #[test]
    fn reads_do_not_change_eviction_order() {
        let mut cache = FifoCache::new(2);
        cache.put("A", ());
        cache.put("B", ());
        for _ in 0..10 {
            assert!(cache.get(&"A").is_some());
        }
        assert_eq!(cache.peek_victim(), Some(&"A"));
        cache.put("C", ());
        assert!(!cache.contains(&"A"));
        assert!(cache.contains(&"B"));
        assert_eq!(cache.stats().hits, 10);
    }

    #[test]
    fn update_keeps_queue_position() {
        let mut cache = FifoCache::new(2);
        cache.put("A", 1);
        cache.put("B", 2);
        cache.put("A", 3);
        assert_eq!(cache.get(&"A"), Some(&3));
        assert_eq!(cache.peek_victim(), Some(&"A"));
        cache.put("C", 4);
        assert!(!cache.contains(&"A"));
        cache.check_invariants().unwrap();
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = FifoCache::new(0);
        cache.put(1, 1);
        assert!(cache.is_empty());
        assert_eq!(cache.get(&1), None);
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn invariants_hold_under_churn() {
        let mut cache = FifoCache::new(8);
        for i in 0..500u32 {
            cache.put(i % 23, i);
            if i % 5 == 0 {
                cache.get(&(i % 7));
            }
        }
        assert_eq!(cache.len(), 8);
        cache.check_invariants().unwrap();
        cache.clear();
        assert!(cache.is_empty());
        cache.check_invariants().unwrap();
    }
}
