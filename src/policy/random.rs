//! Random cache replacement policy.
//!
//! Victims are chosen uniformly at random among all cached keys. Reads carry
//! no promotion, which makes this the baseline the other policies are
//! compared against.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────────┐
//! │                        RandomCache<K, V> Layout                             │
//! │                                                                             │
//! │   map: FxHashMap<K, (usize, V)>        keys: Vec<K>                         │
//! │        key → (position, value)               dense array of keys            │
//! │                                                                             │
//! │   Eviction (O(1)):                                                          │
//! │     1. i = rng.random_range(0..len)                                         │
//! │     2. keys.swap_remove(i)                                                  │
//! │     3. fix the position of the key moved into slot i                        │
//! │     4. drop the victim from the map                                         │
//! │                                                                             │
//! │   Example: evict from [A, B, C, D], rng picks 1                             │
//! │     swap_remove → [A, D, C], D's position := 1, B removed                   │
//! └─────────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The generator is a [`SmallRng`]. [`RandomCache::with_seed`] makes a run
//! reproducible; [`RandomCache::new`] seeds from the thread-local RNG. This is
//! the only source of nondeterminism in the simulation.
//!
//! ## Example
//!
//! ```
//! use edgesim::policy::random::RandomCache;
//! use edgesim::traits::EvictionPolicy;
//!
//! let mut cache = RandomCache::with_seed(10, 42);
//! for i in 0..15 {
//!     cache.put(i, i * 10);
//! }
//! assert_eq!(cache.len(), 10);
//! ```

use std::fmt;
use std::hash::Hash;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use rustc_hash::FxHashMap;

use crate::error::InvariantError;
use crate::traits::{AccessCounters, EvictionPolicy, PolicyStats};

/// Uniform-random eviction using swap-remove over a dense key array.
pub struct RandomCache<K, V> {
    /// key → (position in `keys`, value)
    map: FxHashMap<K, (usize, V)>,
    keys: Vec<K>,
    capacity: usize,
    rng: SmallRng,
    counters: AccessCounters,
}

impl<K, V> RandomCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(capacity: usize) -> Self {
        Self::with_rng(capacity, SmallRng::from_rng(&mut rand::rng()))
    }

    /// Creates a cache whose eviction sequence is fully determined by `seed`.
    pub fn with_seed(capacity: usize, seed: u64) -> Self {
        Self::with_rng(capacity, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(capacity: usize, rng: SmallRng) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            keys: Vec::with_capacity(capacity),
            capacity,
            rng,
            counters: AccessCounters::default(),
        }
    }

    /// Evicts one uniformly random entry and returns its key.
    fn evict_random(&mut self) -> Option<K> {
        if self.keys.is_empty() {
            return None;
        }

        let victim_idx = self.rng.random_range(0..self.keys.len());
        let victim = self.keys.swap_remove(victim_idx);
        if let Some(moved) = self.keys.get(victim_idx)
            && let Some((pos, _)) = self.map.get_mut(moved)
        {
            *pos = victim_idx;
        }
        self.map.remove(&victim);
        Some(victim)
    }

    /// The victim is drawn at eviction time, so there is nothing to peek.
    pub fn peek_victim(&self) -> Option<&K> {
        None
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.map.len() != self.keys.len() {
            return Err(InvariantError::new(format!(
                "map has {} entries but key array has {}",
                self.map.len(),
                self.keys.len()
            )));
        }
        if self.keys.len() > self.capacity {
            return Err(InvariantError::new("random cache over capacity"));
        }
        for (i, key) in self.keys.iter().enumerate() {
            match self.map.get(key) {
                Some((pos, _)) if *pos == i => {},
                Some((pos, _)) => {
                    return Err(InvariantError::new(format!(
                        "key at position {i} recorded at position {pos}"
                    )));
                },
                None => return Err(InvariantError::new("key array holds an unmapped key")),
            }
        }
        Ok(())
    }
}

impl<K, V> EvictionPolicy<K, V> for RandomCache<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        let value = self.map.get(key).map(|(_, v)| v);
        self.counters.record(value.is_some());
        value
    }

    fn put(&mut self, key: K, value: V) {
        if self.capacity == 0 {
            return;
        }

        if let Some((_, v)) = self.map.get_mut(&key) {
            *v = value;
            return;
        }

        if self.keys.len() >= self.capacity {
            self.evict_random();
        }

        let pos = self.keys.len();
        self.keys.push(key.clone());
        self.map.insert(key, (pos, value));
    }

    fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    fn stats(&self) -> PolicyStats {
        self.counters.stats(self.map.len(), self.capacity)
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.map.clear();
        self.keys.clear();
    }
}

impl<K, V> fmt::Debug for RandomCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomCache")
            .field("capacity", &self.capacity)
            .field("len", &self.map.len())
            .finish_non_exhaustive()
    }
}
