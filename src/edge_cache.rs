//! Thread-safe cache facade hosting one eviction policy per edge server.
//!
//! [`EdgeCache`] wraps a [`Policy`] in a `parking_lot::Mutex`. Every
//! operation takes the lock for its whole duration, so concurrent callers
//! never observe a half-finished eviction or insertion. The lock is per
//! edge cache; there is no global lock.
//!
//! ```text
//!   thread A ──┐
//!   thread B ──┼──► Mutex<Policy<K, V>> ──► LRU | LFU | FIFO | RANDOM | HYBRID
//!   thread C ──┘
//! ```
//!
//! ## Example
//!
//! ```
//! use edgesim::edge_cache::EdgeCache;
//!
//! let cache: EdgeCache<String, u64> = EdgeCache::from_name("lru", 2);
//! cache.put("a".to_string(), 100);
//! assert_eq!(cache.get(&"a".to_string()), Some(100));
//! assert_eq!(cache.stats().hits, 1);
//!
//! cache.clear();
//! assert!(cache.is_empty());
//! assert_eq!(cache.stats().hits, 0);
//! ```

use std::fmt;
use std::hash::Hash;

use parking_lot::Mutex;

use crate::error::InvariantError;
use crate::policy::{Policy, PolicyKind};
use crate::traits::{EvictionPolicy, PolicyStats};

/// Mutex-guarded eviction policy for a single edge server.
pub struct EdgeCache<K, V> {
    kind: PolicyKind,
    capacity: usize,
    seed: Option<u64>,
    inner: Mutex<Policy<K, V>>,
}

impl<K, V> EdgeCache<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(kind: PolicyKind, capacity: usize) -> Self {
        Self::build(kind, capacity, None)
    }

    /// Builds from a policy name; unrecognized names select LRU.
    pub fn from_name(name: &str, capacity: usize) -> Self {
        Self::new(PolicyKind::from_name(name), capacity)
    }

    /// Seeded variant for reproducible random eviction.
    pub fn with_seed(kind: PolicyKind, capacity: usize, seed: u64) -> Self {
        Self::build(kind, capacity, Some(seed))
    }

    fn build(kind: PolicyKind, capacity: usize, seed: Option<u64>) -> Self {
        Self {
            kind,
            capacity,
            seed,
            inner: Mutex::new(Self::fresh_policy(kind, capacity, seed)),
        }
    }

    fn fresh_policy(kind: PolicyKind, capacity: usize, seed: Option<u64>) -> Policy<K, V> {
        match seed {
            Some(seed) => Policy::with_seed(kind, capacity, seed),
            None => Policy::new(kind, capacity),
        }
    }

    /// Looks up `key`, applying the policy's promotion on a hit.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    /// Looks up `key` and applies `f` to the value while the lock is held.
    pub fn get_with<R>(&self, key: &K, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.inner.lock().get(key).map(f)
    }

    pub fn put(&self, key: K, value: V) {
        self.inner.lock().put(key, value);
    }

    /// Pure existence check; does not count as an access.
    pub fn contains(&self, key: &K) -> bool {
        self.inner.lock().contains(key)
    }

    pub fn stats(&self) -> PolicyStats {
        self.inner.lock().stats()
    }

    /// Replaces the policy with a fresh instance, dropping all entries and
    /// resetting hit/miss counters.
    pub fn clear(&self) {
        let fresh = Self::fresh_policy(self.kind, self.capacity, self.seed);
        *self.inner.lock() = fresh;
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy_kind(&self) -> PolicyKind {
        self.kind
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.inner.lock().check_invariants()
    }
}

impl<K, V> fmt::Debug for EdgeCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EdgeCache")
            .field("kind", &self.kind)
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
