//! # Eviction Policy Contract
//!
//! Every replacement algorithm in [`crate::policy`] implements
//! [`EvictionPolicy`], so the edge cache facade and the simulation engine can
//! drive any of them through one interface.
//!
//! ```text
//!   ┌─────────────────────────────────────────┐
//!   │         EvictionPolicy<K, V>            │
//!   │                                         │
//!   │  get(&mut, &K) → Option<&V>   (counts)  │
//!   │  put(&mut, K, V)                        │
//!   │  contains(&, &K) → bool       (pure)    │
//!   │  stats(&) → PolicyStats                 │
//!   │  len / is_empty / capacity / clear      │
//!   └───────────────────┬─────────────────────┘
//!                       │
//!     ┌──────────┬──────┴─────┬────────────┬────────────┐
//!     ▼          ▼            ▼            ▼            ▼
//!   LruCache  LfuCache    FifoCache   RandomCache  HybridCache
//! ```
//!
//! ## Contract
//!
//! | Method     | Side effects                                              |
//! |------------|-----------------------------------------------------------|
//! | `get`      | counts a hit or a miss; a hit may promote the key         |
//! | `put`      | updates in place or inserts, evicting exactly one entry   |
//! |            | first when the cache is full and the key is new           |
//! | `contains` | none; never touches counters or eviction order            |
//! | `stats`    | none                                                      |
//!
//! A capacity of zero turns `put` into a no-op.

/// Hit/miss counters and occupancy for one policy instance.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct PolicyStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub capacity: usize,
}

impl PolicyStats {
    /// Fraction of `get` calls that hit; `0.0` before any access.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            return 0.0;
        }
        self.hits as f64 / total as f64
    }
}

/// Bounded key → value store with a replacement policy.
///
/// # Example
///
/// ```
/// use edgesim::policy::lru::LruCache;
/// use edgesim::traits::EvictionPolicy;
///
/// fn warm<P: EvictionPolicy<u64, u64>>(cache: &mut P, keys: &[u64]) {
///     for &k in keys {
///         cache.put(k, k * 10);
///     }
/// }
///
/// let mut cache = LruCache::new(2);
/// warm(&mut cache, &[1, 2, 3]);
/// assert_eq!(cache.len(), 2);
/// assert!(!cache.contains(&1));
/// ```
pub trait EvictionPolicy<K, V> {
    /// Looks up `key`, counting a hit or a miss.
    ///
    /// A hit applies the policy's promotion (recency move, frequency bump, or
    /// nothing). Use [`contains`](Self::contains) for a side-effect free check.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Inserts or updates `key`.
    fn put(&mut self, key: K, value: V);

    /// Returns `true` if `key` is cached. Never affects counters or order.
    fn contains(&self, key: &K) -> bool;

    fn stats(&self) -> PolicyStats;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn capacity(&self) -> usize;

    /// Drops every entry. Hit/miss counters are left untouched.
    fn clear(&mut self);
}

/// Hit/miss bookkeeping shared by all policies.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct AccessCounters {
    pub(crate) hits: u64,
    pub(crate) misses: u64,
}

impl AccessCounters {
    #[inline]
    pub(crate) fn record(&mut self, hit: bool) {
        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
    }

    #[inline]
    pub(crate) fn stats(&self, size: usize, capacity: usize) -> PolicyStats {
        PolicyStats {
            hits: self.hits,
            misses: self.misses,
            size,
            capacity,
        }
    }
}
