//! Eviction policy implementations and runtime policy selection.
//!
//! Each submodule holds one replacement algorithm implementing
//! [`EvictionPolicy`]. [`PolicyKind`] names a policy (and parses the names
//! used in configuration); [`Policy`] is a flat enum over the five
//! implementations so callers can pick one at runtime without boxing.
//!
//! | Kind     | Type                        | Victim                                    |
//! |----------|-----------------------------|-------------------------------------------|
//! | `LRU`    | [`lru::LruCache`]           | least recently used                       |
//! | `LFU`    | [`lfu::LfuCache`]           | lowest frequency, oldest in its bucket    |
//! | `FIFO`   | [`fifo::FifoCache`]         | earliest inserted                         |
//! | `RANDOM` | [`random::RandomCache`]     | uniformly random                          |
//! | `HYBRID` | [`hybrid::HybridCache`]     | lowest frequency, then least recently used |
//!
//! ## Example
//!
//! ```
//! use edgesim::policy::{Policy, PolicyKind};
//! use edgesim::traits::EvictionPolicy;
//!
//! let kind: PolicyKind = "lfu".parse().unwrap();
//! let mut cache: Policy<&str, u64> = Policy::new(kind, 2);
//! cache.put("a", 1);
//! assert_eq!(cache.kind(), PolicyKind::Lfu);
//! assert!(cache.contains(&"a"));
//!
//! // Unknown names fall back to LRU.
//! assert_eq!(PolicyKind::from_name("ARC"), PolicyKind::Lru);
//! ```

pub mod fifo;
pub mod hybrid;
pub mod lfu;
pub mod lru;
pub mod random;

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::InvariantError;
use crate::traits::{EvictionPolicy, PolicyStats};

use self::fifo::FifoCache;
use self::hybrid::HybridCache;
use self::lfu::LfuCache;
use self::lru::LruCache;
use self::random::RandomCache;

/// Available eviction policies.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PolicyKind {
    /// Least Recently Used.
    #[default]
    Lru,
    /// Least Frequently Used with per-frequency FIFO buckets.
    Lfu,
    /// First In, First Out.
    Fifo,
    /// Uniform random victim.
    Random,
    /// Least frequently used, ties broken by least recently used.
    Hybrid,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Lru,
        PolicyKind::Lfu,
        PolicyKind::Fifo,
        PolicyKind::Random,
        PolicyKind::Hybrid,
    ];

    /// Canonical upper-case name.
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Lru => "LRU",
            PolicyKind::Lfu => "LFU",
            PolicyKind::Fifo => "FIFO",
            PolicyKind::Random => "RANDOM",
            PolicyKind::Hybrid => "HYBRID",
        }
    }

    /// Parses `name` case-insensitively, substituting LRU for anything
    /// unrecognized.
    pub fn from_name(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!(name, "unknown eviction policy, using LRU");
            PolicyKind::Lru
        })
    }
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from parsing a policy name with [`str::parse`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown eviction policy `{0}`")]
pub struct UnknownPolicy(pub String);

impl FromStr for PolicyKind {
    type Err = UnknownPolicy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PolicyKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownPolicy(s.to_string()))
    }
}

impl Serialize for PolicyKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PolicyKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(PolicyKind::from_name(&name))
    }
}

/// One of the five policies, chosen at runtime.
pub enum Policy<K, V> {
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    Fifo(FifoCache<K, V>),
    Random(RandomCache<K, V>),
    Hybrid(HybridCache<K, V>),
}

impl<K, V> Policy<K, V>
where
    K: Clone + Eq + Hash,
{
    pub fn new(kind: PolicyKind, capacity: usize) -> Self {
        match kind {
            PolicyKind::Lru => Policy::Lru(LruCache::new(capacity)),
            PolicyKind::Lfu => Policy::Lfu(LfuCache::new(capacity)),
            PolicyKind::Fifo => Policy::Fifo(FifoCache::new(capacity)),
            PolicyKind::Random => Policy::Random(RandomCache::new(capacity)),
            PolicyKind::Hybrid => Policy::Hybrid(HybridCache::new(capacity)),
        }
    }

    /// Like [`Policy::new`], but seeds the random policy. Other kinds ignore
    /// the seed.
    pub fn with_seed(kind: PolicyKind, capacity: usize, seed: u64) -> Self {
        match kind {
            PolicyKind::Random => Policy::Random(RandomCache::with_seed(capacity, seed)),
            other => Policy::new(other, capacity),
        }
    }

    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Lru(_) => PolicyKind::Lru,
            Policy::Lfu(_) => PolicyKind::Lfu,
            Policy::Fifo(_) => PolicyKind::Fifo,
            Policy::Random(_) => PolicyKind::Random,
            Policy::Hybrid(_) => PolicyKind::Hybrid,
        }
    }

    /// Next eviction victim; always `None` for the random policy.
    pub fn peek_victim(&self) -> Option<&K> {
        match self {
            Policy::Lru(c) => c.peek_victim(),
            Policy::Lfu(c) => c.peek_victim(),
            Policy::Fifo(c) => c.peek_victim(),
            Policy::Random(c) => c.peek_victim(),
            Policy::Hybrid(c) => c.peek_victim(),
        }
    }

    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        match self {
            Policy::Lru(c) => c.check_invariants(),
            Policy::Lfu(c) => c.check_invariants(),
            Policy::Fifo(c) => c.check_invariants(),
            Policy::Random(c) => c.check_invariants(),
            Policy::Hybrid(c) => c.check_invariants(),
        }
    }
}

impl<K, V> EvictionPolicy<K, V> for Policy<K, V>
where
    K: Clone + Eq + Hash,
{
    fn get(&mut self, key: &K) -> Option<&V> {
        match self {
            Policy::Lru(c) => c.get(key),
            Policy::Lfu(c) => c.get(key),
            Policy::Fifo(c) => c.get(key),
            Policy::Random(c) => c.get(key),
            Policy::Hybrid(c) => c.get(key),
        }
    }

    fn put(&mut self, key: K, value: V) {
        match self {
            Policy::Lru(c) => c.put(key, value),
            Policy::Lfu(c) => c.put(key, value),
            Policy::Fifo(c) => c.put(key, value),
            Policy::Random(c) => c.put(key, value),
            Policy::Hybrid(c) => c.put(key, value),
        }
    }

    fn contains(&self, key: &K) -> bool {
        match self {
            Policy::Lru(c) => c.contains(key),
            Policy::Lfu(c) => c.contains(key),
            Policy::Fifo(c) => c.contains(key),
            Policy::Random(c) => c.contains(key),
            Policy::Hybrid(c) => c.contains(key),
        }
    }

    fn stats(&self) -> PolicyStats {
        match self {
            Policy::Lru(c) => c.stats(),
            Policy::Lfu(c) => c.stats(),
            Policy::Fifo(c) => c.stats(),
            Policy::Random(c) => c.stats(),
            Policy::Hybrid(c) => c.stats(),
        }
    }

    fn len(&self) -> usize {
        match self {
            Policy::Lru(c) => c.len(),
            Policy::Lfu(c) => c.len(),
            Policy::Fifo(c) => c.len(),
            Policy::Random(c) => c.len(),
            Policy::Hybrid(c) => c.len(),
        }
    }

    fn capacity(&self) -> usize {
        match self {
            Policy::Lru(c) => c.capacity(),
            Policy::Lfu(c) => c.capacity(),
            Policy::Fifo(c) => c.capacity(),
            Policy::Random(c) => c.capacity(),
            Policy::Hybrid(c) => c.capacity(),
        }
    }

    fn clear(&mut self) {
        match self {
            Policy::Lru(c) => c.clear(),
            Policy::Lfu(c) => c.clear(),
            Policy::Fifo(c) => c.clear(),
            Policy::Random(c) => c.clear(),
            Policy::Hybrid(c) => c.clear(),
        }
    }
}

impl<K, V> fmt::Debug for Policy<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Lru(c) => c.fmt(f),
            Policy::Lfu(c) => c.fmt(f),
            Policy::Fifo(c) => c.fmt(f),
            Policy::Random(c) => c.fmt(f),
            Policy::Hybrid(c) => c.fmt(f),
        }
    }
}
