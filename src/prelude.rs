//! Common imports.
//!
//! ```
//! use edgesim::prelude::*;
//!
//! let cache: EdgeCache<String, u64> = EdgeCache::new(PolicyKind::Hybrid, 8);
//! assert_eq!(cache.capacity(), 8);
//! ```

pub use crate::compare::{PolicyComparison, compare_policies};
pub use crate::config::SimulationConfig;
pub use crate::edge_cache::EdgeCache;
pub use crate::engine::{Outcome, RequestOutcome, Simulation};
pub use crate::metrics::MetricsReport;
pub use crate::policy::fifo::FifoCache;
pub use crate::policy::hybrid::HybridCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::policy::random::RandomCache;
pub use crate::policy::{Policy, PolicyKind};
pub use crate::request::{ContentType, Request};
pub use crate::topology::{NodeRole, Topology, TopologyBuilder};
pub use crate::traits::{EvictionPolicy, PolicyStats};
