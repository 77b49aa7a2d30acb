//! edgesim: CDN edge-cache simulation.
//!
//! Routes client requests through per-edge caches to origin servers over a
//! static latency graph and reports hit ratio, latency percentiles and
//! bandwidth saved for five interchangeable eviction policies.
//!
//! ## Modules
//!
//! - [`ds`]: slot arena and intrusive list backing the O(1) policies.
//! - [`policy`]: LRU, LFU, FIFO, random and hybrid eviction, plus
//!   [`policy::PolicyKind`] / [`policy::Policy`] for runtime selection.
//! - [`edge_cache`]: mutex-guarded policy, one per edge server.
//! - [`topology`]: node/link graph with memoized latency and routing.
//! - [`engine`]: the per-request simulation loop.
//! - [`metrics`]: raw counters and the derived report.
//! - [`compare`]: parallel runs across policies.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use edgesim::prelude::*;
//!
//! let topo = TopologyBuilder::new()
//!     .node("origin_ny", NodeRole::Origin, "New York", "US")
//!     .node("edge_bos", NodeRole::Edge, "Boston", "MA")
//!     .node("client_0", NodeRole::Client, "Cambridge", "MA")
//!     .link("origin_ny", "edge_bos", 5)
//!     .link("edge_bos", "client_0", 12)
//!     .build()
//!     .unwrap();
//!
//! let requests: Vec<_> = (0..10).map(|i| Request::new(i, "client_0", "index.html", 50)).collect();
//! let mut sim = Simulation::new(Arc::new(topo), SimulationConfig::new(PolicyKind::Lru, 10));
//! let report = sim.run(&requests);
//! assert_eq!(report.cache_hits, 9);
//! ```

pub mod compare;
pub mod config;
pub mod ds;
pub mod edge_cache;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod request;
pub mod topology;
pub mod traits;

pub use crate::compare::{PolicyComparison, compare_policies};
pub use crate::config::SimulationConfig;
pub use crate::edge_cache::EdgeCache;
pub use crate::engine::{Outcome, RequestOutcome, Simulation};
pub use crate::error::{ConfigError, InvariantError, TopologyError};
pub use crate::metrics::{MetricsReport, SimulationMetrics};
pub use crate::policy::{Policy, PolicyKind};
pub use crate::request::{ContentType, Request};
pub use crate::topology::{Link, Node, NodeRole, Topology, TopologyBuilder};
pub use crate::traits::{EvictionPolicy, PolicyStats};
