//! The request-routing simulation.
//!
//! A [`Simulation`] owns one [`EdgeCache`] per edge node of its topology and
//! a client → nearest-edge routing table computed at construction. Requests
//! are processed strictly in order:
//!
//! ```text
//!   request ──► route(client) ──none──► penalty latency, no cache access
//!                    │
//!                    ▼ edge
//!              cache.contains(content)
//!               │hit                    │miss
//!               ▼                       ▼
//!         get() promotes           origin_for(region)
//!         latency = c↔e            latency = 2·(c↔e) + e↔o
//!                                  put(content, size)
//! ```
//!
//! `run` resets all state first, so repeated runs on one instance are
//! independent.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use edgesim::config::SimulationConfig;
//! use edgesim::engine::Simulation;
//! use edgesim::policy::PolicyKind;
//! use edgesim::request::Request;
//! use edgesim::topology::{NodeRole, TopologyBuilder};
//!
//! let topo = TopologyBuilder::new()
//!     .node("origin", NodeRole::Origin, "New York", "US")
//!     .node("edge", NodeRole::Edge, "Boston", "MA")
//!     .node("client", NodeRole::Client, "Cambridge", "MA")
//!     .link("origin", "edge", 10)
//!     .link("edge", "client", 5)
//!     .build()
//!     .unwrap();
//!
//! let mut sim = Simulation::new(Arc::new(topo), SimulationConfig::new(PolicyKind::Lru, 1));
//! let report = sim.run(&[
//!     Request::new(0, "client", "A", 100),
//!     Request::new(1, "client", "A", 100),
//!     Request::new(2, "client", "B", 50),
//! ]);
//! assert_eq!(report.cache_hits, 1);
//! assert!((report.bandwidth_saved - 0.4).abs() < 1e-9);
//! ```

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::config::SimulationConfig;
use crate::edge_cache::EdgeCache;
use crate::metrics::{MetricsReport, SimulationMetrics};
use crate::request::Request;
use crate::topology::Topology;

/// How a request was served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Hit,
    Miss,
    /// No edge server could be found for the client.
    Unrouted,
}

/// Per-request record kept for post-run analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestOutcome {
    pub request_id: u64,
    pub client: String,
    pub content_id: String,
    pub edge: Option<String>,
    pub outcome: Outcome,
    pub latency: u64,
    pub size: u64,
}

/// Edge cache keyed by content id, storing content size.
pub type ContentCache = EdgeCache<String, u64>;

pub struct Simulation {
    topology: Arc<Topology>,
    config: SimulationConfig,
    caches: FxHashMap<String, ContentCache>,
    routes: FxHashMap<String, Option<String>>,
    metrics: SimulationMetrics,
    outcomes: Vec<RequestOutcome>,
}

impl Simulation {
    pub fn new(topology: Arc<Topology>, config: SimulationConfig) -> Self {
        let caches = topology
            .edges()
            .enumerate()
            .map(|(i, edge)| {
                let cache = match config.seed {
                    Some(seed) => ContentCache::with_seed(
                        config.policy,
                        config.capacity,
                        seed.wrapping_add(i as u64),
                    ),
                    None => ContentCache::new(config.policy, config.capacity),
                };
                (edge.id.clone(), cache)
            })
            .collect();

        let routes = topology
            .clients()
            .map(|client| {
                let edge = topology.nearest_edge(&client.id).map(str::to_string);
                (client.id.clone(), edge)
            })
            .collect();

        Self {
            topology,
            config,
            caches,
            routes,
            metrics: SimulationMetrics::new(),
            outcomes: Vec::new(),
        }
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// Processes `requests` in order on fresh caches and returns the report.
    pub fn run(&mut self, requests: &[Request]) -> MetricsReport {
        self.reset();
        tracing::info!(
            policy = %self.config.policy,
            capacity = self.config.capacity,
            requests = requests.len(),
            "simulation started"
        );

        for (i, request) in requests.iter().enumerate() {
            self.process_request(request);
            if (i + 1) % self.config.progress_interval.max(1) == 0 {
                tracing::debug!(processed = i + 1, total = requests.len(), "progress");
            }
        }

        let report = self.metrics();
        tracing::info!(
            policy = %report.policy,
            hit_ratio = report.hit_ratio,
            avg_latency = report.avg_latency,
            "simulation finished"
        );
        report
    }

    /// Serves one request and returns its latency.
    pub fn process_request(&mut self, request: &Request) -> u64 {
        let edge = self.route(&request.client);
        let cache = edge.as_ref().and_then(|id| self.caches.get(id));
        let (Some(edge), Some(cache)) = (edge.as_deref(), cache) else {
            let latency = self.config.no_route_penalty;
            self.metrics.record_unrouted(latency);
            tracing::trace!(request = request.id, client = %request.client, "unrouted");
            self.outcomes.push(RequestOutcome {
                request_id: request.id,
                client: request.client.clone(),
                content_id: request.content_id.clone(),
                edge: None,
                outcome: Outcome::Unrouted,
                latency,
                size: request.size,
            });
            return latency;
        };

        let client_edge = self.topology.latency(&request.client, edge);
        let (outcome, latency) = if cache.contains(&request.content_id) {
            cache.get(&request.content_id);
            self.metrics
                .record_hit(edge, &request.content_id, client_edge, request.size);
            (Outcome::Hit, client_edge)
        } else {
            let origin = self.topology.origin_for(request.region.as_deref());
            let latency = client_edge
                .saturating_mul(2)
                .saturating_add(self.topology.latency(edge, origin));
            cache.put(request.content_id.clone(), request.size);
            self.metrics
                .record_miss(edge, &request.content_id, latency, request.size);
            (Outcome::Miss, latency)
        };

        tracing::trace!(
            request = request.id,
            edge,
            content = %request.content_id,
            ?outcome,
            latency,
            "served"
        );
        self.outcomes.push(RequestOutcome {
            request_id: request.id,
            client: request.client.clone(),
            content_id: request.content_id.clone(),
            edge: Some(edge.to_string()),
            outcome,
            latency,
            size: request.size,
        });
        latency
    }

    /// Nearest edge for `client`. Topology clients are cached; ids the
    /// topology does not declare are resolved on every request.
    fn route(&mut self, client: &str) -> Option<String> {
        if let Some(edge) = self.routes.get(client) {
            return edge.clone();
        }
        let edge = self.topology.nearest_edge(client).map(str::to_string);
        if self.topology.node(client).is_some() {
            self.routes.insert(client.to_string(), edge.clone());
        }
        edge
    }

    /// Number of clients with a cached route.
    pub fn cached_routes(&self) -> usize {
        self.routes.len()
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report(self.config.policy, self.config.capacity)
    }

    pub fn raw_metrics(&self) -> &SimulationMetrics {
        &self.metrics
    }

    pub fn outcomes(&self) -> &[RequestOutcome] {
        &self.outcomes
    }

    pub fn edge_cache(&self, edge: &str) -> Option<&ContentCache> {
        self.caches.get(edge)
    }

    /// Clears metrics, outcomes and every edge cache.
    pub fn reset(&mut self) {
        self.metrics.reset();
        self.outcomes.clear();
        for cache in self.caches.values() {
            cache.clear();
        }
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("policy", &self.config.policy)
            .field("capacity", &self.config.capacity)
            .field("edges", &self.caches.len())
            .field("processed", &self.outcomes.len())
            .finish_non_exhaustive()
    }
}
