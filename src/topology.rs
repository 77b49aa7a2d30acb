//! Static CDN graph and the routing queries the simulation runs against it.
//!
//! A [`Topology`] is assembled once through [`TopologyBuilder`] and is
//! immutable afterwards. It answers three questions:
//!
//! - [`Topology::latency`]: cost between two nodes. A direct link wins;
//!   otherwise the shortest path is found with Dijkstra and memoized per
//!   unordered node pair; with no path at all the fallback constant is used.
//! - [`Topology::nearest_edge`]: which edge server serves a client.
//! - [`Topology::origin_for`]: which origin backs a region.
//!
//! ```text
//!   origin_ny ──5── edge_bos ──12── client_0
//!       │              │
//!      15              5
//!       │              │
//!   edge_chi ──15── edge_nyc        client_1 (no links: unroutable by path)
//! ```
//!
//! The latency memo sits behind a `parking_lot::Mutex`, so a topology can be
//! shared across simulation threads through an `Arc`.
//!
//! ## Example
//!
//! ```
//! use edgesim::topology::{NodeRole, TopologyBuilder};
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
//! assert_eq!(topo.latency("client_0", "origin_ny"), 17);
//! assert_eq!(topo.nearest_edge("client_0"), Some("edge_bos"));
//! assert_eq!(topo.origin_for(Some("CA")), "origin_ny");
//! ```

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::fmt;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::TopologyError;

/// Cost returned for node pairs with no connecting path.
pub const DEFAULT_FALLBACK_LATENCY: u64 = 100;

const DEFAULT_NODE_CAPACITY: u64 = 100;
const DEFAULT_LINK_BANDWIDTH: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Origin,
    Edge,
    Client,
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeRole::Origin => "origin",
            NodeRole::Edge => "edge",
            NodeRole::Client => "client",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    pub role: NodeRole,
    /// Human-readable place name.
    pub location: String,
    /// Region code used for origin selection.
    pub region: String,
    /// Informational only.
    pub capacity: u64,
}

/// Undirected link between two nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub a: String,
    pub b: String,
    pub latency: u64,
    /// Informational only.
    pub bandwidth: u64,
}

/// Collects nodes and links, then validates them in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct TopologyBuilder {
    nodes: Vec<Node>,
    links: Vec<Link>,
    fallback_latency: u64,
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            fallback_latency: DEFAULT_FALLBACK_LATENCY,
        }
    }

    pub fn node(
        self,
        id: impl Into<String>,
        role: NodeRole,
        location: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        self.add_node(Node {
            id: id.into(),
            role,
            location: location.into(),
            region: region.into(),
            capacity: DEFAULT_NODE_CAPACITY,
        })
    }

    pub fn add_node(mut self, node: Node) -> Self {
        self.nodes.push(node);
        self
    }

    pub fn link(self, a: impl Into<String>, b: impl Into<String>, latency: u64) -> Self {
        self.add_link(Link {
            a: a.into(),
            b: b.into(),
            latency,
            bandwidth: DEFAULT_LINK_BANDWIDTH,
        })
    }

    pub fn add_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Cost substituted when two nodes are not connected.
    pub fn fallback_latency(mut self, latency: u64) -> Self {
        self.fallback_latency = latency;
        self
    }

    /// Validates the graph and builds the routing indices.
    ///
    /// # Errors
    ///
    /// Fails on a repeated node id, a link touching an undeclared node or
    /// joining a node to itself, and a graph without any origin.
    pub fn build(self) -> Result<Topology, TopologyError> {
        let mut index = FxHashMap::default();
        for (i, node) in self.nodes.iter().enumerate() {
            if index.insert(node.id.clone(), i).is_some() {
                return Err(TopologyError::DuplicateNode(node.id.clone()));
            }
        }
        let primary_origin = self
            .nodes
            .iter()
            .position(|n| n.role == NodeRole::Origin)
            .ok_or(TopologyError::NoOrigin)?;

        let mut direct: FxHashMap<(usize, usize), u64> = FxHashMap::default();
        for link in &self.links {
            let resolve = |id: &String| {
                index
                    .get(id)
                    .copied()
                    .ok_or_else(|| TopologyError::UnknownEndpoint {
                        from: link.a.clone(),
                        to: link.b.clone(),
                        missing: id.clone(),
                    })
            };
            let a = resolve(&link.a)?;
            let b = resolve(&link.b)?;
            if a == b {
                return Err(TopologyError::SelfLink(link.a.clone()));
            }
            direct
                .entry(pair(a, b))
                .and_modify(|lat| *lat = (*lat).min(link.latency))
                .or_insert(link.latency);
        }

        let mut adjacency = vec![Vec::new(); self.nodes.len()];
        for (&(a, b), &lat) in &direct {
            adjacency[a].push((b, lat));
            adjacency[b].push((a, lat));
        }

        tracing::debug!(
            nodes = self.nodes.len(),
            links = direct.len(),
            "topology built"
        );

        Ok(Topology {
            nodes: self.nodes,
            links: self.links,
            index,
            direct,
            adjacency,
            primary_origin,
            fallback_latency: self.fallback_latency,
            memo: Mutex::new(FxHashMap::default()),
        })
    }
}

/// Immutable CDN graph with memoized latency queries.
pub struct Topology {
    nodes: Vec<Node>,
    links: Vec<Link>,
    index: FxHashMap<String, usize>,
    /// Lowest declared latency per unordered pair.
    direct: FxHashMap<(usize, usize), u64>,
    adjacency: Vec<Vec<(usize, u64)>>,
    /// First declared origin.
    primary_origin: usize,
    fallback_latency: u64,
    memo: Mutex<FxHashMap<(usize, usize), u64>>,
}

#[inline]
fn pair(a: usize, b: usize) -> (usize, usize) {
    if a <= b { (a, b) } else { (b, a) }
}

impl Topology {
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::new()
    }

    pub fn fallback_latency(&self) -> u64 {
        self.fallback_latency
    }

    /// Cost between `a` and `b`. Never fails: unknown nodes and
    /// disconnected pairs cost [`fallback_latency`](Self::fallback_latency).
    pub fn latency(&self, a: &str, b: &str) -> u64 {
        if a == b {
            return 0;
        }
        let (Some(&ia), Some(&ib)) = (self.index.get(a), self.index.get(b)) else {
            tracing::debug!(a, b, "latency query for unknown node, using fallback");
            return self.fallback_latency;
        };
        let key = pair(ia, ib);
        if let Some(&lat) = self.direct.get(&key) {
            return lat;
        }
        if let Some(&lat) = self.memo.lock().get(&key) {
            return lat;
        }

        let lat = match self.shortest_path(ia, ib) {
            Some(lat) => lat,
            None => {
                tracing::debug!(a, b, "no path between nodes, using fallback");
                self.fallback_latency
            },
        };
        self.memo.lock().insert(key, lat);
        lat
    }

    /// Weight of the direct link between `a` and `b`, if any.
    pub fn direct_latency(&self, a: &str, b: &str) -> Option<u64> {
        let ia = *self.index.get(a)?;
        let ib = *self.index.get(b)?;
        self.direct.get(&pair(ia, ib)).copied()
    }

    fn shortest_path(&self, from: usize, to: usize) -> Option<u64> {
        let mut dist = vec![u64::MAX; self.nodes.len()];
        let mut heap = BinaryHeap::new();
        dist[from] = 0;
        heap.push(Reverse((0u64, from)));

        while let Some(Reverse((cost, at))) = heap.pop() {
            if at == to {
                return Some(cost);
            }
            if cost > dist[at] {
                continue;
            }
            for &(next, weight) in &self.adjacency[at] {
                let candidate = cost.saturating_add(weight);
                if candidate < dist[next] {
                    dist[next] = candidate;
                    heap.push(Reverse((candidate, next)));
                }
            }
        }
        None
    }

    /// Edge server that should serve `client`.
    ///
    /// Edges directly linked to the client are preferred, lowest link
    /// latency first. Without any direct link, the edge with the lowest
    /// [`latency`](Self::latency) wins. Ties go to the edge declared first.
    /// Returns `None` only when the topology has no edge nodes.
    pub fn nearest_edge(&self, client: &str) -> Option<&str> {
        let direct = self
            .edges()
            .filter_map(|edge| {
                self.direct_latency(client, &edge.id)
                    .map(|lat| (edge, lat))
            })
            .min_by_key(|&(_, lat)| lat);
        if let Some((edge, _)) = direct {
            return Some(edge.id.as_str());
        }

        self.edges()
            .min_by_key(|edge| self.latency(client, &edge.id))
            .map(|edge| edge.id.as_str())
    }

    /// Origin responsible for `region`. Total: always returns an origin.
    ///
    /// Resolution order: an origin whose region code equals `region`
    /// (case-insensitive), then an origin in the same geographic zone, then
    /// the first declared origin. `None` goes straight to the first origin.
    pub fn origin_for(&self, region: Option<&str>) -> &str {
        let first = &self.nodes[self.primary_origin];
        let Some(region) = region.map(str::trim).filter(|r| !r.is_empty()) else {
            return &first.id;
        };

        if let Some(origin) = self
            .origins()
            .find(|o| o.region.eq_ignore_ascii_case(region))
        {
            return &origin.id;
        }
        if let Some(zone) = Zone::of(region)
            && let Some(origin) = self
                .origins()
                .find(|o| Zone::of(&o.region) == Some(zone))
        {
            return &origin.id;
        }
        &first.id
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn nodes_with_role(&self, role: NodeRole) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(move |n| n.role == role)
    }

    pub fn origins(&self) -> impl Iterator<Item = &Node> {
        self.nodes_with_role(NodeRole::Origin)
    }

    pub fn edges(&self) -> impl Iterator<Item = &Node> {
        self.nodes_with_role(NodeRole::Edge)
    }

    pub fn clients(&self) -> impl Iterator<Item = &Node> {
        self.nodes_with_role(NodeRole::Client)
    }

    /// Number of memoized multi-hop latencies.
    pub fn memoized_pairs(&self) -> usize {
        self.memo.lock().len()
    }
}

impl fmt::Debug for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Topology")
            .field("nodes", &self.nodes.len())
            .field("links", &self.direct.len())
            .field("fallback_latency", &self.fallback_latency)
            .finish_non_exhaustive()
    }
}

/// Coarse geography used to pick an origin when no region matches exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Zone {
    NorthAmerica,
    Europe,
}

const NORTH_AMERICA: &[&str] = &[
    "US", "NA", "CA", "MX", "AL", "AK", "AZ", "AR", "CO", "CT", "DE", "DC", "FL", "GA", "HI",
    "ID", "IL", "IN", "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT",
    "NE", "NV", "NH", "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD",
    "TN", "TX", "UT", "VT", "VA", "WA", "WV", "WI", "WY",
];

const EUROPE: &[&str] = &[
    "EU", "UK", "GB", "IE", "FR", "ES", "PT", "IT", "NL", "BE", "LU", "CH", "AT", "SE", "NO",
    "DK", "FI", "IS", "PL", "CZ", "SK", "HU", "RO", "BG", "GR", "HR", "SI", "EE", "LV", "LT",
];

impl Zone {
    /// Two-letter codes shared by a US state and a European country resolve
    /// to North America.
    fn of(region: &str) -> Option<Zone> {
        let region = region.trim();
        if NORTH_AMERICA.iter().any(|c| c.eq_ignore_ascii_case(region)) {
            Some(Zone::NorthAmerica)
        } else if EUROPE.iter().any(|c| c.eq_ignore_ascii_case(region)) {
            Some(Zone::Europe)
        } else {
            None
        }
    }
}
