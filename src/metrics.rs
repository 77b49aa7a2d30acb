//! Run metrics: raw counters gathered by the engine and the report derived
//! from them.
//!
//! [`SimulationMetrics`] is mutated once per request; [`MetricsReport`] is
//! the read-only summary handed to callers. Every report field is always
//! present, so an empty run serializes to zeros and empty maps.
//!
//! ## Derived fields
//!
//! | Field              | Formula                                             |
//! |--------------------|-----------------------------------------------------|
//! | `hit_ratio`        | hits / total requests                               |
//! | `avg_latency`      | total latency (penalties included) / total requests |
//! | `median/p95/p99`   | sorted hit+miss samples at `floor(q * n)`           |
//! | `bandwidth_saved`  | bytes served from cache / bytes requested           |
//! | `cache_efficiency` | hits / configured cache capacity                    |
//!
//! Each ratio is `0` when its denominator is `0`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::policy::PolicyKind;

/// Element at index `floor(q * n)` of an ascending slice, clamped to the
/// last element; `0` for an empty slice.
///
/// ```
/// use edgesim::metrics::percentile;
///
/// let samples = [5, 10, 15, 20, 20, 20, 20, 20, 20, 20];
/// assert_eq!(percentile(&samples, 0.5), 20);
/// assert_eq!(percentile(&samples, 0.95), 20);
/// assert_eq!(percentile(&samples, 0.0), 5);
/// assert_eq!(percentile(&[], 0.99), 0);
/// ```
pub fn percentile(sorted: &[u64], q: f64) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = (q * sorted.len() as f64).floor() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[inline]
fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

#[inline]
fn mean(samples: &[u64]) -> f64 {
    let total = samples.iter().fold(0u64, |acc, &s| acc.saturating_add(s));
    ratio(total, samples.len() as u64)
}

/// Raw per-run counters and latency samples.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimulationMetrics {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub unrouted_requests: u64,
    pub origin_requests: u64,
    pub total_latency: u64,
    /// KB served from edge caches.
    pub bandwidth_saved: u64,
    /// KB requested by routed requests.
    pub bytes_requested: u64,
    pub server_loads: BTreeMap<String, u64>,
    pub content_served: BTreeMap<String, u64>,
    pub hit_latencies: Vec<u64>,
    pub miss_latencies: Vec<u64>,
}

impl SimulationMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn record_routed(&mut self, edge: &str, content_id: &str, latency: u64, size: u64) {
        self.total_requests += 1;
        self.total_latency = self.total_latency.saturating_add(latency);
        self.bytes_requested = self.bytes_requested.saturating_add(size);
        *self.server_loads.entry(edge.to_string()).or_default() += 1;
        *self.content_served.entry(content_id.to_string()).or_default() += 1;
    }

    pub fn record_hit(&mut self, edge: &str, content_id: &str, latency: u64, size: u64) {
        self.record_routed(edge, content_id, latency, size);
        self.cache_hits += 1;
        self.bandwidth_saved = self.bandwidth_saved.saturating_add(size);
        self.hit_latencies.push(latency);
    }

    pub fn record_miss(&mut self, edge: &str, content_id: &str, latency: u64, size: u64) {
        self.record_routed(edge, content_id, latency, size);
        self.cache_misses += 1;
        self.origin_requests += 1;
        self.miss_latencies.push(latency);
    }

    /// Counts a request no edge could serve. The penalty feeds the latency
    /// average but is not a percentile sample.
    pub fn record_unrouted(&mut self, penalty: u64) {
        self.total_requests += 1;
        self.unrouted_requests += 1;
        self.total_latency = self.total_latency.saturating_add(penalty);
    }

    /// Reduces the counters into a report. `capacity` is the per-edge cache
    /// capacity used for `cache_efficiency`.
    pub fn report(&self, policy: PolicyKind, capacity: usize) -> MetricsReport {
        let mut samples: Vec<u64> = self
            .hit_latencies
            .iter()
            .chain(&self.miss_latencies)
            .copied()
            .collect();
        samples.sort_unstable();

        MetricsReport {
            policy,
            total_requests: self.total_requests,
            cache_hits: self.cache_hits,
            cache_misses: self.cache_misses,
            unrouted_requests: self.unrouted_requests,
            origin_requests: self.origin_requests,
            hit_ratio: ratio(self.cache_hits, self.total_requests),
            avg_latency: ratio(self.total_latency, self.total_requests),
            median_latency: percentile(&samples, 0.5),
            p95_latency: percentile(&samples, 0.95),
            p99_latency: percentile(&samples, 0.99),
            avg_hit_latency: mean(&self.hit_latencies),
            avg_miss_latency: mean(&self.miss_latencies),
            bandwidth_saved: ratio(self.bandwidth_saved, self.bytes_requested),
            total_bandwidth_saved: self.bandwidth_saved,
            total_bytes_requested: self.bytes_requested,
            cache_efficiency: ratio(self.cache_hits, capacity as u64),
            server_loads: self.server_loads.clone(),
            content_served: self.content_served.clone(),
        }
    }
}

/// Summary of one simulation run.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    pub policy: PolicyKind,
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub unrouted_requests: u64,
    pub origin_requests: u64,
    pub hit_ratio: f64,
    pub avg_latency: f64,
    pub median_latency: u64,
    pub p95_latency: u64,
    pub p99_latency: u64,
    pub avg_hit_latency: f64,
    pub avg_miss_latency: f64,
    /// Fraction of requested KB served from cache.
    pub bandwidth_saved: f64,
    /// KB served from cache.
    pub total_bandwidth_saved: u64,
    pub total_bytes_requested: u64,
    pub cache_efficiency: f64,
    pub server_loads: BTreeMap<String, u64>,
    pub content_served: BTreeMap<String, u64>,
}

impl MetricsReport {
    pub fn miss_ratio(&self) -> f64 {
        ratio(self.cache_misses, self.total_requests)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
