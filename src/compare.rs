//! Side-by-side policy comparison.
//!
//! Each policy gets its own [`Simulation`] (and so its own edge caches) on
//! its own scoped thread; only the immutable topology and request slice are
//! shared.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread::{self, ScopedJoinHandle};

use serde::Serialize;

use crate::config::SimulationConfig;
use crate::engine::Simulation;
use crate::metrics::MetricsReport;
use crate::policy::PolicyKind;
use crate::request::Request;
use crate::topology::Topology;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyComparison {
    pub results: BTreeMap<PolicyKind, MetricsReport>,
    /// Policy with the highest hit ratio; ties go to the earliest in the
    /// requested order.
    pub best_policy: Option<PolicyKind>,
    pub best_hit_ratio: f64,
    /// Policies whose run panicked; they have no entry in `results` and
    /// take no part in choosing `best_policy`.
    pub failed: Vec<PolicyKind>,
}

impl PolicyComparison {
    pub fn get(&self, kind: PolicyKind) -> Option<&MetricsReport> {
        self.results.get(&kind)
    }
}

/// Runs `requests` once per policy in `kinds`, in parallel.
///
/// `config.policy` is overridden per run; every other setting is shared.
/// Duplicate kinds are run once.
pub fn compare_policies(
    topology: &Arc<Topology>,
    requests: &[Request],
    config: &SimulationConfig,
    kinds: &[PolicyKind],
) -> PolicyComparison {
    let mut unique: Vec<PolicyKind> = Vec::with_capacity(kinds.len());
    for &kind in kinds {
        if !unique.contains(&kind) {
            unique.push(kind);
        }
    }
    tracing::info!(policies = unique.len(), requests = requests.len(), "comparing policies");

    let (reports, failed) = thread::scope(|scope| {
        let handles: Vec<_> = unique
            .iter()
            .map(|&kind| {
                let topology = Arc::clone(topology);
                let config = SimulationConfig {
                    policy: kind,
                    ..config.clone()
                };
                let handle = scope.spawn(move || {
                    let mut sim = Simulation::new(topology, config);
                    sim.run(requests)
                });
                (kind, handle)
            })
            .collect();
        join_reports(handles)
    });

    let mut best: Option<(PolicyKind, f64)> = None;
    for (kind, report) in &reports {
        if best.is_none_or(|(_, ratio)| report.hit_ratio > ratio) {
            best = Some((*kind, report.hit_ratio));
        }
    }

    PolicyComparison {
        best_policy: best.map(|(kind, _)| kind),
        best_hit_ratio: best.map_or(0.0, |(_, ratio)| ratio),
        results: reports.into_iter().collect(),
        failed,
    }
}

/// Joins per-policy runs in order, separating finished reports from
/// policies whose thread panicked.
fn join_reports(
    handles: Vec<(PolicyKind, ScopedJoinHandle<'_, MetricsReport>)>,
) -> (Vec<(PolicyKind, MetricsReport)>, Vec<PolicyKind>) {
    let mut reports = Vec::with_capacity(handles.len());
    let mut failed = Vec::new();
    for (kind, handle) in handles {
        match handle.join() {
            Ok(report) => reports.push((kind, report)),
            Err(_) => {
                tracing::warn!(policy = %kind, "policy simulation thread panicked");
                failed.push(kind);
            },
        }
    }
    (reports, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::{NodeRole, TopologyBuilder};

    fn topology() -> Arc<Topology> {
        Arc::new(
            TopologyBuilder::new()
                .node("origin", NodeRole::Origin, "New York", "US")
                .node("edge", NodeRole::Edge, "Boston", "MA")
                .node("client", NodeRole::Client, "Cambridge", "MA")
                .link("origin", "edge", 10)
                .link("edge", "client", 5)
                .build()
                .unwrap(),
        )
    }

    #[test]
    fn runs_every_policy_independently() {
        let requests: Vec<_> = (0..200u64)
            .map(|i| Request::new(i, "client", format!("c{}", i % 7), 10))
            .collect();
        let config = SimulationConfig::new(PolicyKind::Lru, 4).with_seed(1);
        let comparison = compare_policies(&topology(), &requests, &config, &PolicyKind::ALL);

        assert_eq!(comparison.results.len(), 5);
        for (kind, report) in &comparison.results {
            assert_eq!(report.policy, *kind);
            assert_eq!(report.total_requests, 200);
        }
        let best = comparison.best_policy.unwrap();
        assert_eq!(comparison.best_hit_ratio, comparison.get(best).unwrap().hit_ratio);
        assert!(comparison.results.values().all(|r| r.hit_ratio <= comparison.best_hit_ratio));
        assert!(comparison.failed.is_empty());
    }

    #[test]
    fn panicked_run_is_reported_by_policy() {
        let (reports, failed) = thread::scope(|scope| {
            let handles = vec![
                (
                    PolicyKind::Lru,
                    scope.spawn(|| -> MetricsReport { panic!("simulated failure") }),
                ),
                (
                    PolicyKind::Fifo,
                    scope.spawn(|| MetricsReport {
                        policy: PolicyKind::Fifo,
                        ..MetricsReport::default()
                    }),
                ),
            ];
            join_reports(handles)
        });

        assert_eq!(failed, vec![PolicyKind::Lru]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].0, PolicyKind::Fifo);
        assert_eq!(reports[0].1.policy, PolicyKind::Fifo);
    }

    #[test]
    fn ties_go_to_first_listed_policy() {
        // every request is a distinct key: all policies score zero
        let requests: Vec<_> = (0..20u64)
            .map(|i| Request::new(i, "client", format!("c{i}"), 10))
            .collect();
        let config = SimulationConfig::new(PolicyKind::Lru, 2);
        let kinds = [PolicyKind::Fifo, PolicyKind::Lru, PolicyKind::Fifo];
        let comparison = compare_policies(&topology(), &requests, &config, &kinds);

        assert_eq!(comparison.results.len(), 2);
        assert_eq!(comparison.best_policy, Some(PolicyKind::Fifo));
        assert_eq!(comparison.best_hit_ratio, 0.0);
    }

    #[test]
    fn no_policies_means_no_winner() {
        let comparison =
            compare_policies(&topology(), &[], &SimulationConfig::default(), &[]);
        assert!(comparison.results.is_empty());
        assert_eq!(comparison.best_policy, None);
    }
}
