// ==============================================
// SIMULATION SCENARIO TESTS (integration)
// ==============================================
//
// End-to-end runs over small hand-built topologies.

use std::sync::Arc;

use edgesim::prelude::*;
use proptest::prelude::*;

fn single_edge() -> Arc<Topology> {
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

/// Two origins, three edges, four clients; `client_3` has no links.
fn regional() -> Arc<Topology> {
    Arc::new(
        TopologyBuilder::new()
            .node("origin_ny", NodeRole::Origin, "New York", "US")
            .node("origin_lon", NodeRole::Origin, "London", "UK")
            .node("edge_bos", NodeRole::Edge, "Boston", "MA")
            .node("edge_chi", NodeRole::Edge, "Chicago", "IL")
            .node("edge_sf", NodeRole::Edge, "San Francisco", "CA")
            .node("client_0", NodeRole::Client, "Cambridge", "MA")
            .node("client_1", NodeRole::Client, "Evanston", "IL")
            .node("client_2", NodeRole::Client, "Oakland", "CA")
            .node("client_3", NodeRole::Client, "Offline", "TX")
            .link("origin_ny", "edge_bos", 5)
            .link("origin_ny", "edge_chi", 15)
            .link("origin_lon", "edge_bos", 80)
            .link("edge_chi", "edge_sf", 40)
            .link("client_0", "edge_bos", 8)
            .link("client_0", "edge_chi", 30)
            .link("client_1", "edge_chi", 6)
            .link("client_2", "edge_sf", 9)
            .build()
            .unwrap(),
    )
}

mod end_to_end {
    use super::*;

    #[test]
    fn single_edge_lru_capacity_one() {
        let requests = [
            Request::new(0, "client", "A", 100),
            Request::new(1, "client", "A", 100),
            Request::new(2, "client", "B", 50),
        ];
        let mut sim = Simulation::new(single_edge(), SimulationConfig::new(PolicyKind::Lru, 1));
        let report = sim.run(&requests);

        let latencies: Vec<_> = sim.outcomes().iter().map(|o| o.latency).collect();
        assert_eq!(latencies, vec![20, 5, 20]);
        assert!((report.hit_ratio - 1.0 / 3.0).abs() < 1e-9);
        assert!((report.bandwidth_saved - 0.4).abs() < 1e-9);
        assert_eq!(report.total_bandwidth_saved, 100);
        assert_eq!(report.median_latency, 20);
        assert_eq!(report.avg_hit_latency, 5.0);
        assert_eq!(report.avg_miss_latency, 20.0);

        let cache = sim.edge_cache("edge").unwrap();
        assert!(cache.contains(&"B".to_string()));
        assert!(!cache.contains(&"A".to_string()));
    }

    #[test]
    fn clients_route_to_their_nearest_edge() {
        let requests = [
            Request::new(0, "client_0", "A", 10),
            Request::new(1, "client_1", "A", 10),
            Request::new(2, "client_2", "A", 10),
            Request::new(3, "client_0", "A", 10),
        ];
        let mut sim = Simulation::new(regional(), SimulationConfig::new(PolicyKind::Lru, 8));
        let report = sim.run(&requests);

        let edges: Vec<_> = sim.outcomes().iter().map(|o| o.edge.clone().unwrap()).collect();
        assert_eq!(edges, vec!["edge_bos", "edge_chi", "edge_sf", "edge_bos"]);
        assert_eq!(report.server_loads["edge_bos"], 2);
        assert_eq!(report.server_loads["edge_chi"], 1);
        assert_eq!(report.cache_hits, 1);

        // edge_sf reaches origin_ny through edge_chi: 40 + 15
        assert_eq!(sim.outcomes()[2].latency, 2 * 9 + 55);
    }

    #[test]
    fn offline_client_routes_to_first_edge() {
        let mut sim = Simulation::new(regional(), SimulationConfig::new(PolicyKind::Lru, 8));
        let latency = sim.process_request(&Request::new(0, "client_3", "A", 10));
        assert_eq!(sim.outcomes()[0].edge.as_deref(), Some("edge_bos"));
        assert_eq!(latency, 2 * 100 + 5);
    }

    #[test]
    fn european_region_pays_transatlantic_miss() {
        let mut sim = Simulation::new(regional(), SimulationConfig::new(PolicyKind::Lru, 8));
        let eu = sim.process_request(&Request::new(0, "client_0", "A", 10).with_region("DE"));
        let uk = sim.process_request(&Request::new(1, "client_0", "B", 10).with_region("GB"));
        let hit = sim.process_request(&Request::new(2, "client_0", "B", 10).with_region("GB"));
        // DE collides with Delaware and resolves to North America
        assert_eq!(eu, 2 * 8 + 5);
        assert_eq!(uk, 2 * 8 + 80);
        assert_eq!(hit, 8);
    }

    #[test]
    fn policies_diverge_on_the_same_trace() {
        // A is hot; B..E churn through a two-slot cache
        let mut requests = Vec::new();
        let mut id = 0;
        for round in 0..20 {
            for key in ["A", "A", "A"] {
                requests.push(Request::new(id, "client", key, 10));
                id += 1;
            }
            let cold = ["B", "C", "D", "E"][round % 4];
            requests.push(Request::new(id, "client", cold, 10));
            id += 1;
        }

        let comparison = compare_policies(
            &single_edge(),
            &requests,
            &SimulationConfig::new(PolicyKind::Lru, 2),
            &[PolicyKind::Fifo, PolicyKind::Lfu, PolicyKind::Lru, PolicyKind::Hybrid],
        );
        let lfu = comparison.get(PolicyKind::Lfu).unwrap().hit_ratio;
        let fifo = comparison.get(PolicyKind::Fifo).unwrap().hit_ratio;
        assert!(lfu > fifo);
        assert!(comparison.best_hit_ratio >= lfu);
        assert_ne!(comparison.best_policy, Some(PolicyKind::Fifo));
    }

    #[test]
    fn report_serializes_to_json() {
        let mut sim = Simulation::new(single_edge(), SimulationConfig::new(PolicyKind::Hybrid, 4));
        let report = sim.run(&[Request::new(0, "client", "A", 1)]);
        let json = report.to_json_pretty().unwrap();
        assert!(json.contains("\"policy\": \"HYBRID\""));
        let back: MetricsReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}

fn request_strategy() -> impl Strategy<Value = Request> {
    (
        0usize..5,
        0u8..30,
        1u64..500,
        prop::option::of(prop::sample::select(vec!["US", "UK", "FR", "TX", "JP"])),
    )
        .prop_map(|(client, content, size, region)| {
            let mut req = Request::new(0, format!("client_{client}"), format!("c{content}"), size);
            req.region = region.map(str::to_string);
            req
        })
}

proptest! {
    #[test]
    fn prop_outcomes_partition_requests(
        kind in prop::sample::select(PolicyKind::ALL.to_vec()),
        capacity in 0usize..6,
        requests in prop::collection::vec(request_strategy(), 0..120)
    ) {
        let config = SimulationConfig::new(kind, capacity).with_seed(9);
        let mut sim = Simulation::new(regional(), config);
        let report = sim.run(&requests);

        prop_assert_eq!(report.total_requests, requests.len() as u64);
        prop_assert_eq!(
            report.cache_hits + report.cache_misses + report.unrouted_requests,
            report.total_requests
        );
        prop_assert_eq!(report.origin_requests, report.cache_misses);
        prop_assert_eq!(sim.outcomes().len(), requests.len());
        let loads: u64 = report.server_loads.values().sum();
        prop_assert_eq!(loads, report.cache_hits + report.cache_misses);
        let served: u64 = report.content_served.values().sum();
        prop_assert_eq!(served, report.cache_hits + report.cache_misses);
        if report.unrouted_requests == 0 && report.total_requests > 0 {
            prop_assert!((report.hit_ratio + report.miss_ratio() - 1.0).abs() < 1e-9);
        }
        if capacity == 0 {
            prop_assert_eq!(report.hit_ratio, 0.0);
        }
        prop_assert!(report.median_latency <= report.p95_latency);
        prop_assert!(report.p95_latency <= report.p99_latency);
        prop_assert!(report.bandwidth_saved <= 1.0);
        for edge in ["edge_bos", "edge_chi", "edge_sf"] {
            prop_assert!(sim.edge_cache(edge).unwrap().len() <= capacity);
        }
    }
}
