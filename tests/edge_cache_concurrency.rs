// ==============================================
// EDGE CACHE CONCURRENCY TESTS (integration)
// ==============================================
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use edgesim::edge_cache::EdgeCache;
use edgesim::policy::PolicyKind;

mod shared_facade {
    use super::*;

    #[test]
    fn mixed_operations_keep_every_policy_consistent() {
        for kind in PolicyKind::ALL {
            let cache: Arc<EdgeCache<String, u64>> = Arc::new(EdgeCache::with_seed(kind, 32, 11));
            let num_threads = 8;
            let operations_per_thread = 400;
            let gets = Arc::new(AtomicU64::new(0));

            let handles: Vec<_> = (0..num_threads)
                .map(|thread_id| {
                    let cache = Arc::clone(&cache);
                    let gets = Arc::clone(&gets);
                    thread::spawn(move || {
                        for i in 0..operations_per_thread {
                            let key = format!("content_{}", (thread_id * 7 + i) % 64);
                            match i % 3 {
                                0 => cache.put(key, i as u64),
                                1 => {
                                    cache.get(&key);
                                    gets.fetch_add(1, Ordering::Relaxed);
                                },
                                _ => {
                                    cache.contains(&key);
                                },
                            }
                            assert!(cache.len() <= 32);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            let stats = cache.stats();
            assert_eq!(stats.hits + stats.misses, gets.load(Ordering::Relaxed));
            assert!(stats.size <= 32);
            cache.check_invariants().unwrap();
        }
    }

    #[test]
    fn clear_races_with_writers() {
        let cache: Arc<EdgeCache<u64, u64>> = Arc::new(EdgeCache::new(PolicyKind::Lfu, 16));

        let writers: Vec<_> = (0..4u64)
            .map(|t| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for i in 0..1_000u64 {
                        cache.put(t * 10_000 + i % 50, i);
                        cache.get(&(t * 10_000 + i % 10));
                    }
                })
            })
            .collect();
        let clearer = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..50 {
                    cache.clear();
                    thread::yield_now();
                }
            })
        };

        for handle in writers {
            handle.join().unwrap();
        }
        clearer.join().unwrap();

        assert!(cache.len() <= 16);
        cache.check_invariants().unwrap();
    }

    #[test]
    fn one_facade_per_thread_is_independent() {
        let handles: Vec<_> = PolicyKind::ALL
            .into_iter()
            .map(|kind| {
                thread::spawn(move || {
                    let cache: EdgeCache<u32, u32> = EdgeCache::with_seed(kind, 4, 5);
                    for i in 0..100 {
                        cache.put(i % 6, i);
                        cache.get(&(i % 3));
                    }
                    (kind, cache.stats())
                })
            })
            .collect();

        for handle in handles {
            let (kind, stats) = handle.join().unwrap();
            assert_eq!(stats.hits + stats.misses, 100, "{kind}");
            assert_eq!(stats.size, 4, "{kind}");
        }
    }
}
