//! Integration: a bootstrapped cache probes the real driver once and feeds the planner.

use envcaps::{bootstrap_with, chunk_rows, ProbeConfig, ASYNC_OPERATIONS};

#[test]
fn bootstrap_probes_once_and_plans_batches() {
    let cache = bootstrap_with(ProbeConfig::default()).expect("bootstrap");
    let limit = cache.parameter_limit().expect("limit");
    assert_eq!(cache.parameter_limit().expect("limit again"), limit);
    assert_eq!(cache.limit_probe_runs(), 1);

    let rows: Vec<u64> = (0..2_500).collect();
    let mut seen = 0usize;
    for batch in chunk_rows(&rows, 4, limit).expect("plan") {
        assert!(batch.len() * 4 <= limit.get());
        assert_eq!(batch[0] as usize, seen);
        seen += batch.len();
    }
    assert_eq!(seen, rows.len());
    assert!(cache.capabilities().contains(ASYNC_OPERATIONS));
}

#[tokio::test]
async fn async_callers_share_one_probe() {
    let cache = bootstrap_with(ProbeConfig::default()).expect("bootstrap");
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let cache = cache.clone();
            tokio::spawn(async move { cache.parameter_limit_async().await })
        })
        .collect();
    let mut limits = Vec::new();
    for handle in handles {
        limits.push(handle.await.expect("join").expect("limit"));
    }
    assert!(limits.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(cache.limit_probe_runs(), 1);
}
