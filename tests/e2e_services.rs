//! End-to-end runs of the index and transaction benchmarks against the
//! in-process services.

use bench_framework::BenchStatus;
use bench_index::{IndexBenchConfig, IndexService, LocalIndexService};
use bench_trans::{LocalTransService, TransBenchConfig, TransService};
use ccb_bench::bench;
use std::sync::Arc;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_index_put_then_delete() {
    let service = Arc::new(LocalIndexService::new());
    let config = IndexBenchConfig::new(4, 10, 25, 1, 1);

    let report = bench::run_index_with(service.clone() as Arc<dyn IndexService>, config)
        .await
        .unwrap();

    assert_eq!(report.status, BenchStatus::Completed);
    let put = report.phase("put").unwrap();
    let delete = report.phase("delete").unwrap();
    assert_eq!(put.planned_operations, 1000);
    assert_eq!(put.workers.len(), 4);
    assert_eq!(delete.workers.len(), 4);
    assert_eq!(report.failed_iterations(), 0);

    // Everything put was deleted again.
    assert_eq!(service.entry_count(1, 1).await, 0);
    assert!(!service.is_open(1, 1).await);

    let summary = report.summary();
    assert!(summary.contains("[put worker 3] elapsed time:"));
    assert!(summary.contains("put throughput:"));
    assert!(summary.contains("delete elapsed time:"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_index_short_allocations() {
    let service = Arc::new(LocalIndexService::new().with_allocation_limit(10));
    let config = IndexBenchConfig::new(3, 4, 25, 7, 2);

    let report = bench::run_index_with(service.clone() as Arc<dyn IndexService>, config)
        .await
        .unwrap();

    // Only 3 * 4 * 10 entries exist, but the delete phase replays
    // 3 * 4 * 25 keys, so deletes of never-put keys fail.
    let put = report.phase("put").unwrap();
    assert_eq!(put.failed_iterations(), 0);
    assert!(put.workers.iter().all(|w| w.completed_operations == 40));
    assert!(report.phase("delete").unwrap().failed_iterations() > 0);
    assert_eq!(report.status, BenchStatus::CompletedWithFailures);
}

#[tokio::test]
async fn test_index_rejects_invalid_config() {
    let result = bench::run_index(IndexBenchConfig::new(1, 0, 10, 1, 1)).await;
    assert!(result.is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_trans_begin_commit() {
    let service = Arc::new(LocalTransService::new());
    let config = TransBenchConfig::new(16, 10, 20);

    let report = bench::run_trans_with(service.clone() as Arc<dyn TransService>, config)
        .await
        .unwrap();

    assert_eq!(report.status, BenchStatus::Completed);
    assert_eq!(report.workers.len(), 16);
    assert_eq!(report.committed(), 3200);
    assert_eq!(service.active_count().await, 0);

    let summary = report.summary();
    assert_eq!(summary.matches("begin trans cost:").count(), 16);
    assert!(summary.contains("committed: 3200 of 3200 transactions"));
}

#[tokio::test]
async fn test_trans_read_only() {
    let config = TransBenchConfig::new(2, 3, 4).with_read_only(true);
    let report = bench::run_trans(config).await.unwrap();

    assert_eq!(report.committed(), 24);
    assert_eq!(report.failed_commits(), 0);
}
