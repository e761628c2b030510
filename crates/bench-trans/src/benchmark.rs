//! Concurrent begin/commit workload against a transaction service.

use crate::config::TransBenchConfig;
use crate::error::TransServiceError;
use crate::service::TransService;
use bench_framework::metrics::ops_per_second;
use bench_framework::{BenchError, BenchStatus, TaskGroup};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Latencies and outcomes of one worker.
#[derive(Debug, Clone, Default)]
pub struct TransWorkerMetrics {
    pub worker: usize,
    /// Total time spent waiting on begin calls.
    pub begin_time: Duration,
    /// Total time spent waiting on commit calls.
    pub commit_time: Duration,
    pub iterations: u64,
    /// Transactions the service reported as committed.
    pub committed: u64,
    /// Transactions the service reported as not committed.
    pub failed_commits: u64,
    /// Begin calls that returned a different number of contexts than asked.
    pub mismatched_batches: u64,
    /// Iterations aborted by a service error.
    pub failed_iterations: u64,
    pub errors: Vec<String>,
}

impl TransWorkerMetrics {
    fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Default::default()
        }
    }

    /// The per-worker result line.
    pub fn summary(&self) -> String {
        format!(
            "begin trans cost: {} ms, commit trans cost: {} ms",
            self.begin_time.as_millis(),
            self.commit_time.as_millis()
        )
    }
}

/// Result of a transaction benchmark run.
#[derive(Debug, Clone)]
pub struct TransReport {
    /// Per-worker metrics, ordered by worker index.
    pub workers: Vec<TransWorkerMetrics>,
    /// Wall-clock span of the run.
    pub elapsed: Duration,
    pub planned_transactions: u64,
    pub status: BenchStatus,
}

impl TransReport {
    pub fn begin_time(&self) -> Duration {
        self.workers.iter().map(|w| w.begin_time).sum()
    }

    pub fn commit_time(&self) -> Duration {
        self.workers.iter().map(|w| w.commit_time).sum()
    }

    pub fn committed(&self) -> u64 {
        self.workers.iter().map(|w| w.committed).sum()
    }

    pub fn failed_commits(&self) -> u64 {
        self.workers.iter().map(|w| w.failed_commits).sum()
    }

    pub fn mismatched_batches(&self) -> u64 {
        self.workers.iter().map(|w| w.mismatched_batches).sum()
    }

    pub fn failed_iterations(&self) -> u64 {
        self.workers.iter().map(|w| w.failed_iterations).sum()
    }

    /// Committed transactions per second over the wall-clock span.
    pub fn throughput(&self) -> f64 {
        ops_per_second(self.committed(), self.elapsed)
    }

    /// Human-readable lines: one per worker, then the totals.
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        for worker in &self.workers {
            summary.push_str(&worker.summary());
            summary.push('\n');
        }
        summary.push_str(&format!(
            "elapsed time: {} ms\n\
             committed: {} of {} transactions\n\
             throughput: {} trans/s\n",
            self.elapsed.as_millis(),
            self.committed(),
            self.planned_transactions,
            self.throughput()
        ));
        if self.status == BenchStatus::CompletedWithFailures {
            summary.push_str(&format!(
                "failed commits: {}, mismatched batches: {}, failed iterations: {}\n",
                self.failed_commits(),
                self.mismatched_batches(),
                self.failed_iterations()
            ));
        }
        summary
    }
}

/// Drives batched begin/commit rounds from many workers.
pub struct TransBenchmark {
    service: Arc<dyn TransService>,
    config: TransBenchConfig,
}

impl TransBenchmark {
    pub fn new(service: Arc<dyn TransService>, config: TransBenchConfig) -> Result<Self, BenchError> {
        config.validate()?;
        Ok(Self { service, config })
    }

    pub fn config(&self) -> &TransBenchConfig {
        &self.config
    }

    /// Run every worker to completion and collect the report.
    pub async fn run(&self) -> Result<TransReport, BenchError> {
        info!(
            "Starting transaction benchmark: {} workers x {} iterations x {} transactions",
            self.config.worker_count, self.config.iterations, self.config.batch_size
        );

        let started = Instant::now();
        let mut group = TaskGroup::new();
        for worker in 0..self.config.worker_count {
            let service = Arc::clone(&self.service);
            let config = self.config.clone();
            group.spawn(run_worker(worker, service, config));
        }
        let workers = group.join_all(self.config.join_timeout).await?;
        let elapsed = started.elapsed();

        let mut report = TransReport {
            workers,
            elapsed,
            planned_transactions: self.config.planned_transactions(),
            status: BenchStatus::Completed,
        };
        if report.failed_commits() > 0
            || report.mismatched_batches() > 0
            || report.failed_iterations() > 0
        {
            report.status = BenchStatus::CompletedWithFailures;
        }

        info!(
            "Transaction benchmark finished in {} ms: {} committed, {} failed commits",
            report.elapsed.as_millis(),
            report.committed(),
            report.failed_commits()
        );
        Ok(report)
    }
}

async fn run_worker(
    worker: usize,
    service: Arc<dyn TransService>,
    config: TransBenchConfig,
) -> TransWorkerMetrics {
    let mut metrics = TransWorkerMetrics::new(worker);

    for iteration in 0..config.iterations {
        metrics.iterations += 1;
        if let Err(e) = run_iteration(service.as_ref(), &config, &mut metrics).await {
            error!(
                "Transaction round failed for worker {} iteration {}: {}",
                worker, iteration, e
            );
            metrics.failed_iterations += 1;
            metrics.errors.push(format!("worker {worker} iteration {iteration}: {e}"));
        }
    }

    debug!("[trans worker {}] {}", worker, metrics.summary());
    metrics
}

/// One begin/commit round. Latencies are recorded even when a call fails.
async fn run_iteration(
    service: &dyn TransService,
    config: &TransBenchConfig,
    metrics: &mut TransWorkerMetrics,
) -> Result<(), TransServiceError> {
    let start = Instant::now();
    let begun = service
        .begin_trans_batch(config.batch_size, config.read_only)
        .await;
    metrics.begin_time += start.elapsed();
    let contexts = begun?;

    if contexts.len() != config.batch_size as usize {
        warn!(
            "Worker {} asked for {} transactions, began {}",
            metrics.worker,
            config.batch_size,
            contexts.len()
        );
        metrics.mismatched_batches += 1;
    }

    let trans_ids: Vec<i64> = contexts.iter().map(|c| c.trans_id).collect();
    let start = Instant::now();
    let committed = service
        .commit_trans_batch(trans_ids.clone(), config.read_only)
        .await;
    metrics.commit_time += start.elapsed();
    let committed = committed?;

    if committed.len() != trans_ids.len() {
        warn!(
            "Worker {} committed {} transactions, got {} results",
            metrics.worker,
            trans_ids.len(),
            committed.len()
        );
    }
    for (k, trans_id) in trans_ids.iter().enumerate() {
        if committed.get(k).copied().unwrap_or(false) {
            metrics.committed += 1;
        } else {
            warn!("transaction {} failed to commit", trans_id);
            metrics.failed_commits += 1;
        }
    }
    Ok(())
}
