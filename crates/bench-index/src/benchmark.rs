//! Concurrent put/delete workload against an index service.

use crate::config::IndexBenchConfig;
use crate::counter::{KeyMinter, TimestampClock};
use crate::error::IndexServiceError;
use crate::service::IndexService;
use crate::types::{IndexKey, PrimaryIndexEntry, RowIdBatch, RowLocation};
use bench_framework::{BenchError, BenchReport, BenchStatus, PhaseMetrics, TaskGroup, WorkerMetrics};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Postfix of the first key minted in each phase.
const FIRST_KEY_POSTFIX: u64 = 0;

/// First transaction timestamp of a run.
const FIRST_TIMESTAMP: u64 = 1;

/// Drives the put phase and then the delete phase of an index benchmark.
pub struct IndexBenchmark {
    service: Arc<dyn IndexService>,
    config: IndexBenchConfig,
    keys: KeyMinter,
    timestamps: TimestampClock,
}

impl IndexBenchmark {
    /// Create a benchmark against `service`.
    pub fn new(service: Arc<dyn IndexService>, config: IndexBenchConfig) -> Result<Self, BenchError> {
        config.validate()?;
        Ok(Self {
            service,
            config,
            keys: KeyMinter::new(FIRST_KEY_POSTFIX),
            timestamps: TimestampClock::new(FIRST_TIMESTAMP),
        })
    }

    /// The benchmark parameters.
    pub fn config(&self) -> &IndexBenchConfig {
        &self.config
    }

    /// Run the put phase, then the delete phase.
    pub async fn run(&self) -> Result<BenchReport, BenchError> {
        let mut report = BenchReport::new("index");
        report.status = BenchStatus::Running;

        info!(
            "Starting index benchmark: {} workers x {} batches x {} rows on table {} index {}",
            self.config.thread_count,
            self.config.batch_count,
            self.config.batch_size,
            self.config.table_id,
            self.config.index_id
        );

        report.push_phase(self.run_put_phase().await?);
        report.push_phase(self.run_delete_phase().await?);
        report.finish();

        Ok(report)
    }

    /// Put phase: every worker allocates row ids and puts one entry per id.
    pub async fn run_put_phase(&self) -> Result<PhaseMetrics, BenchError> {
        self.keys.reset(FIRST_KEY_POSTFIX);
        self.run_phase(Phase::Put).await
    }

    /// Delete phase: replays the put phase's keys and deletes them.
    ///
    /// Only the key counter is rewound. Timestamps keep increasing, so every
    /// delete is stamped later than the put it undoes.
    pub async fn run_delete_phase(&self) -> Result<PhaseMetrics, BenchError> {
        self.keys.reset(FIRST_KEY_POSTFIX);
        self.run_phase(Phase::Delete).await
    }

    async fn run_phase(&self, phase: Phase) -> Result<PhaseMetrics, BenchError> {
        let (table_id, index_id) = (self.config.table_id, self.config.index_id);
        self.service.open_index(table_id, index_id, true).await?;

        let started = Instant::now();
        let mut group = TaskGroup::new();
        for worker in 0..self.config.thread_count {
            let worker = Worker {
                worker,
                service: Arc::clone(&self.service),
                config: self.config.clone(),
                keys: self.keys.clone(),
                timestamps: self.timestamps.clone(),
            };
            group.spawn(worker.run(phase));
        }

        let joined = group.join_all(self.config.join_timeout).await;
        let closed = self.service.close_index(table_id, index_id, true).await;
        let elapsed = started.elapsed();

        let workers = joined?;
        closed?;

        let metrics = PhaseMetrics {
            phase: phase.name().to_string(),
            workers,
            elapsed,
            planned_operations: self.config.planned_operations(),
        };
        info!(
            "{} phase finished in {} ms: {} ops/s, {} failed iterations",
            phase.name(),
            metrics.elapsed_ms(),
            metrics.throughput(),
            metrics.failed_iterations()
        );
        Ok(metrics)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Put,
    Delete,
}

impl Phase {
    fn name(self) -> &'static str {
        match self {
            Phase::Put => "put",
            Phase::Delete => "delete",
        }
    }
}

/// One logical worker. Iterations run strictly one after another.
struct Worker {
    worker: usize,
    service: Arc<dyn IndexService>,
    config: IndexBenchConfig,
    keys: KeyMinter,
    timestamps: TimestampClock,
}

impl Worker {
    async fn run(self, phase: Phase) -> WorkerMetrics {
        let mut metrics = WorkerMetrics::new(self.worker);
        metrics.operations = self.config.operations_per_worker();

        let started = Instant::now();
        for iteration in 0..self.config.batch_count {
            metrics.iterations += 1;
            let result = match phase {
                Phase::Put => self.put_iteration(iteration).await,
                Phase::Delete => self.delete_iteration().await,
            };
            match result {
                Ok(submitted) => metrics.completed_operations += submitted,
                Err(e) => {
                    error!(
                        "{} failed for worker {} iteration {}: {}",
                        phase.name(),
                        self.worker,
                        iteration,
                        e
                    );
                    metrics.record_failure(format!(
                        "{} failed for worker {} iteration {}: {e}",
                        phase.name(),
                        self.worker,
                        iteration
                    ));
                }
            }
        }
        metrics.elapsed = started.elapsed();

        debug!(
            "[{} worker {}] elapsed time: {} ms, throughput: {} ops",
            phase.name(),
            self.worker,
            metrics.elapsed_ms(),
            metrics.throughput()
        );
        metrics
    }

    /// Allocate a batch and put one entry per row id actually allocated.
    async fn put_iteration(&self, iteration: u32) -> Result<u64, IndexServiceError> {
        let timestamp = self.timestamps.tick();
        let batch = self
            .service
            .allocate_row_id_batch(self.config.table_id, self.config.batch_size)
            .await?;

        let entries: Vec<PrimaryIndexEntry> = (0..batch.length)
            .map(|offset| self.entry(iteration, &batch, offset, timestamp))
            .collect();
        let submitted = entries.len() as u64;

        self.service
            .put_primary_index_entries(self.config.table_id, self.config.index_id, entries)
            .await?;
        Ok(submitted)
    }

    /// Delete the next `batch_size` keys.
    async fn delete_iteration(&self) -> Result<u64, IndexServiceError> {
        let timestamp = self.timestamps.tick();
        let keys: Vec<IndexKey> = (0..self.config.batch_size)
            .map(|_| self.index_key(timestamp))
            .collect();
        let submitted = keys.len() as u64;

        self.service
            .delete_primary_index_entries(self.config.table_id, self.config.index_id, keys)
            .await?;
        Ok(submitted)
    }

    fn index_key(&self, timestamp: u64) -> IndexKey {
        IndexKey {
            table_id: self.config.table_id,
            index_id: self.config.index_id,
            timestamp,
            key: self.keys.next_key(),
        }
    }

    /// Entry for row `offset` of `batch`: file `worker * batch_count + iteration`,
    /// row group 0, row `iteration * batch_size + offset`.
    fn entry(&self, iteration: u32, batch: &RowIdBatch, offset: u32, timestamp: u64) -> PrimaryIndexEntry {
        PrimaryIndexEntry {
            row_id: batch.row_id(offset),
            index_key: self.index_key(timestamp),
            row_location: RowLocation {
                file_id: self.worker as u64 * u64::from(self.config.batch_count)
                    + u64::from(iteration),
                rg_id: 0,
                rg_row_offset: iteration * self.config.batch_size + offset,
            },
        }
    }
}
