//! Configuration of the index benchmark.

use bench_framework::{BenchError, DEFAULT_JOIN_TIMEOUT};
use std::time::Duration;

/// Parameters of an index benchmark run.
#[derive(Debug, Clone)]
pub struct IndexBenchConfig {
    /// Number of concurrent workers.
    pub thread_count: usize,
    /// Iterations per worker.
    pub batch_count: u32,
    /// Row ids requested (and keys deleted) per iteration.
    pub batch_size: u32,
    /// Table the entries belong to.
    pub table_id: u64,
    /// Primary index of the table.
    pub index_id: u64,
    /// Upper bound on waiting for a phase's workers.
    pub join_timeout: Duration,
}

impl IndexBenchConfig {
    /// Create a configuration with the default join timeout.
    pub fn new(
        thread_count: usize,
        batch_count: u32,
        batch_size: u32,
        table_id: u64,
        index_id: u64,
    ) -> Self {
        Self {
            thread_count,
            batch_count,
            batch_size,
            table_id,
            index_id,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }

    /// Set the join timeout.
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Operations one worker is asked to perform in a phase.
    pub fn operations_per_worker(&self) -> u64 {
        u64::from(self.batch_count) * u64::from(self.batch_size)
    }

    /// Operations planned across all workers in a phase.
    pub fn planned_operations(&self) -> u64 {
        self.thread_count as u64 * self.operations_per_worker()
    }

    /// Reject parameters the workload cannot be built from.
    ///
    /// Row-group offsets are `iteration * batch_size + offset` and must fit
    /// in a `u32`.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.thread_count == 0 {
            return Err(BenchError::Usage("thread count must be positive".to_string()));
        }
        if self.batch_count == 0 {
            return Err(BenchError::Usage("batch count must be positive".to_string()));
        }
        if self.batch_size == 0 {
            return Err(BenchError::Usage("batch size must be positive".to_string()));
        }
        if self.operations_per_worker() > u64::from(u32::MAX) {
            return Err(BenchError::Usage(format!(
                "batch count {} x batch size {} overflows row group offsets",
                self.batch_count, self.batch_size
            )));
        }
        Ok(())
    }
}
