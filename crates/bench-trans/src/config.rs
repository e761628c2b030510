//! Configuration of the transaction benchmark.

use bench_framework::{BenchError, DEFAULT_JOIN_TIMEOUT};
use std::time::Duration;

/// Default number of concurrent workers.
pub const DEFAULT_WORKER_COUNT: usize = 128;

/// Default begin/commit rounds per worker.
pub const DEFAULT_ITERATIONS: u32 = 100;

/// Default transactions per begin call.
pub const DEFAULT_BATCH_SIZE: u32 = 100;

/// Parameters of a transaction benchmark run.
#[derive(Debug, Clone)]
pub struct TransBenchConfig {
    pub worker_count: usize,
    /// Begin/commit rounds per worker.
    pub iterations: u32,
    /// Transactions begun (and committed) per round.
    pub batch_size: u32,
    pub read_only: bool,
    pub join_timeout: Duration,
}

impl Default for TransBenchConfig {
    fn default() -> Self {
        Self {
            worker_count: DEFAULT_WORKER_COUNT,
            iterations: DEFAULT_ITERATIONS,
            batch_size: DEFAULT_BATCH_SIZE,
            read_only: false,
            join_timeout: DEFAULT_JOIN_TIMEOUT,
        }
    }
}

impl TransBenchConfig {
    /// Create a read-write configuration with the default join timeout.
    pub fn new(worker_count: usize, iterations: u32, batch_size: u32) -> Self {
        Self {
            worker_count,
            iterations,
            batch_size,
            ..Default::default()
        }
    }

    /// Begin and commit read-only transactions.
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the join timeout.
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Transactions planned across all workers.
    pub fn planned_transactions(&self) -> u64 {
        self.worker_count as u64 * u64::from(self.iterations) * u64::from(self.batch_size)
    }

    /// Reject parameters the workload cannot be built from.
    pub fn validate(&self) -> Result<(), BenchError> {
        if self.worker_count == 0 {
            return Err(BenchError::Usage("worker count must be positive".to_string()));
        }
        if self.iterations == 0 {
            return Err(BenchError::Usage("iterations must be positive".to_string()));
        }
        if self.batch_size == 0 {
            return Err(BenchError::Usage("batch size must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransBenchConfig::default();
        assert_eq!(config.worker_count, 128);
        assert_eq!(config.iterations, 100);
        assert_eq!(config.batch_size, 100);
        assert!(!config.read_only);
        assert_eq!(config.join_timeout, DEFAULT_JOIN_TIMEOUT);
        assert_eq!(config.planned_transactions(), 1_280_000);
    }

    #[test]
    fn test_builder_and_validation() {
        let config = TransBenchConfig::new(4, 10, 5)
            .with_read_only(true)
            .with_join_timeout(Duration::from_secs(5));
        assert!(config.read_only);
        assert_eq!(config.join_timeout, Duration::from_secs(5));
        assert!(config.validate().is_ok());

        assert!(TransBenchConfig::new(0, 1, 1).validate().is_err());
        assert!(TransBenchConfig::new(1, 0, 1).validate().is_err());
        assert!(matches!(
            TransBenchConfig::new(1, 1, 0).validate(),
            Err(BenchError::Usage(_))
        ));
    }
}
