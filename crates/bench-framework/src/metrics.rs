//! Metrics collected by benchmark workers and phases.

use std::time::Duration;

/// Operations per second for `operations` completed in `elapsed`.
///
/// Uses whole milliseconds like the printed elapsed times, and reports 0.0
/// when nothing measurable elapsed.
pub fn ops_per_second(operations: u64, elapsed: Duration) -> f64 {
    let elapsed_ms = elapsed.as_millis();
    if elapsed_ms > 0 {
        operations as f64 * 1000.0 / elapsed_ms as f64
    } else {
        0.0
    }
}

/// Metrics of one logical worker within a phase.
#[derive(Debug, Clone, Default)]
pub struct WorkerMetrics {
    /// Worker index, `0..thread_count`.
    pub worker: usize,
    /// Time between the worker's first and last iteration.
    pub elapsed: Duration,
    /// Operations the worker was asked to perform.
    pub operations: u64,
    /// Operations submitted by iterations that succeeded.
    pub completed_operations: u64,
    /// Iterations executed (successful or not).
    pub iterations: u64,
    /// Iterations whose service call failed.
    pub failed_iterations: u64,
    /// One message per failed iteration.
    pub errors: Vec<String>,
}

impl WorkerMetrics {
    /// Create empty metrics for a worker.
    pub fn new(worker: usize) -> Self {
        Self {
            worker,
            ..Default::default()
        }
    }

    /// Record a failed iteration.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failed_iterations += 1;
        self.errors.push(message.into());
    }

    /// Elapsed time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Operations per second over this worker's own elapsed time.
    pub fn throughput(&self) -> f64 {
        ops_per_second(self.operations, self.elapsed)
    }
}

/// Metrics of one benchmark phase across all workers.
#[derive(Debug, Clone, Default)]
pub struct PhaseMetrics {
    /// Phase name, e.g. "put" or "delete".
    pub phase: String,
    /// Per-worker metrics, ordered by worker index.
    pub workers: Vec<WorkerMetrics>,
    /// Wall-clock span of the whole phase.
    pub elapsed: Duration,
    /// Operations planned across all workers.
    pub planned_operations: u64,
}

impl PhaseMetrics {
    /// Create empty metrics for a phase.
    pub fn new(phase: impl Into<String>) -> Self {
        Self {
            phase: phase.into(),
            ..Default::default()
        }
    }

    /// Elapsed wall-clock time in whole milliseconds.
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Aggregate operations per second over the phase's wall-clock span,
    /// never over the sum of per-worker times.
    pub fn throughput(&self) -> f64 {
        ops_per_second(self.planned_operations, self.elapsed)
    }

    /// Failed iterations across all workers.
    pub fn failed_iterations(&self) -> u64 {
        self.workers.iter().map(|w| w.failed_iterations).sum()
    }

    /// Human-readable lines for this phase.
    pub fn summary(&self) -> String {
        let mut summary = String::new();
        for worker in &self.workers {
            summary.push_str(&format!(
                "[{} worker {}] elapsed time: {} ms\n\
                 [{} worker {}] throughput: {} ops\n",
                self.phase,
                worker.worker,
                worker.elapsed_ms(),
                self.phase,
                worker.worker,
                worker.throughput()
            ));
        }
        summary.push_str(&format!(
            "{} elapsed time: {} ms\n\
             {} throughput: {} ops\n",
            self.phase,
            self.elapsed_ms(),
            self.phase,
            self.throughput()
        ));
        if self.failed_iterations() > 0 {
            summary.push_str(&format!(
                "{} failed iterations: {}\n",
                self.phase,
                self.failed_iterations()
            ));
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_throughput() {
        let metrics = WorkerMetrics {
            worker: 0,
            elapsed: Duration::from_millis(2000),
            operations: 1000,
            ..Default::default()
        };

        assert_eq!(metrics.throughput(), 500.0);
    }

    #[test]
    fn test_worker_zero_duration() {
        let metrics = WorkerMetrics {
            operations: 1000,
            ..Default::default()
        };

        assert_eq!(metrics.throughput(), 0.0);
    }

    #[test]
    fn test_phase_throughput_uses_wall_clock() {
        let worker = |id| WorkerMetrics {
            worker: id,
            elapsed: Duration::from_secs(10),
            operations: 100,
            ..Default::default()
        };
        let phase = PhaseMetrics {
            phase: "put".to_string(),
            workers: vec![worker(0), worker(1)],
            elapsed: Duration::from_secs(10),
            planned_operations: 200,
        };

        // Two overlapping 10s workers doing 100 ops each: 20 ops/s, not 10.
        assert_eq!(phase.throughput(), 20.0);
    }

    #[test]
    fn test_phase_failed_iterations() {
        let mut first = WorkerMetrics::new(0);
        first.record_failure("worker 0 iteration 1: boom");
        let mut second = WorkerMetrics::new(1);
        second.record_failure("worker 1 iteration 0: boom");
        second.record_failure("worker 1 iteration 2: boom");

        let mut phase = PhaseMetrics::new("delete");
        phase.workers = vec![first, second];

        assert_eq!(phase.failed_iterations(), 3);
        assert!(phase.summary().contains("delete failed iterations: 3"));
    }

    #[test]
    fn test_phase_summary_lines() {
        let mut phase = PhaseMetrics::new("put");
        phase.workers = vec![WorkerMetrics {
            worker: 0,
            elapsed: Duration::from_millis(100),
            operations: 10,
            ..Default::default()
        }];
        phase.elapsed = Duration::from_millis(250);
        phase.planned_operations = 10;

        let summary = phase.summary();
        assert!(summary.contains("[put worker 0] elapsed time: 100 ms"));
        assert!(summary.contains("[put worker 0] throughput: 100 ops"));
        assert!(summary.contains("put elapsed time: 250 ms"));
        assert!(summary.contains("put throughput: 40 ops"));
        assert!(!summary.contains("failed iterations"));
    }
}
