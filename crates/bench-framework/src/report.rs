//! Benchmark report types.

use crate::metrics::PhaseMetrics;

/// Result of a benchmark run.
#[derive(Debug, Clone)]
pub struct BenchReport {
    /// Benchmark name.
    pub name: String,
    /// Phases in execution order.
    pub phases: Vec<PhaseMetrics>,
    /// Overall status.
    pub status: BenchStatus,
    /// Errors that did not abort the run (e.g. close failures).
    pub errors: Vec<String>,
}

impl BenchReport {
    /// Create a new report.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phases: Vec::new(),
            status: BenchStatus::Pending,
            errors: Vec::new(),
        }
    }

    /// Append a finished phase.
    pub fn push_phase(&mut self, phase: PhaseMetrics) {
        self.phases.push(phase);
    }

    /// Look up a phase by name.
    pub fn phase(&self, name: &str) -> Option<&PhaseMetrics> {
        self.phases.iter().find(|p| p.phase == name)
    }

    /// Failed iterations across all phases.
    pub fn failed_iterations(&self) -> u64 {
        self.phases.iter().map(|p| p.failed_iterations()).sum()
    }

    /// Mark the run finished, deriving the status from recorded failures.
    pub fn finish(&mut self) {
        self.status = if self.failed_iterations() == 0 && self.errors.is_empty() {
            BenchStatus::Completed
        } else {
            BenchStatus::CompletedWithFailures
        };
    }

    /// Generate a summary string.
    pub fn summary(&self) -> String {
        let status_str = match self.status {
            BenchStatus::Pending => "PENDING",
            BenchStatus::Running => "RUNNING",
            BenchStatus::Completed => "COMPLETED",
            BenchStatus::CompletedWithFailures => "COMPLETED WITH FAILURES",
        };

        let mut summary = format!(
            "Benchmark Report: {} ({})\n\
             ================\n",
            self.name, status_str
        );

        for phase in &self.phases {
            summary.push_str(&phase.summary());
        }

        if !self.errors.is_empty() {
            summary.push_str("\nErrors:\n");
            for error in &self.errors {
                summary.push_str(&format!("- {error}\n"));
            }
        }

        summary
    }
}

/// Overall benchmark status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchStatus {
    /// Benchmark has not started.
    Pending,
    /// Benchmark is running.
    Running,
    /// All iterations succeeded.
    Completed,
    /// The run finished but some iterations or teardown steps failed.
    CompletedWithFailures,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::WorkerMetrics;
    use std::time::Duration;

    fn phase(name: &str, failures: u64) -> PhaseMetrics {
        let mut worker = WorkerMetrics::new(0);
        for i in 0..failures {
            worker.record_failure(format!("iteration {i} failed"));
        }
        let mut phase = PhaseMetrics::new(name);
        phase.workers.push(worker);
        phase.elapsed = Duration::from_secs(1);
        phase
    }

    #[test]
    fn test_report_completed() {
        let mut report = BenchReport::new("index");
        report.push_phase(phase("put", 0));
        report.push_phase(phase("delete", 0));
        report.finish();

        assert_eq!(report.status, BenchStatus::Completed);
        assert_eq!(report.phases.len(), 2);
    }

    #[test]
    fn test_report_with_failures() {
        let mut report = BenchReport::new("index");
        report.push_phase(phase("put", 2));
        report.push_phase(phase("delete", 1));
        report.finish();

        assert_eq!(report.status, BenchStatus::CompletedWithFailures);
        assert_eq!(report.failed_iterations(), 3);
        assert_eq!(report.phase("delete").map(|p| p.failed_iterations()), Some(1));
    }

    #[test]
    fn test_report_teardown_error() {
        let mut report = BenchReport::new("index");
        report.push_phase(phase("put", 0));
        report.errors.push("close failed".to_string());
        report.finish();

        assert_eq!(report.status, BenchStatus::CompletedWithFailures);
        let summary = report.summary();
        assert!(summary.contains("COMPLETED WITH FAILURES"));
        assert!(summary.contains("- close failed"));
    }
}
