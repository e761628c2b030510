//! Shared building blocks for the ccb-bench benchmarks.
//!
//! Every benchmark in this workspace follows the same shape:
//! 1. Spawn one task per logical worker on the multi-threaded runtime
//! 2. Let each worker run its iterations sequentially, timing them
//! 3. Join all workers with a bounded timeout and fold their metrics into a report
//!
//! # Example
//!
//! ```ignore
//! use bench_framework::{TaskGroup, WorkerMetrics, DEFAULT_JOIN_TIMEOUT};
//!
//! let mut group = TaskGroup::new();
//! for worker in 0..4 {
//!     group.spawn(async move { WorkerMetrics::new(worker) });
//! }
//! let workers = group.join_all(DEFAULT_JOIN_TIMEOUT).await?;
//! ```

pub mod duration;
pub mod error;
pub mod metrics;
pub mod report;
pub mod task_group;

pub use duration::parse_duration;
pub use error::BenchError;
pub use metrics::{PhaseMetrics, WorkerMetrics};
pub use report::{BenchReport, BenchStatus};
pub use task_group::{TaskGroup, DEFAULT_JOIN_TIMEOUT};
