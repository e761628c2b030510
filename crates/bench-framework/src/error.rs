//! Error types for the benchmark framework.

use std::time::Duration;
use thiserror::Error;

/// Errors that abort a benchmark or one of its phases.
///
/// Failures of individual worker iterations are not represented here: they
/// are logged and counted in [`crate::WorkerMetrics`] while the run goes on.
#[derive(Error, Debug)]
pub enum BenchError {
    /// Transport channel failure (open, send, receive or close).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Index service failure outside of a worker iteration (open/close).
    #[error("Index service error: {0}")]
    IndexService(String),

    /// Transaction service failure outside of a worker iteration.
    #[error("Transaction service error: {0}")]
    TransService(String),

    /// Invalid benchmark parameters.
    #[error("Usage error: {0}")]
    Usage(String),

    /// Workers did not finish before the join timeout elapsed.
    #[error("Workers did not finish within {0:?}")]
    Timeout(Duration),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
