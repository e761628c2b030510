//! Error types for transport channels.

use bench_framework::BenchError;
use thiserror::Error;

/// Errors raised by a sender or receiver.
///
/// Every transport error is fatal to a throughput probe: the timing of a
/// partially failed run is meaningless, so nothing is retried.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("S3 error: {0}")]
    S3(String),

    #[error("SQS error: {0}")]
    Sqs(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Channel is closed")]
    Closed,

    #[error("Received buffer of {size} bytes exceeds the requested maximum of {max_size} bytes")]
    Oversized { size: usize, max_size: usize },

    #[error("Invalid address: {0}")]
    InvalidAddress(String),
}

impl From<TransportError> for BenchError {
    fn from(err: TransportError) -> Self {
        BenchError::Transport(err.to_string())
    }
}
