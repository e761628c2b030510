//! Error types for the transaction service.

use bench_framework::BenchError;
use thiserror::Error;

/// Errors returned by a [`crate::TransService`].
#[derive(Error, Debug)]
pub enum TransServiceError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Transaction service unavailable: {0}")]
    Unavailable(String),
}

impl From<TransServiceError> for BenchError {
    fn from(err: TransServiceError) -> Self {
        BenchError::TransService(err.to_string())
    }
}
