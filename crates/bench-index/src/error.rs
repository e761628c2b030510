//! Error types for the index service.

use bench_framework::BenchError;
use thiserror::Error;

/// Errors returned by an [`crate::IndexService`].
#[derive(Error, Debug)]
pub enum IndexServiceError {
    #[error("Index {index_id} of table {table_id} is not open")]
    IndexNotOpen { table_id: u64, index_id: u64 },

    #[error("Key not found: {0}")]
    KeyNotFound(String),

    #[error("Row id allocation failed for table {table_id}: {reason}")]
    Allocation { table_id: u64, reason: String },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Index service unavailable: {0}")]
    Unavailable(String),
}

impl From<IndexServiceError> for BenchError {
    fn from(err: IndexServiceError) -> Self {
        BenchError::IndexService(err.to_string())
    }
}
