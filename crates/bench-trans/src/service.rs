//! The transaction service seam.

use crate::error::TransServiceError;
use crate::types::TransContext;
use async_trait::async_trait;

/// Batch begin/commit API of a distributed transaction service.
///
/// One client is shared by every worker of a benchmark, so implementations
/// must tolerate concurrent calls.
#[async_trait]
pub trait TransService: Send + Sync {
    /// Begin `count` transactions in one call.
    ///
    /// The service may return fewer contexts than requested.
    async fn begin_trans_batch(
        &self,
        count: u32,
        read_only: bool,
    ) -> Result<Vec<TransContext>, TransServiceError>;

    /// Commit `trans_ids` in one call.
    ///
    /// Returns one flag per id, in order; `false` means that transaction
    /// did not commit.
    async fn commit_trans_batch(
        &self,
        trans_ids: Vec<i64>,
        read_only: bool,
    ) -> Result<Vec<bool>, TransServiceError>;
}
