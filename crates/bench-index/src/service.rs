//! Index service client interface.

use crate::error::IndexServiceError;
use crate::types::{IndexKey, PrimaryIndexEntry, RowIdBatch};
use async_trait::async_trait;

/// Client of a row-id allocation and primary-index service.
///
/// One client is shared by all workers of a benchmark; implementations must
/// be safe to call concurrently.
#[async_trait]
pub trait IndexService: Send + Sync {
    /// Open an index for writing.
    async fn open_index(
        &self,
        table_id: u64,
        index_id: u64,
        primary: bool,
    ) -> Result<(), IndexServiceError>;

    /// Close an index opened with [`IndexService::open_index`].
    async fn close_index(
        &self,
        table_id: u64,
        index_id: u64,
        primary: bool,
    ) -> Result<(), IndexServiceError>;

    /// Allocate up to `count` consecutive row ids for a table.
    async fn allocate_row_id_batch(
        &self,
        table_id: u64,
        count: u32,
    ) -> Result<RowIdBatch, IndexServiceError>;

    /// Insert or overwrite primary index entries.
    async fn put_primary_index_entries(
        &self,
        table_id: u64,
        index_id: u64,
        entries: Vec<PrimaryIndexEntry>,
    ) -> Result<(), IndexServiceError>;

    /// Delete primary index entries by key.
    async fn delete_primary_index_entries(
        &self,
        table_id: u64,
        index_id: u64,
        keys: Vec<IndexKey>,
    ) -> Result<(), IndexServiceError>;
}
