//! In-process index service for local runs and tests.

use crate::error::IndexServiceError;
use crate::service::IndexService;
use crate::types::{IndexKey, PrimaryIndexEntry, RowIdBatch};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use tokio::sync::Mutex;
use tracing::debug;

type EntryKey = (u64, u64, Bytes);

/// Index service keeping everything in memory.
///
/// Row ids are allocated per table starting at 0. Entries are addressed by
/// `(table_id, index_id, key)`; the timestamp of a delete is not matched
/// against the timestamp of the put.
#[derive(Debug, Default)]
pub struct LocalIndexService {
    next_row_ids: Mutex<HashMap<u64, u64>>,
    open_indexes: Mutex<HashSet<(u64, u64)>>,
    entries: Mutex<HashMap<EntryKey, PrimaryIndexEntry>>,
    allocation_limit: Option<u32>,
}

impl LocalIndexService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cap every allocation at `limit` row ids, like an allocator under
    /// contention returning short batches.
    pub fn with_allocation_limit(mut self, limit: u32) -> Self {
        self.allocation_limit = Some(limit);
        self
    }

    /// Number of entries stored for an index.
    pub async fn entry_count(&self, table_id: u64, index_id: u64) -> usize {
        self.entries
            .lock()
            .await
            .keys()
            .filter(|(t, i, _)| *t == table_id && *i == index_id)
            .count()
    }

    /// Look up an entry by key.
    pub async fn get(&self, table_id: u64, index_id: u64, key: &[u8]) -> Option<PrimaryIndexEntry> {
        self.entries
            .lock()
            .await
            .get(&(table_id, index_id, Bytes::copy_from_slice(key)))
            .cloned()
    }

    /// Whether an index is currently open.
    pub async fn is_open(&self, table_id: u64, index_id: u64) -> bool {
        self.open_indexes
            .lock()
            .await
            .contains(&(table_id, index_id))
    }

    async fn ensure_open(&self, table_id: u64, index_id: u64) -> Result<(), IndexServiceError> {
        if self.is_open(table_id, index_id).await {
            Ok(())
        } else {
            Err(IndexServiceError::IndexNotOpen { table_id, index_id })
        }
    }
}

fn check_key(table_id: u64, index_id: u64, key: &IndexKey) -> Result<(), IndexServiceError> {
    if key.table_id != table_id || key.index_id != index_id {
        return Err(IndexServiceError::InvalidRequest(format!(
            "Key {key} does not belong to index {index_id} of table {table_id}"
        )));
    }
    Ok(())
}

#[async_trait]
impl IndexService for LocalIndexService {
    async fn open_index(
        &self,
        table_id: u64,
        index_id: u64,
        primary: bool,
    ) -> Result<(), IndexServiceError> {
        if !primary {
            return Err(IndexServiceError::InvalidRequest(
                "Only primary indexes are supported".to_string(),
            ));
        }
        self.open_indexes.lock().await.insert((table_id, index_id));
        debug!("Opened index {} of table {}", index_id, table_id);
        Ok(())
    }

    async fn close_index(
        &self,
        table_id: u64,
        index_id: u64,
        _primary: bool,
    ) -> Result<(), IndexServiceError> {
        if !self.open_indexes.lock().await.remove(&(table_id, index_id)) {
            return Err(IndexServiceError::IndexNotOpen { table_id, index_id });
        }
        debug!("Closed index {} of table {}", index_id, table_id);
        Ok(())
    }

    async fn allocate_row_id_batch(
        &self,
        table_id: u64,
        count: u32,
    ) -> Result<RowIdBatch, IndexServiceError> {
        if count == 0 {
            return Err(IndexServiceError::Allocation {
                table_id,
                reason: "requested zero row ids".to_string(),
            });
        }
        let length = self.allocation_limit.map_or(count, |limit| count.min(limit));

        let mut next_row_ids = self.next_row_ids.lock().await;
        let next = next_row_ids.entry(table_id).or_insert(0);
        let batch = RowIdBatch::new(*next, length);
        *next += u64::from(length);
        Ok(batch)
    }

    async fn put_primary_index_entries(
        &self,
        table_id: u64,
        index_id: u64,
        entries: Vec<PrimaryIndexEntry>,
    ) -> Result<(), IndexServiceError> {
        self.ensure_open(table_id, index_id).await?;
        for entry in &entries {
            check_key(table_id, index_id, &entry.index_key)?;
        }

        let mut stored = self.entries.lock().await;
        for entry in entries {
            let key = (table_id, index_id, entry.index_key.key.clone());
            stored.insert(key, entry);
        }
        Ok(())
    }

    async fn delete_primary_index_entries(
        &self,
        table_id: u64,
        index_id: u64,
        keys: Vec<IndexKey>,
    ) -> Result<(), IndexServiceError> {
        self.ensure_open(table_id, index_id).await?;
        for key in &keys {
            check_key(table_id, index_id, key)?;
        }

        // All or nothing: a batch with a missing key deletes nothing.
        let mut stored = self.entries.lock().await;
        if let Some(missing) = keys
            .iter()
            .find(|k| !stored.contains_key(&(table_id, index_id, k.key.clone())))
        {
            return Err(IndexServiceError::KeyNotFound(missing.to_string()));
        }
        for key in keys {
            stored.remove(&(table_id, index_id, key.key));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RowLocation;

    fn entry(row_id: u64, key: &'static str) -> PrimaryIndexEntry {
        PrimaryIndexEntry {
            row_id,
            index_key: IndexKey {
                table_id: 1,
                index_id: 2,
                timestamp: 1,
                key: Bytes::from_static(key.as_bytes()),
            },
            row_location: RowLocation {
                file_id: 0,
                rg_id: 0,
                rg_row_offset: row_id as u32,
            },
        }
    }

    #[tokio::test]
    async fn test_allocations_do_not_overlap() {
        let service = LocalIndexService::new();
        let first = service.allocate_row_id_batch(1, 10).await.unwrap();
        let second = service.allocate_row_id_batch(1, 10).await.unwrap();
        let other_table = service.allocate_row_id_batch(2, 10).await.unwrap();

        assert_eq!(first, RowIdBatch::new(0, 10));
        assert_eq!(second, RowIdBatch::new(10, 10));
        assert_eq!(other_table, RowIdBatch::new(0, 10));
    }

    #[tokio::test]
    async fn test_allocation_limit() {
        let service = LocalIndexService::new().with_allocation_limit(3);
        let batch = service.allocate_row_id_batch(1, 10).await.unwrap();
        assert_eq!(batch, RowIdBatch::new(0, 3));
        let batch = service.allocate_row_id_batch(1, 2).await.unwrap();
        assert_eq!(batch, RowIdBatch::new(3, 2));
    }

    #[tokio::test]
    async fn test_put_requires_open_index() {
        let service = LocalIndexService::new();
        let result = service
            .put_primary_index_entries(1, 2, vec![entry(0, "key-0")])
            .await;
        assert!(matches!(
            result,
            Err(IndexServiceError::IndexNotOpen {
                table_id: 1,
                index_id: 2
            })
        ));
    }

    #[tokio::test]
    async fn test_put_and_delete() {
        let service = LocalIndexService::new();
        service.open_index(1, 2, true).await.unwrap();
        service
            .put_primary_index_entries(1, 2, vec![entry(0, "key-0"), entry(1, "key-1")])
            .await
            .unwrap();
        assert_eq!(service.entry_count(1, 2).await, 2);
        assert_eq!(service.get(1, 2, b"key-1").await.map(|e| e.row_id), Some(1));

        // Deletes match on key regardless of timestamp.
        let mut key = entry(0, "key-0").index_key;
        key.timestamp = 99;
        service
            .delete_primary_index_entries(1, 2, vec![key])
            .await
            .unwrap();
        assert_eq!(service.entry_count(1, 2).await, 1);
        assert!(service.get(1, 2, b"key-0").await.is_none());

        service.close_index(1, 2, true).await.unwrap();
        assert!(!service.is_open(1, 2).await);
    }

    #[tokio::test]
    async fn test_delete_missing_key_deletes_nothing() {
        let service = LocalIndexService::new();
        service.open_index(1, 2, true).await.unwrap();
        service
            .put_primary_index_entries(1, 2, vec![entry(0, "key-0")])
            .await
            .unwrap();

        let keys = vec![entry(0, "key-0").index_key, entry(5, "key-5").index_key];
        let result = service.delete_primary_index_entries(1, 2, keys).await;

        assert!(matches!(result, Err(IndexServiceError::KeyNotFound(_))));
        assert_eq!(service.entry_count(1, 2).await, 1);
    }

    #[tokio::test]
    async fn test_put_rejects_foreign_key() {
        let service = LocalIndexService::new();
        service.open_index(7, 2, true).await.unwrap();
        let result = service
            .put_primary_index_entries(7, 2, vec![entry(0, "key-0")])
            .await;
        assert!(matches!(result, Err(IndexServiceError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_close_unopened_index() {
        let service = LocalIndexService::new();
        assert!(service.close_index(1, 2, true).await.is_err());
        assert!(service.open_index(1, 2, false).await.is_err());
    }
}
