//! In-process transaction service for local runs and tests.

use crate::error::TransServiceError;
use crate::service::TransService;
use crate::types::TransContext;
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// Transaction service keeping its state in memory.
///
/// Ids are handed out from 1 upwards and every begin takes a fresh
/// timestamp. A commit succeeds for transactions that are still active and
/// fails for unknown, already committed or aborted ones.
#[derive(Debug)]
pub struct LocalTransService {
    next_trans_id: AtomicI64,
    next_timestamp: AtomicU64,
    active: Mutex<HashSet<i64>>,
    begin_limit: Option<u32>,
}

impl Default for LocalTransService {
    fn default() -> Self {
        Self {
            next_trans_id: AtomicI64::new(1),
            next_timestamp: AtomicU64::new(1),
            active: Mutex::new(HashSet::new()),
            begin_limit: None,
        }
    }
}

impl LocalTransService {
    /// Create an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin at most `limit` transactions per call.
    pub fn with_begin_limit(mut self, limit: u32) -> Self {
        self.begin_limit = Some(limit);
        self
    }

    /// Number of transactions begun and not yet committed or aborted.
    pub async fn active_count(&self) -> usize {
        self.active.lock().await.len()
    }

    /// Abort an active transaction. Returns whether it was active.
    pub async fn abort(&self, trans_id: i64) -> bool {
        self.active.lock().await.remove(&trans_id)
    }
}

#[async_trait]
impl TransService for LocalTransService {
    async fn begin_trans_batch(
        &self,
        count: u32,
        read_only: bool,
    ) -> Result<Vec<TransContext>, TransServiceError> {
        if count == 0 {
            return Err(TransServiceError::InvalidRequest(
                "cannot begin an empty batch".to_string(),
            ));
        }
        let count = self.begin_limit.map_or(count, |limit| count.min(limit));

        let first = self
            .next_trans_id
            .fetch_add(i64::from(count), Ordering::SeqCst);
        let contexts: Vec<TransContext> = (0..i64::from(count))
            .map(|k| TransContext {
                trans_id: first + k,
                timestamp: self.next_timestamp.fetch_add(1, Ordering::SeqCst),
                read_only,
            })
            .collect();

        self.active
            .lock()
            .await
            .extend(contexts.iter().map(|c| c.trans_id));
        debug!("Began {} transactions starting at {}", count, first);
        Ok(contexts)
    }

    async fn commit_trans_batch(
        &self,
        trans_ids: Vec<i64>,
        _read_only: bool,
    ) -> Result<Vec<bool>, TransServiceError> {
        let mut active = self.active.lock().await;
        Ok(trans_ids.iter().map(|id| active.remove(id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_begin_assigns_unique_ids() {
        let service = LocalTransService::new();
        let first = service.begin_trans_batch(3, false).await.unwrap();
        let second = service.begin_trans_batch(2, true).await.unwrap();

        let ids: Vec<i64> = first.iter().chain(&second).map(|c| c.trans_id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert!(second.iter().all(|c| c.read_only));
        assert!(first.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
        assert_eq!(service.active_count().await, 5);
    }

    #[tokio::test]
    async fn test_commit_reports_each_transaction() {
        let service = LocalTransService::new();
        let contexts = service.begin_trans_batch(3, false).await.unwrap();
        assert!(service.abort(contexts[1].trans_id).await);

        let ids = contexts.iter().map(|c| c.trans_id).collect();
        let committed = service.commit_trans_batch(ids, false).await.unwrap();
        assert_eq!(committed, vec![true, false, true]);
        assert_eq!(service.active_count().await, 0);

        // Committing twice fails the second time.
        let again = service.commit_trans_batch(vec![1], false).await.unwrap();
        assert_eq!(again, vec![false]);
    }

    #[tokio::test]
    async fn test_begin_limit() {
        let service = LocalTransService::new().with_begin_limit(2);
        let contexts = service.begin_trans_batch(5, false).await.unwrap();
        assert_eq!(contexts.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_begin_rejected() {
        let service = LocalTransService::new();
        assert!(matches!(
            service.begin_trans_batch(0, false).await,
            Err(TransServiceError::InvalidRequest(_))
        ));
    }
}
