//! Worker orchestration: spawn one task per logical worker, join with a deadline.

use crate::error::BenchError;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Upper bound on how long a phase may wait for its workers.
pub const DEFAULT_JOIN_TIMEOUT: Duration = Duration::from_secs(10 * 60 * 60);

/// Deadline offset used when the requested timeout overflows an instant.
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// A fixed group of worker tasks running on the multi-threaded runtime.
///
/// Each spawned future is one logical worker. Workers are independent: a
/// worker that panics is logged and dropped from the results, the others
/// keep running.
pub struct TaskGroup<T> {
    tasks: JoinSet<(usize, T)>,
    spawned: usize,
}

impl<T: Send + 'static> TaskGroup<T> {
    /// Create an empty group.
    pub fn new() -> Self {
        Self {
            tasks: JoinSet::new(),
            spawned: 0,
        }
    }

    /// Spawn a worker. Workers are numbered in spawn order starting at 0.
    pub fn spawn<F>(&mut self, worker: F)
    where
        F: Future<Output = T> + Send + 'static,
    {
        let index = self.spawned;
        self.spawned += 1;
        self.tasks.spawn(async move { (index, worker.await) });
    }

    /// Wait for every worker to finish, at most `timeout`.
    ///
    /// Results are returned in spawn order. When the deadline passes, the
    /// remaining workers are aborted and [`BenchError::Timeout`] is returned.
    /// A timeout too large to add to the current instant never expires.
    pub async fn join_all(mut self, timeout: Duration) -> Result<Vec<T>, BenchError> {
        let now = tokio::time::Instant::now();
        let deadline = now
            .checked_add(timeout)
            .unwrap_or_else(|| now + FAR_FUTURE);
        let mut results = Vec::with_capacity(self.spawned);

        loop {
            match tokio::time::timeout_at(deadline, self.tasks.join_next()).await {
                Ok(Some(Ok((index, value)))) => {
                    debug!("Worker {} finished", index);
                    results.push((index, value));
                }
                Ok(Some(Err(e))) => {
                    error!("Worker task failed: {}", e);
                }
                Ok(None) => break,
                Err(_) => {
                    error!(
                        "{} of {} workers still running after {:?}, aborting them",
                        self.tasks.len(),
                        self.spawned,
                        timeout
                    );
                    self.tasks.abort_all();
                    return Err(BenchError::Timeout(timeout));
                }
            }
        }

        results.sort_by_key(|(index, _)| *index);
        Ok(results.into_iter().map(|(_, value)| value).collect())
    }
}

impl<T: Send + 'static> Default for TaskGroup<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_join_all_returns_spawn_order() {
        let mut group = TaskGroup::new();
        for worker in 0..8u64 {
            group.spawn(async move {
                // Later workers finish first.
                tokio::time::sleep(Duration::from_millis(40 - worker * 5)).await;
                worker
            });
        }

        let results = group.join_all(Duration::from_secs(5)).await.unwrap();
        assert_eq!(results, (0..8).collect::<Vec<_>>());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_join_all_timeout() {
        let mut group = TaskGroup::new();
        group.spawn(async { 1 });
        group.spawn(async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            2
        });

        let result = group.join_all(Duration::from_millis(50)).await;
        assert!(matches!(result, Err(BenchError::Timeout(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicked_worker_does_not_cancel_siblings() {
        let mut group = TaskGroup::new();
        group.spawn(async { 0 });
        group.spawn(async {
            let fail = true;
            if fail {
                panic!("worker blew up");
            }
            1
        });
        group.spawn(async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            2
        });

        let results = group.join_all(Duration::from_secs(5)).await.unwrap();
        assert_eq!(results, vec![0, 2]);
    }

    #[tokio::test]
    async fn test_empty_group() {
        let group: TaskGroup<()> = TaskGroup::default();
        assert!(group.join_all(Duration::from_secs(1)).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unbounded_timeout_does_not_overflow() {
        let mut group = TaskGroup::new();
        group.spawn(async { 7 });
        group.spawn(async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            8
        });

        let results = group.join_all(Duration::MAX).await.unwrap();
        assert_eq!(results, vec![7, 8]);
    }

    #[tokio::test]
    async fn test_largest_parsed_timeout_joins() {
        let timeout = crate::parse_duration("18446744073709551615s").unwrap();
        let mut group = TaskGroup::new();
        group.spawn(async { "done" });

        assert_eq!(group.join_all(timeout).await.unwrap(), vec!["done"]);
    }
}
