use crate::fetch::SearchResultLink;
use crate::state::frontier::Frontier;
use crate::state::results::PendingResultQueue;
use tokio::sync::{Mutex, MutexGuard};

/// The two guarded regions of a crawl run
///
/// One lock covers draining and filling the pending result queue, the other
/// covers frontier merges. Both are `tokio` mutexes, which wake waiters in FIFO
/// order. Neither may be held across a fetch dispatch.
#[derive(Debug, Default)]
pub struct FrontierGuard {
    frontier: Mutex<Frontier>,
    results: Mutex<PendingResultQueue>,
}

impl FrontierGuard {
    pub fn new(frontier: Frontier) -> Self {
        Self {
            frontier: Mutex::new(frontier),
            results: Mutex::new(PendingResultQueue::new()),
        }
    }

    /// Enters the frontier merge region
    pub async fn frontier(&self) -> MutexGuard<'_, Frontier> {
        self.frontier.lock().await
    }

    /// Queues result links; returns how many were new
    pub async fn enqueue_results<I>(&self, links: I) -> usize
    where
        I: IntoIterator<Item = SearchResultLink>,
    {
        let mut results = self.results.lock().await;
        links
            .into_iter()
            .filter(|link| results.enqueue_result(link.clone()))
            .count()
    }

    /// Atomically takes up to `n` pending results
    pub async fn dequeue_result_batch(&self, n: usize) -> Vec<SearchResultLink> {
        self.results.lock().await.dequeue_batch(n)
    }

    pub async fn pending_results(&self) -> usize {
        self.results.lock().await.len()
    }

    /// Copy of the current frontier state
    pub async fn snapshot(&self) -> Frontier {
        self.frontier.lock().await.clone()
    }

    pub fn into_inner(self) -> (Frontier, PendingResultQueue) {
        (self.frontier.into_inner(), self.results.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_drain_is_exact() {
        let guard = Arc::new(FrontierGuard::default());
        let links: Vec<SearchResultLink> = (0..7)
            .map(|i| SearchResultLink::new(format!("https://a.test/post/{}", i)))
            .collect();
        assert_eq!(guard.enqueue_results(links).await, 7);

        let drainers: Vec<_> = (0..4)
            .map(|_| {
                let guard = Arc::clone(&guard);
                tokio::spawn(async move {
                    let mut batches = Vec::new();
                    loop {
                        let batch = guard.dequeue_result_batch(3).await;
                        if batch.is_empty() {
                            break;
                        }
                        batches.push(batch);
                        tokio::task::yield_now().await;
                    }
                    batches
                })
            })
            .collect();

        let mut batches = Vec::new();
        for drainer in drainers {
            batches.extend(drainer.await.unwrap());
        }

        let mut sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sizes, vec![3, 3, 1]);

        let urls: Vec<&str> = batches.iter().flatten().map(|l| l.url.as_str()).collect();
        let unique: HashSet<&str> = urls.iter().copied().collect();
        assert_eq!(urls.len(), 7);
        assert_eq!(unique.len(), 7);
    }

    #[tokio::test]
    async fn test_frontier_region_mutation_visible_in_snapshot() {
        let guard = FrontierGuard::new(Frontier::seeded(["a.test"], ["x"]));
        guard.frontier().await.mark_confirmed("casino.test");

        let snapshot = guard.snapshot().await;
        assert!(snapshot.is_confirmed("casino.test"));
        assert_eq!(snapshot.domains.len(), 1);
    }
}
