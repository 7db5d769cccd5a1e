use crate::fetch::SearchResultLink;
use std::collections::{HashSet, VecDeque};

/// Links found by searches, awaiting exploration
///
/// Each URL is accepted once per run and leaves the queue exactly once.
#[derive(Debug, Clone, Default)]
pub struct PendingResultQueue {
    queue: VecDeque<SearchResultLink>,
    seen: HashSet<String>,
}

impl PendingResultQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the URL was already queued during this run
    pub fn enqueue_result(&mut self, link: SearchResultLink) -> bool {
        if !self.seen.insert(link.url.clone()) {
            return false;
        }
        self.queue.push_back(link);
        true
    }

    /// Removes and returns up to `n` entries from the head
    pub fn dequeue_batch(&mut self, n: usize) -> Vec<SearchResultLink> {
        let take = n.min(self.queue.len());
        self.queue.drain(..take).collect()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dequeue_batch_sizes() {
        let mut queue = PendingResultQueue::new();
        for i in 0..7 {
            queue.enqueue_result(SearchResultLink::new(format!("https://a.test/{}", i)));
        }

        let sizes: Vec<usize> = std::iter::from_fn(|| {
            let batch = queue.dequeue_batch(3);
            (!batch.is_empty()).then_some(batch.len())
        })
        .collect();
        assert_eq!(sizes, vec![3, 3, 1]);
    }

    #[test]
    fn test_duplicate_urls_queued_once() {
        let mut queue = PendingResultQueue::new();
        assert!(queue.enqueue_result(SearchResultLink::new("https://a.test/1")));
        assert!(!queue.enqueue_result(SearchResultLink::new("https://a.test/1")));
        assert_eq!(queue.len(), 1);

        queue.dequeue_batch(5);
        assert!(!queue.enqueue_result(SearchResultLink::new("https://a.test/1")));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_dequeue_batch_zero_and_empty() {
        let mut queue = PendingResultQueue::new();
        assert!(queue.dequeue_batch(3).is_empty());
        queue.enqueue_result(SearchResultLink::new("https://a.test/1"));
        assert!(queue.dequeue_batch(0).is_empty());
        assert_eq!(queue.len(), 1);
    }
}
