use crate::fetch::types::{CrawlTask, FetchError, FetchOutcome};
use async_trait::async_trait;

/// Executes crawl tasks on behalf of the scheduler
///
/// Implementations bound their own parallelism and own timeouts and retries.
/// An `Err` is a failed unit of work; the caller treats it as "no data".
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn execute(&self, task: CrawlTask) -> Result<FetchOutcome, FetchError>;
}
