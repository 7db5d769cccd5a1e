//! Crawl scheduling
//!
//! The [`Scheduler`] drives crawl cycles: it searches queued community domains
//! for every keyword not yet applied to them, explores the result links in
//! bounded parallel batches, merges what the classifier finds back into the
//! frontier, and re-expands searched domains once new keywords have appeared.

mod report;
mod scheduler;

pub use report::{CrawlOutcome, CrawlReport, CrawlStats};
pub use scheduler::{Scheduler, SchedulerState};
