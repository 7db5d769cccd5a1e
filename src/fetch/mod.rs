//! Page fetch port
//!
//! The scheduler hands [`CrawlTask`]s to a [`PageFetcher`] and gets back either
//! search result links or a structured page extraction. Rendering, navigation,
//! timeouts and retries are the backend's concern. [`HttpPageFetcher`] is a
//! plain-HTTP backend built on `reqwest` and `scraper`.

mod http;
mod port;
mod strategy;
mod types;

pub use http::HttpPageFetcher;
pub use port::PageFetcher;
pub use strategy::{
    CommunitySiteStrategy, ExtractionStrategy, GenericStrategy, SearchResultStrategy,
    SocialMediaStrategy,
};
pub use types::{
    CrawlTask, ExtractedItem, ExtractionHint, FetchError, FetchOutcome, PageExtraction,
    SearchResultLink,
};
