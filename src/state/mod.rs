//! Crawl state for one run
//!
//! - `Frontier`: queued domains, keyword vocabulary, per-domain keyword
//!   history, retry bookkeeping and confirmed target sites
//! - `PendingResultQueue`: search result links awaiting exploration
//! - `FrontierGuard`: the locks concurrent batch workers go through

mod frontier;
mod guard;
mod results;

pub use frontier::{
    ConfirmedTargetSites, DomainFrontier, DomainKeywordHistory, DomainRetryMetadata, Frontier,
    KeywordVocabulary, MIN_KEYWORD_CHARS,
};
pub use guard::FrontierGuard;
pub use results::PendingResultQueue;
