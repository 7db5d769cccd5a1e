//! Result classification
//!
//! Turns one page's extracted items into frontier contributions: community
//! domains to search, target sites to persist, and keywords to search for.
//! The scheduler only depends on [`ResultClassifier`]; [`KeywordClassifier`]
//! is the configurable keyword-list policy shipped with the crate.

mod keyword;
mod types;

pub use keyword::{extract_keywords, KeywordClassifier};
pub use types::{Classification, LinkType, SiteType, TargetSiteRecord};

use crate::fetch::PageExtraction;

/// Policy mapping extracted page content to frontier contributions
///
/// Implementations must be deterministic and must not fail: malformed items
/// simply contribute nothing.
pub trait ResultClassifier: Send + Sync {
    fn classify(&self, page: &PageExtraction, source_url: &str) -> Classification;
}
