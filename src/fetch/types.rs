use crate::classify::LinkType;
use crate::url::parse_lenient;
use std::fmt;
use thiserror::Error;

/// Extraction policy a fetched page is processed with
///
/// The set is closed: anything unrecognised is handled as [`ExtractionHint::Generic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtractionHint {
    SearchResultPage,
    CommunitySite,
    SnsX,
    SnsYoutube,
    #[default]
    Generic,
}

impl ExtractionHint {
    /// Parses a hint name; unknown names fall back to `Generic`
    pub fn parse(name: &str) -> Self {
        match name.trim() {
            "search-result-page" | "search" => Self::SearchResultPage,
            "community-site" => Self::CommunitySite,
            "sns-x" => Self::SnsX,
            "sns-youtube" => Self::SnsYoutube,
            _ => Self::Generic,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SearchResultPage => "search-result-page",
            Self::CommunitySite => "community-site",
            Self::SnsX => "sns-x",
            Self::SnsYoutube => "sns-youtube",
            Self::Generic => "generic",
        }
    }

    /// Picks the hint a discovered link should be explored with
    pub fn for_url(link: &str) -> Self {
        let Some(url) = parse_lenient(link) else {
            return Self::Generic;
        };
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let host = host.strip_prefix("www.").unwrap_or(&host);
        let path = url.path();

        if host == "x.com" || host == "twitter.com" || host.ends_with(".x.com") {
            Self::SnsX
        } else if host == "youtu.be" || host == "youtube.com" || host.ends_with(".youtube.com") {
            Self::SnsYoutube
        } else if path.contains("/board/") || path.contains("/bbs/") {
            Self::CommunitySite
        } else {
            Self::Generic
        }
    }
}

impl fmt::Display for ExtractionHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One unit of work for the page fetch port
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CrawlTask {
    /// Keyword search restricted to a community domain
    Search { domain: String, keyword: String },

    /// Direct visit of a discovered link
    Visit { url: String, hint: ExtractionHint },
}

impl CrawlTask {
    pub fn search(domain: impl Into<String>, keyword: impl Into<String>) -> Self {
        Self::Search {
            domain: domain.into(),
            keyword: keyword.into(),
        }
    }

    pub fn visit(url: impl Into<String>, hint: ExtractionHint) -> Self {
        Self::Visit {
            url: url.into(),
            hint,
        }
    }

    pub fn hint(&self) -> ExtractionHint {
        match self {
            Self::Search { .. } => ExtractionHint::SearchResultPage,
            Self::Visit { hint, .. } => *hint,
        }
    }
}

impl fmt::Display for CrawlTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Search { domain, keyword } => write!(f, "search site:{} \"{}\"", domain, keyword),
            Self::Visit { url, hint } => write!(f, "visit {} ({})", url, hint),
        }
    }
}

/// A link found on a search result page, waiting to be explored
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchResultLink {
    pub url: String,
    pub hint: ExtractionHint,
}

impl SearchResultLink {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let hint = ExtractionHint::for_url(&url);
        Self { url, hint }
    }
}

/// One piece of content extracted from a visited page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedItem {
    pub url: Option<String>,
    pub description: String,
    pub title: Option<String>,
    pub link_type: Option<LinkType>,
}

/// Structured result of visiting one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageExtraction {
    pub url: String,
    pub items: Vec<ExtractedItem>,
}

/// Successful result of a crawl task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    SearchResults(Vec<SearchResultLink>),
    Page(PageExtraction),
    /// The task ran but produced nothing usable
    Empty,
}

/// Errors a fetch backend may report for a single task
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Invalid task target: {0}")]
    InvalidTarget(String),

    #[error("Fetch backend unavailable: {0}")]
    Unavailable(String),
}

impl FetchError {
    /// Whether retrying the same task may succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout { .. } => true,
            Self::Http { source, .. } => source.is_timeout() || source.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidTarget(_) | Self::Unavailable(_) => false,
        }
    }
}
