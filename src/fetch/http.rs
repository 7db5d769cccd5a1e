//! Plain-HTTP fetch backend
//!
//! Executes search tasks against a configurable search endpoint and visits
//! discovered links with a single GET. Pages are parsed with `scraper` and run
//! through the extraction strategy their hint selects. No JavaScript is
//! executed, so script-rendered pages only yield whatever their static markup
//! carries.

use crate::config::FetchConfig;
use crate::fetch::port::PageFetcher;
use crate::fetch::strategy::SearchResultStrategy;
use crate::fetch::types::{
    CrawlTask, ExtractionHint, FetchError, FetchOutcome, PageExtraction, SearchResultLink,
};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use url::Url;

/// Fetch backend over `reqwest`
///
/// At most `max_concurrency` requests are in flight at once, whoever calls
/// [`PageFetcher::execute`].
pub struct HttpPageFetcher {
    client: Client,
    semaphore: Arc<Semaphore>,
    search_url: String,
    retry_limit: u32,
    retry_delay: Duration,
}

/// Body of a successfully fetched HTML page
struct FetchedPage {
    final_url: Url,
    body: String,
}

impl HttpPageFetcher {
    /// Builds the backend and its HTTP client
    pub fn new(config: &FetchConfig, max_concurrency: usize) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.timeout_ms))
            .connect_timeout(Duration::from_millis(config.timeout_ms.min(10_000)))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
            search_url: config.search_url.clone(),
            retry_limit: config.retry_limit,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        })
    }

    /// Builds the search URL for `site:{domain} "{keyword}"`
    pub fn search_url_for(&self, domain: &str, keyword: &str) -> Result<Url, FetchError> {
        let query = format!("site:{} \"{}\"", domain, keyword);
        let encoded: String = url::form_urlencoded::byte_serialize(query.as_bytes()).collect();
        let raw = self.search_url.replace("{query}", &encoded);

        Url::parse(&raw).map_err(|e| FetchError::InvalidTarget(format!("{}: {}", raw, e)))
    }

    async fn search(&self, domain: &str, keyword: &str) -> Result<FetchOutcome, FetchError> {
        let url = self.search_url_for(domain, keyword)?;

        match self.fetch_html(&url).await? {
            Some(page) => {
                let links = parse_search_results(&page.body, &page.final_url);
                tracing::debug!(
                    "Search site:{} \"{}\" returned {} links",
                    domain,
                    keyword,
                    links.len()
                );
                Ok(FetchOutcome::SearchResults(links))
            }
            None => Ok(FetchOutcome::Empty),
        }
    }

    async fn visit(&self, url: &str, hint: ExtractionHint) -> Result<FetchOutcome, FetchError> {
        let url = Url::parse(url).map_err(|e| FetchError::InvalidTarget(format!("{}: {}", url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidTarget(url.to_string()));
        }

        match self.fetch_html(&url).await? {
            Some(page) => {
                let extraction = parse_page(&page.body, &page.final_url, hint);
                tracing::debug!(
                    "Extracted {} items from {} ({})",
                    extraction.items.len(),
                    url,
                    hint
                );
                Ok(FetchOutcome::Page(extraction))
            }
            None => Ok(FetchOutcome::Empty),
        }
    }

    /// GETs an HTML page, retrying transient failures
    ///
    /// Returns `Ok(None)` when the response is not HTML.
    async fn fetch_html(&self, url: &Url) -> Result<Option<FetchedPage>, FetchError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| FetchError::Unavailable("fetch pool closed".to_string()))?;

        let mut attempt = 0;
        loop {
            match self.fetch_once(url).await {
                Err(e) if e.is_transient() && attempt < self.retry_limit => {
                    attempt += 1;
                    tracing::debug!(
                        "Retrying {} after transient error (attempt {}/{}): {}",
                        url,
                        attempt,
                        self.retry_limit,
                        e
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                result => return result,
            }
        }
    }

    async fn fetch_once(&self, url: &Url) -> Result<Option<FetchedPage>, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();

        if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
            tracing::debug!("Skipping {} (content type '{}')", url, content_type);
            return Ok(None);
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        Ok(Some(FetchedPage { final_url, body }))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn execute(&self, task: CrawlTask) -> Result<FetchOutcome, FetchError> {
        match task {
            CrawlTask::Search { domain, keyword } => self.search(&domain, &keyword).await,
            CrawlTask::Visit { url, hint } => self.visit(&url, hint).await,
        }
    }
}

fn classify_request_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

// `Html` is not `Send`; parsing stays in sync helpers so it never lives across an await.

fn parse_search_results(body: &str, page_url: &Url) -> Vec<SearchResultLink> {
    let document = Html::parse_document(body);
    SearchResultStrategy.extract_links(&document, page_url)
}

fn parse_page(body: &str, page_url: &Url, hint: ExtractionHint) -> PageExtraction {
    let document = Html::parse_document(body);
    hint.strategy().extract(&document, page_url)
}
