//! Crawl scheduler state machine
//!
//! A run moves `Idle -> Running -> (Stopping) -> Idle`. Each cycle of a run:
//! 1. Domain phase: dequeue one domain and search it, serially, for every
//!    keyword not yet applied to it
//! 2. Exploration phase: drain pending result links in batches of
//!    `max-concurrency`, fetching each batch in parallel and merging the
//!    batch's classifications under one frontier lock
//! 3. Expansion check (only when phases 1 and 2 found no work): re-queue
//!    searched domains that have unapplied keywords, or end the run
//!
//! The loop also ends at the cycle ceiling or when a stop is requested.

use crate::classify::{Classification, ResultClassifier, TargetSiteRecord};
use crate::config::CrawlerConfig;
use crate::crawler::report::{CrawlOutcome, CrawlReport, CrawlStats};
use crate::fetch::{
    CrawlTask, ExtractedItem, FetchError, FetchOutcome, PageExtraction, PageFetcher,
    SearchResultLink,
};
use crate::state::{Frontier, FrontierGuard};
use crate::storage::TargetStore;
use crate::url::{leading_label, normalize_domain};
use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

/// Lifecycle state of a [`Scheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    /// A stop was requested; in-flight fetches are finishing
    Stopping,
}

/// Drives crawl runs over a fetch backend, a classifier and a target store
///
/// One run at a time per scheduler. All crawl state is created when a run
/// starts and handed back in the [`CrawlReport`] when it ends; only confirmed
/// target sites outlive a run, through the store.
pub struct Scheduler {
    config: CrawlerConfig,
    fetcher: Arc<dyn PageFetcher>,
    classifier: Arc<dyn ResultClassifier>,
    store: Arc<dyn TargetStore>,
    config_hash: String,
    running: AtomicBool,
    stop_requested: AtomicBool,
    wake: Notify,
}

/// Returns the scheduler to `Idle` however `start` exits
struct IdleOnDrop<'a>(&'a AtomicBool);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Scheduler {
    pub fn new(
        config: CrawlerConfig,
        fetcher: Arc<dyn PageFetcher>,
        classifier: Arc<dyn ResultClassifier>,
        store: Arc<dyn TargetStore>,
    ) -> Self {
        Self {
            config,
            fetcher,
            classifier,
            store,
            config_hash: String::new(),
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            wake: Notify::new(),
        }
    }

    /// Hash recorded with every run started by this scheduler
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn state(&self) -> SchedulerState {
        match (self.is_running(), self.stop_requested()) {
            (false, _) => SchedulerState::Idle,
            (true, false) => SchedulerState::Running,
            (true, true) => SchedulerState::Stopping,
        }
    }

    /// Requests cooperative termination of the active run
    ///
    /// In-flight fetches complete; nothing new is dispatched. No-op when idle.
    pub fn stop(&self) {
        if !self.is_running() {
            tracing::debug!("Stop requested while idle; ignoring");
            return;
        }
        if !self.stop_requested.swap(true, Ordering::AcqRel) {
            tracing::info!("Stop requested; finishing in-flight work");
        }
        self.wake.notify_waiters();
    }

    /// Runs a crawl to completion
    ///
    /// Returns `None` without doing anything when a run is already active.
    pub async fn start(&self) -> Option<CrawlReport> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!("Crawl already running; ignoring start request");
            return None;
        }
        let _idle = IdleOnDrop(&self.running);
        self.stop_requested.store(false, Ordering::Release);

        let run_id = match self.store.create_run(&self.config_hash) {
            Ok(id) => Some(id),
            Err(e) => {
                tracing::warn!("Failed to record crawl run: {}", e);
                None
            }
        };

        let guard = FrontierGuard::new(self.seed_frontier());
        let mut stats = CrawlStats::default();
        let start_time = std::time::Instant::now();

        tracing::info!(
            "Starting crawl run{} with {} seed domains",
            run_id.map(|id| format!(" {}", id)).unwrap_or_default(),
            self.config.seed_domains.len()
        );

        let outcome = match AssertUnwindSafe(self.run_cycles(&guard, &mut stats))
            .catch_unwind()
            .await
        {
            Ok(outcome) => outcome,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                tracing::error!("Crawl loop failed: {}", reason);
                CrawlOutcome::Failed(reason)
            }
        };

        let (frontier, pending) = guard.into_inner();

        if let Some(run_id) = run_id {
            if let Err(e) =
                self.store
                    .finish_run(run_id, outcome.run_status(), stats.sites_confirmed as u64)
            {
                tracing::warn!("Failed to finish crawl run {}: {}", run_id, e);
            }
        }

        tracing::info!(
            "Crawl {} after {} cycles in {:?}: {} searches, {} pages, {} sites confirmed, {} keywords",
            outcome,
            stats.cycles,
            start_time.elapsed(),
            stats.searches_dispatched,
            stats.pages_explored,
            stats.sites_confirmed,
            frontier.vocabulary.len()
        );

        Some(CrawlReport {
            run_id,
            outcome,
            stats,
            frontier,
            pending_results: pending.len(),
        })
    }

    fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    fn seed_frontier(&self) -> Frontier {
        let mut frontier =
            Frontier::seeded(&self.config.seed_domains, &self.config.seed_keywords);

        match self.store.load_normalized_identifiers() {
            Ok(identifiers) => {
                tracing::info!("Loaded {} confirmed target sites", identifiers.len());
                frontier.confirmed = identifiers.into_iter().collect();
            }
            Err(e) => {
                tracing::warn!(
                    "Failed to load confirmed target sites, starting empty: {}",
                    e
                );
            }
        }

        frontier
    }

    async fn run_cycles(&self, guard: &FrontierGuard, stats: &mut CrawlStats) -> CrawlOutcome {
        loop {
            if self.stop_requested() {
                return CrawlOutcome::Stopped;
            }
            if stats.cycles >= self.config.max_crawl_cycles {
                tracing::info!("Reached cycle limit of {}", self.config.max_crawl_cycles);
                return CrawlOutcome::CycleLimit;
            }
            stats.cycles += 1;

            let searched = self.domain_phase(guard, stats).await;
            if self.stop_requested() {
                return CrawlOutcome::Stopped;
            }

            let explored = self.exploration_phase(guard, stats).await;
            if self.stop_requested() {
                return CrawlOutcome::Stopped;
            }

            if searched || explored {
                continue;
            }

            let requeued = guard
                .frontier()
                .await
                .expand(self.config.max_domain_retries, self.config.domain_discovery_limit);
            if requeued.is_empty() {
                tracing::info!("No domain left to expand after {} cycles", stats.cycles);
                return CrawlOutcome::Exhausted;
            }

            tracing::info!("Re-expanding {} domains: {:?}", requeued.len(), requeued);
            stats.expansions += requeued.len();
        }
    }

    /// Searches one queued domain for each unapplied keyword
    ///
    /// Returns false when no domain was queued.
    async fn domain_phase(&self, guard: &FrontierGuard, stats: &mut CrawlStats) -> bool {
        let (domain, keywords) = {
            let mut frontier = guard.frontier().await;
            let Some(domain) = frontier.dequeue_domain() else {
                return false;
            };
            let keywords = frontier.pending_keywords_for(&domain);
            (domain, keywords)
        };

        tracing::info!(domain = %domain, keywords = keywords.len(), "Searching domain");

        for (index, keyword) in keywords.iter().enumerate() {
            if self.stop_requested() {
                break;
            }
            if index > 0 {
                self.pause(self.config.search_delay()).await;
                if self.stop_requested() {
                    break;
                }
            }

            guard.frontier().await.record_keyword_applied(&domain, keyword);
            stats.searches_dispatched += 1;
            tracing::debug!(domain = %domain, keyword = %keyword, "Dispatching search");

            match self
                .fetcher
                .execute(CrawlTask::search(domain.as_str(), keyword.as_str()))
                .await
            {
                Ok(FetchOutcome::SearchResults(links)) => {
                    let found = links.len();
                    let on_domain: Vec<SearchResultLink> = links
                        .into_iter()
                        .filter(|link| is_on_domain(&link.url, &domain))
                        .collect();
                    let queued = guard.enqueue_results(on_domain).await;
                    stats.results_queued += queued;
                    tracing::debug!(
                        domain = %domain,
                        keyword = %keyword,
                        "{} results, {} queued for exploration",
                        found,
                        queued
                    );
                }
                Ok(FetchOutcome::Page(page)) => {
                    if let Some(classification) = self.classify(&page, &page.url) {
                        let mut frontier = guard.frontier().await;
                        self.merge(&mut frontier, classification, stats);
                    }
                }
                Ok(FetchOutcome::Empty) => {}
                Err(e) => {
                    stats.failed_fetches += 1;
                    tracing::warn!(domain = %domain, keyword = %keyword, "Search failed: {}", e);
                }
            }
        }

        true
    }

    /// Explores pending result links batch by batch
    ///
    /// Returns false when the queue was empty from the start.
    async fn exploration_phase(&self, guard: &FrontierGuard, stats: &mut CrawlStats) -> bool {
        let batch_size = self.config.batch_size();
        let mut batches = 0usize;

        loop {
            if self.stop_requested() {
                break;
            }
            if batches > 0 && guard.pending_results().await > 0 {
                self.pause(self.config.batch_delay()).await;
                if self.stop_requested() {
                    break;
                }
            }

            let batch = guard.dequeue_result_batch(batch_size).await;
            if batch.is_empty() {
                break;
            }
            batches += 1;
            tracing::debug!("Exploring batch {} ({} links)", batches, batch.len());

            // Every entry runs to completion; one failure never cancels its siblings.
            let outcomes = join_all(batch.into_iter().map(|link| self.explore(link))).await;

            let mut frontier = guard.frontier().await;
            for outcome in outcomes {
                match outcome {
                    Ok(classification) => {
                        stats.pages_explored += 1;
                        if let Some(classification) = classification {
                            self.merge(&mut frontier, classification, stats);
                        }
                    }
                    Err(_) => stats.failed_fetches += 1,
                }
            }
        }

        batches > 0
    }

    /// Visits one result link and classifies what it yields
    async fn explore(&self, link: SearchResultLink) -> Result<Option<Classification>, FetchError> {
        match self
            .fetcher
            .execute(CrawlTask::visit(link.url.clone(), link.hint))
            .await
        {
            Ok(FetchOutcome::Page(page)) => Ok(self.classify(&page, &link.url)),
            Ok(FetchOutcome::SearchResults(links)) => {
                let page = PageExtraction {
                    url: link.url.clone(),
                    items: links
                        .into_iter()
                        .map(|l| ExtractedItem {
                            url: Some(l.url),
                            ..ExtractedItem::default()
                        })
                        .collect(),
                };
                Ok(self.classify(&page, &link.url))
            }
            Ok(FetchOutcome::Empty) => Ok(None),
            Err(e) => {
                tracing::warn!("Exploring {} failed: {}", link.url, e);
                Err(e)
            }
        }
    }

    /// Runs the classifier on one page, isolating a panicking policy to that page
    fn classify(&self, page: &PageExtraction, source_url: &str) -> Option<Classification> {
        match std::panic::catch_unwind(AssertUnwindSafe(|| {
            self.classifier.classify(page, source_url)
        })) {
            Ok(classification) => Some(classification),
            Err(panic) => {
                tracing::warn!(
                    "Classifier failed on {}: {}",
                    source_url,
                    panic_message(panic.as_ref())
                );
                None
            }
        }
    }

    /// Folds one page's classification into the frontier
    ///
    /// Must be called with the frontier lock held. New target sites are
    /// written through to the store; a site whose write fails stays
    /// unconfirmed and is retried on its next rediscovery.
    fn merge(&self, frontier: &mut Frontier, classification: Classification, stats: &mut CrawlStats) {
        let mut domains: Vec<String> = classification.new_community_domains.into_iter().collect();
        domains.sort();
        for domain in domains {
            if frontier.enqueue_domain(&domain) {
                stats.domains_discovered += 1;
                tracing::info!(domain = %domain, "Discovered community domain");
            }
        }

        for site in classification.new_target_sites {
            if frontier.is_confirmed(&site.normalized_identifier) {
                continue;
            }

            match self.store.upsert_target_site(&site) {
                Ok(outcome) => {
                    frontier.mark_confirmed(&site.normalized_identifier);
                    stats.sites_confirmed += 1;
                    if outcome.is_inserted() {
                        tracing::info!(
                            site_type = %site.site_type,
                            link_type = %site.link_type,
                            "Confirmed target site {}",
                            site.url
                        );
                    } else {
                        tracing::debug!("Target site {} was already stored", site.url);
                    }

                    for keyword in keywords_from_site(&site) {
                        if frontier.add_keyword(&keyword) {
                            stats.keywords_discovered += 1;
                        }
                    }
                }
                Err(e) => {
                    stats.persist_failures += 1;
                    tracing::warn!("Failed to persist target site {}: {}", site.url, e);
                }
            }
        }

        let mut keywords: Vec<String> = classification.new_keywords.into_iter().collect();
        keywords.sort();
        for keyword in keywords {
            if frontier.add_keyword(&keyword) {
                stats.keywords_discovered += 1;
            }
        }
    }

    /// Waits for `delay`, returning early when a stop is requested
    async fn pause(&self, delay: Duration) {
        if delay.is_zero() {
            return;
        }

        // Register for the wake-up before checking the flag; `notify_waiters` stores no permit.
        let woken = self.wake.notified();
        tokio::pin!(woken);
        woken.as_mut().enable();
        if self.stop_requested() {
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = woken => {}
        }
    }
}

/// Whether `url` lives on `domain` or one of its subdomains
fn is_on_domain(url: &str, domain: &str) -> bool {
    let host = normalize_domain(url);
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

/// Search terms a newly confirmed site contributes: its display name, when it
/// differs from its domain, and the leading label of its domain
///
/// Chat invites live on the chat platform's domain, so they only contribute a name.
fn keywords_from_site(site: &TargetSiteRecord) -> Vec<String> {
    let domain = normalize_domain(&site.url);
    let mut keywords = Vec::new();

    if let Some(name) = site
        .site_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    {
        if !name.eq_ignore_ascii_case(&domain) {
            keywords.push(name.to_string());
        }
    }

    if !site.link_type.is_chat_invite() {
        if let Some(label) = leading_label(&domain) {
            keywords.push(label.to_string());
        }
    }

    keywords
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
