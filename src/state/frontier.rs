use crate::url::normalize_domain;
use indexmap::{IndexMap, IndexSet};
use std::collections::{HashMap, HashSet, VecDeque};

/// Shortest keyword worth searching for
pub const MIN_KEYWORD_CHARS: usize = 2;

/// FIFO of community domains awaiting keyword search
///
/// A domain is in the membership set iff it is currently queued.
#[derive(Debug, Clone, Default)]
pub struct DomainFrontier {
    queue: VecDeque<String>,
    queued: HashSet<String>,
}

impl DomainFrontier {
    /// Appends `domain` unless it is already queued
    pub fn push(&mut self, domain: String) -> bool {
        if !self.queued.insert(domain.clone()) {
            return false;
        }
        self.queue.push_back(domain);
        true
    }

    pub fn pop(&mut self) -> Option<String> {
        let domain = self.queue.pop_front()?;
        self.queued.remove(&domain);
        Some(domain)
    }

    pub fn contains(&self, domain: &str) -> bool {
        self.queued.contains(domain)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.queue.iter().map(String::as_str)
    }
}

/// Growing set of search terms, iterated in insertion order
#[derive(Debug, Clone, Default)]
pub struct KeywordVocabulary {
    keywords: IndexSet<String>,
}

impl KeywordVocabulary {
    /// Adds a trimmed keyword; returns false when it is too short or already known
    pub fn insert(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        if keyword.chars().count() < MIN_KEYWORD_CHARS {
            return false;
        }
        self.keywords.insert(keyword.to_string())
    }

    /// Adds a configured seed keyword; only blanks are rejected
    pub fn insert_seed(&mut self, keyword: &str) -> bool {
        let keyword = keyword.trim();
        !keyword.is_empty() && self.keywords.insert(keyword.to_string())
    }

    pub fn contains(&self, keyword: &str) -> bool {
        self.keywords.contains(keyword.trim())
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}

/// Keywords already searched against each domain
#[derive(Debug, Clone, Default)]
pub struct DomainKeywordHistory {
    applied: IndexMap<String, IndexSet<String>>,
}

impl DomainKeywordHistory {
    pub fn record(&mut self, domain: &str, keyword: &str) -> bool {
        self.applied
            .entry(domain.to_string())
            .or_default()
            .insert(keyword.to_string())
    }

    pub fn has_history(&self, domain: &str) -> bool {
        self.applied.contains_key(domain)
    }

    pub fn applied(&self, domain: &str) -> Option<&IndexSet<String>> {
        self.applied.get(domain)
    }

    pub fn is_applied(&self, domain: &str, keyword: &str) -> bool {
        self.applied
            .get(domain)
            .is_some_and(|keywords| keywords.contains(keyword))
    }

    /// Domains in the order they were first searched
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.applied.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.applied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Restart bookkeeping for one domain
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DomainRetryMetadata {
    pub retry_count: u32,
    pub keyword_count_at_last_expansion: usize,
}

impl DomainRetryMetadata {
    /// Whether the domain may still be re-expanded under the given ceilings
    pub fn can_expand(&self, max_retries: u32, discovery_limit: usize) -> bool {
        self.retry_count <= max_retries && self.keyword_count_at_last_expansion <= discovery_limit
    }
}

/// Normalized identifiers of target sites already persisted
#[derive(Debug, Clone, Default)]
pub struct ConfirmedTargetSites {
    identifiers: HashSet<String>,
}

impl ConfirmedTargetSites {
    pub fn insert(&mut self, identifier: &str) -> bool {
        self.identifiers.insert(identifier.to_string())
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.identifiers.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.identifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.identifiers.is_empty()
    }
}

impl FromIterator<String> for ConfirmedTargetSites {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            identifiers: iter.into_iter().collect(),
        }
    }
}

/// All crawl state of one run except the pending result queue
///
/// Pure data: no I/O and no locking. Concurrent access goes through
/// [`FrontierGuard`](crate::state::FrontierGuard).
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    pub domains: DomainFrontier,
    pub vocabulary: KeywordVocabulary,
    pub history: DomainKeywordHistory,
    pub retries: HashMap<String, DomainRetryMetadata>,
    pub confirmed: ConfirmedTargetSites,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a frontier from seed domains and keywords
    ///
    /// Seeds are normalized and deduplicated; blanks are dropped. Seed keywords
    /// bypass the minimum length applied to discovered keywords.
    pub fn seeded<D, K>(domains: D, keywords: K) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        K: IntoIterator,
        K::Item: AsRef<str>,
    {
        let mut frontier = Self::new();
        for domain in domains {
            frontier.enqueue_domain(domain.as_ref());
        }
        for keyword in keywords {
            frontier.vocabulary.insert_seed(keyword.as_ref());
        }
        frontier
    }

    /// Queues a domain for search
    ///
    /// No-op when the domain is already queued or has already been searched.
    /// Returns true if the domain was appended.
    pub fn enqueue_domain(&mut self, domain: &str) -> bool {
        let domain = normalize_domain(domain);
        if domain.is_empty() || self.history.has_history(&domain) {
            return false;
        }
        self.domains.push(domain)
    }

    /// Takes the next domain to search
    ///
    /// A domain taken for the first time starts its retry metadata at the
    /// current vocabulary size.
    pub fn dequeue_domain(&mut self) -> Option<String> {
        let domain = self.domains.pop()?;
        self.start_retry_metadata(&domain);
        Some(domain)
    }

    pub fn is_queued(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    pub fn record_keyword_applied(&mut self, domain: &str, keyword: &str) -> bool {
        self.start_retry_metadata(domain);
        self.history.record(domain, keyword)
    }

    fn start_retry_metadata(&mut self, domain: &str) {
        let keyword_count = self.vocabulary.len();
        self.retries
            .entry(domain.to_string())
            .or_insert(DomainRetryMetadata {
                retry_count: 0,
                keyword_count_at_last_expansion: keyword_count,
            });
    }

    /// Vocabulary minus the keywords already applied to `domain`, in vocabulary order
    pub fn pending_keywords_for(&self, domain: &str) -> Vec<String> {
        self.vocabulary
            .iter()
            .filter(|keyword| !self.history.is_applied(domain, keyword))
            .map(str::to_string)
            .collect()
    }

    pub fn add_keyword(&mut self, keyword: &str) -> bool {
        self.vocabulary.insert(keyword)
    }

    /// Returns true if `identifier` was not confirmed before
    pub fn mark_confirmed(&mut self, identifier: &str) -> bool {
        self.confirmed.insert(identifier)
    }

    pub fn is_confirmed(&self, identifier: &str) -> bool {
        self.confirmed.contains(identifier)
    }

    /// Re-queues searched domains for which new keywords have appeared
    ///
    /// A domain is re-queued when it has unapplied keywords, is not already
    /// queued and its retry metadata is within both ceilings. Each re-queue
    /// bumps the retry count and adds the number of new keywords to the
    /// keyword count. Returns the re-queued domains in first-searched order.
    pub fn expand(&mut self, max_retries: u32, discovery_limit: usize) -> Vec<String> {
        let candidates: Vec<(String, usize)> = self
            .history
            .domains()
            .filter(|domain| !self.domains.contains(domain))
            .filter_map(|domain| {
                let new_keywords = self
                    .vocabulary
                    .iter()
                    .filter(|keyword| !self.history.is_applied(domain, keyword))
                    .count();
                (new_keywords > 0).then(|| (domain.to_string(), new_keywords))
            })
            .collect();

        let mut requeued = Vec::new();
        for (domain, new_keywords) in candidates {
            let meta = self.retries.entry(domain.clone()).or_default();
            if !meta.can_expand(max_retries, discovery_limit) {
                continue;
            }
            meta.retry_count += 1;
            meta.keyword_count_at_last_expansion += new_keywords;

            if self.domains.push(domain.clone()) {
                requeued.push(domain);
            }
        }
        requeued
    }

    pub fn retry_metadata(&self, domain: &str) -> DomainRetryMetadata {
        self.retries.get(domain).copied().unwrap_or_default()
    }
}
