use crate::state::Frontier;
use crate::storage::RunStatus;
use std::fmt;

/// How a crawl run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlOutcome {
    /// No pending work and no domain eligible for expansion
    Exhausted,

    /// The configured cycle ceiling was reached
    CycleLimit,

    /// A stop was requested
    Stopped,

    /// The cycle loop itself broke; the message describes why
    Failed(String),
}

impl CrawlOutcome {
    pub fn run_status(&self) -> RunStatus {
        match self {
            Self::Exhausted | Self::CycleLimit => RunStatus::Completed,
            Self::Stopped => RunStatus::Stopped,
            Self::Failed(_) => RunStatus::Failed,
        }
    }
}

impl fmt::Display for CrawlOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exhausted => f.write_str("frontier exhausted"),
            Self::CycleLimit => f.write_str("cycle limit reached"),
            Self::Stopped => f.write_str("stopped"),
            Self::Failed(reason) => write!(f, "failed: {}", reason),
        }
    }
}

/// Counters collected over one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub cycles: u32,
    pub searches_dispatched: usize,
    pub pages_explored: usize,
    pub failed_fetches: usize,
    pub results_queued: usize,
    pub domains_discovered: usize,
    pub keywords_discovered: usize,
    pub sites_confirmed: usize,
    pub persist_failures: usize,
    pub expansions: usize,
}

/// Summary of a finished crawl run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Run record ID, when the store accepted one
    pub run_id: Option<i64>,
    pub outcome: CrawlOutcome,
    pub stats: CrawlStats,

    /// Frontier state at the moment the run ended
    pub frontier: Frontier,

    /// Result links still queued for exploration
    pub pending_results: usize,
}
