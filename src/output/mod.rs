//! Reporting over persisted target sites
//!
//! This module handles:
//! - Counting persisted target sites by site type and link type
//! - Generating markdown summaries of the target-site table

mod markdown;
pub mod stats;

pub use markdown::{format_markdown_summary, generate_markdown_summary};
pub use stats::{format_statistics, load_statistics, print_statistics, TargetStatistics};

use crate::storage::{RunRecord, StoredTargetSite, TargetStore};
use crate::SeekerError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Everything the markdown export renders
#[derive(Debug, Clone)]
pub struct TargetSummary {
    pub latest_run: Option<RunRecord>,
    pub statistics: TargetStatistics,
    pub sites: Vec<StoredTargetSite>,
}

/// Collects a summary of the store's contents
pub fn generate_summary(store: &dyn TargetStore) -> Result<TargetSummary, SeekerError> {
    let statistics = load_statistics(store)?;
    let sites = store.list_target_sites()?;

    Ok(TargetSummary {
        latest_run: statistics.latest_run.clone(),
        statistics,
        sites,
    })
}
