//! Storage trait and error types

use crate::classify::{LinkType, SiteType, TargetSiteRecord};
use crate::storage::{RunRecord, RunStatus, StoredTargetSite, UpsertOutcome};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Storage lock poisoned")]
    Poisoned,
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Keyed store of confirmed target sites
///
/// Implementations are shared between the scheduler and the reporting code,
/// so every method takes `&self` and must be safe to call from any task.
pub trait TargetStore: Send + Sync {
    // ===== Target Sites =====

    /// Every normalized identifier already persisted
    ///
    /// Called once per run to seed the confirmed set.
    fn load_normalized_identifiers(&self) -> StorageResult<HashSet<String>>;

    /// Stores `record` unless its identifier already exists
    ///
    /// A duplicate identifier is not an error: the existing record is returned.
    fn upsert_target_site(&self, record: &TargetSiteRecord) -> StorageResult<UpsertOutcome>;

    fn get_target_site(&self, identifier: &str) -> StorageResult<Option<StoredTargetSite>>;

    /// All persisted sites in discovery order
    fn list_target_sites(&self) -> StorageResult<Vec<StoredTargetSite>>;

    fn count_target_sites(&self) -> StorageResult<u64>;

    fn count_by_site_type(&self, site_type: SiteType) -> StorageResult<u64>;

    fn count_by_link_type(&self, link_type: LinkType) -> StorageResult<u64>;

    // ===== Run Management =====

    /// Records the start of a crawl run and returns its ID
    fn create_run(&self, config_hash: &str) -> StorageResult<i64>;

    /// Stamps a run with its final status and the number of sites it confirmed
    fn finish_run(&self, run_id: i64, status: RunStatus, sites_confirmed: u64)
        -> StorageResult<()>;

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;
}
