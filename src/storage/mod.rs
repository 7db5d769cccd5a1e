//! Durable target-site store
//!
//! This module handles all persistence for the crawler:
//! - SQLite database initialization and schema management
//! - Keyed upsert of confirmed target sites
//! - Run tracking
//!
//! The scheduler only sees the [`TargetStore`] trait. [`SqliteStorage`] is the
//! on-disk backend, [`MemoryStore`] keeps everything in process.

mod memory;
mod schema;
mod sqlite;
mod traits;

pub use memory::MemoryStore;
pub use sqlite::SqliteStorage;
pub use traits::{StorageError, StorageResult, TargetStore};

use crate::classify::TargetSiteRecord;
use std::path::Path;

/// Opens (or creates) the SQLite store at `path`
pub fn open_storage(path: &Path) -> crate::Result<SqliteStorage> {
    Ok(SqliteStorage::new(path)?)
}

/// A target site as persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTargetSite {
    pub id: i64,
    pub site: TargetSiteRecord,
    pub discovered_at: String,
}

/// Result of an idempotent upsert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// The identifier was new and the record was stored
    Inserted(StoredTargetSite),

    /// A record with the same identifier already existed; it is returned unchanged
    Existing(StoredTargetSite),
}

impl UpsertOutcome {
    pub fn is_inserted(&self) -> bool {
        matches!(self, Self::Inserted(_))
    }

    pub fn stored(&self) -> &StoredTargetSite {
        match self {
            Self::Inserted(stored) | Self::Existing(stored) => stored,
        }
    }
}

/// Represents a crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
    pub sites_confirmed: u64,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Stopped,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Stopped => "stopped",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "stopped" => Some(Self::Stopped),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_status_roundtrip() {
        for status in &[
            RunStatus::Running,
            RunStatus::Completed,
            RunStatus::Stopped,
            RunStatus::Failed,
        ] {
            let db_str = status.to_db_string();
            let parsed = RunStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_run_status_invalid() {
        assert_eq!(RunStatus::from_db_string("interrupted"), None);
    }
}
