//! In-process target-site store

use crate::classify::{LinkType, SiteType, TargetSiteRecord};
use crate::storage::traits::{StorageError, StorageResult, TargetStore};
use crate::storage::{RunRecord, RunStatus, StoredTargetSite, UpsertOutcome};
use chrono::Utc;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

/// Store that keeps everything in memory
///
/// Backs the scheduler and reporting tests. Counts every upsert call so callers
/// can assert how often persistence was attempted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    sites: IndexMap<String, StoredTargetSite>,
    runs: Vec<RunRecord>,
    upsert_calls: usize,
    failing: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store with already persisted sites
    pub fn with_sites<I>(sites: I) -> Self
    where
        I: IntoIterator<Item = TargetSiteRecord>,
    {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            for site in sites {
                inner.insert(site);
            }
            inner.upsert_calls = 0;
        }
        store
    }

    /// Makes upserts of `identifier` fail until cleared
    pub fn fail_identifier(&self, identifier: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.insert(identifier.to_string());
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.failing.clear();
        }
    }

    /// Number of upsert calls so far, including duplicates and failures
    pub fn upsert_calls(&self) -> usize {
        self.inner.lock().map(|inner| inner.upsert_calls).unwrap_or(0)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Inner>> {
        self.inner.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl Inner {
    fn insert(&mut self, site: TargetSiteRecord) -> UpsertOutcome {
        self.upsert_calls += 1;
        if let Some(existing) = self.sites.get(&site.normalized_identifier) {
            return UpsertOutcome::Existing(existing.clone());
        }

        let stored = StoredTargetSite {
            id: self.sites.len() as i64 + 1,
            site,
            discovered_at: Utc::now().to_rfc3339(),
        };
        self.sites
            .insert(stored.site.normalized_identifier.clone(), stored.clone());
        UpsertOutcome::Inserted(stored)
    }

    fn run_mut(&mut self, run_id: i64) -> StorageResult<&mut RunRecord> {
        self.runs
            .iter_mut()
            .find(|run| run.id == run_id)
            .ok_or(StorageError::RunNotFound(run_id))
    }
}

impl TargetStore for MemoryStore {
    fn load_normalized_identifiers(&self) -> StorageResult<HashSet<String>> {
        Ok(self.lock()?.sites.keys().cloned().collect())
    }

    fn upsert_target_site(&self, record: &TargetSiteRecord) -> StorageResult<UpsertOutcome> {
        let mut inner = self.lock()?;
        if inner.failing.contains(&record.normalized_identifier) {
            inner.upsert_calls += 1;
            return Err(StorageError::Database(format!(
                "refusing to store '{}'",
                record.normalized_identifier
            )));
        }
        Ok(inner.insert(record.clone()))
    }

    fn get_target_site(&self, identifier: &str) -> StorageResult<Option<StoredTargetSite>> {
        Ok(self.lock()?.sites.get(identifier).cloned())
    }

    fn list_target_sites(&self) -> StorageResult<Vec<StoredTargetSite>> {
        Ok(self.lock()?.sites.values().cloned().collect())
    }

    fn count_target_sites(&self) -> StorageResult<u64> {
        Ok(self.lock()?.sites.len() as u64)
    }

    fn count_by_site_type(&self, site_type: SiteType) -> StorageResult<u64> {
        let inner = self.lock()?;
        Ok(inner
            .sites
            .values()
            .filter(|s| s.site.site_type == site_type)
            .count() as u64)
    }

    fn count_by_link_type(&self, link_type: LinkType) -> StorageResult<u64> {
        let inner = self.lock()?;
        Ok(inner
            .sites
            .values()
            .filter(|s| s.site.link_type == link_type)
            .count() as u64)
    }

    fn create_run(&self, config_hash: &str) -> StorageResult<i64> {
        let mut inner = self.lock()?;
        let id = inner.runs.len() as i64 + 1;
        inner.runs.push(RunRecord {
            id,
            started_at: Utc::now().to_rfc3339(),
            finished_at: None,
            config_hash: config_hash.to_string(),
            status: RunStatus::Running,
            sites_confirmed: 0,
        });
        Ok(id)
    }

    fn finish_run(
        &self,
        run_id: i64,
        status: RunStatus,
        sites_confirmed: u64,
    ) -> StorageResult<()> {
        let mut inner = self.lock()?;
        let run = inner.run_mut(run_id)?;
        run.status = status;
        run.sites_confirmed = sites_confirmed;
        run.finished_at = Some(Utc::now().to_rfc3339());
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let mut inner = self.lock()?;
        inner.run_mut(run_id).map(|run| run.clone())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        Ok(self.lock()?.runs.last().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(identifier: &str) -> TargetSiteRecord {
        TargetSiteRecord {
            url: format!("https://{}/", identifier),
            normalized_identifier: identifier.to_string(),
            site_type: SiteType::Gambling,
            link_type: LinkType::Website,
            site_name: None,
            source_url: None,
        }
    }

    #[test]
    fn test_upsert_is_idempotent_by_identifier() {
        let store = MemoryStore::new();
        assert!(store.upsert_target_site(&record("a.test")).unwrap().is_inserted());
        assert!(!store.upsert_target_site(&record("a.test")).unwrap().is_inserted());
        assert_eq!(store.count_target_sites().unwrap(), 1);
        assert_eq!(store.upsert_calls(), 2);
    }

    #[test]
    fn test_with_sites_seeds_identifiers() {
        let store = MemoryStore::with_sites([record("a.test"), record("b.test")]);
        let identifiers = store.load_normalized_identifiers().unwrap();
        assert_eq!(identifiers.len(), 2);
        assert_eq!(store.upsert_calls(), 0);
    }

    #[test]
    fn test_failing_identifier() {
        let store = MemoryStore::new();
        store.fail_identifier("a.test");
        assert!(store.upsert_target_site(&record("a.test")).is_err());
        assert_eq!(store.count_target_sites().unwrap(), 0);

        store.clear_failures();
        assert!(store.upsert_target_site(&record("a.test")).is_ok());
    }

    #[test]
    fn test_run_records() {
        let store = MemoryStore::new();
        let run_id = store.create_run("hash").unwrap();
        store.finish_run(run_id, RunStatus::Completed, 3).unwrap();

        let run = store.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert_eq!(run.sites_confirmed, 3);
        assert!(store.get_run(99).is_err());
    }
}
