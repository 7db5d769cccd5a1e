//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the TargetStore trait.

use crate::classify::{LinkType, SiteType, TargetSiteRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{StorageError, StorageResult, TargetStore};
use crate::storage::{RunRecord, RunStatus, StoredTargetSite, UpsertOutcome};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const TARGET_SITE_COLUMNS: &str =
    "id, url, normalized_identifier, site_name, site_type, link_type, source_url, discovered_at";

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, status, sites_confirmed";

/// SQLite storage backend
///
/// The connection sits behind a mutex so the store can be shared between tasks.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens or creates the database at `path` and applies the schema
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

fn find_by_identifier(
    conn: &Connection,
    identifier: &str,
) -> StorageResult<Option<StoredTargetSite>> {
    let sql = format!(
        "SELECT {} FROM target_sites WHERE normalized_identifier = ?1",
        TARGET_SITE_COLUMNS
    );
    let row = conn
        .query_row(&sql, params![identifier], read_target_site_row)
        .optional()?;
    row.map(into_stored).transpose()
}

/// Raw column values of a `target_sites` row
struct TargetSiteRow {
    id: i64,
    url: String,
    normalized_identifier: String,
    site_name: Option<String>,
    site_type: String,
    link_type: String,
    source_url: Option<String>,
    discovered_at: String,
}

fn read_target_site_row(row: &Row<'_>) -> rusqlite::Result<TargetSiteRow> {
    Ok(TargetSiteRow {
        id: row.get(0)?,
        url: row.get(1)?,
        normalized_identifier: row.get(2)?,
        site_name: row.get(3)?,
        site_type: row.get(4)?,
        link_type: row.get(5)?,
        source_url: row.get(6)?,
        discovered_at: row.get(7)?,
    })
}

fn into_stored(row: TargetSiteRow) -> StorageResult<StoredTargetSite> {
    let site_type = SiteType::from_db_string(&row.site_type)
        .ok_or_else(|| StorageError::Corrupt(format!("site_type '{}'", row.site_type)))?;
    let link_type = LinkType::from_db_string(&row.link_type)
        .ok_or_else(|| StorageError::Corrupt(format!("link_type '{}'", row.link_type)))?;

    Ok(StoredTargetSite {
        id: row.id,
        site: TargetSiteRecord {
            url: row.url,
            normalized_identifier: row.normalized_identifier,
            site_type,
            link_type,
            site_name: row.site_name,
            source_url: row.source_url,
        },
        discovered_at: row.discovered_at,
    })
}

fn read_run_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(RunStatus::Failed),
        sites_confirmed: row.get::<_, i64>(5)?.max(0) as u64,
    })
}

impl TargetStore for SqliteStorage {
    // ===== Target Sites =====

    fn load_normalized_identifiers(&self) -> StorageResult<HashSet<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT normalized_identifier FROM target_sites")?;
        let identifiers = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<HashSet<_>, _>>()?;
        Ok(identifiers)
    }

    fn upsert_target_site(&self, record: &TargetSiteRecord) -> StorageResult<UpsertOutcome> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let inserted = conn.execute(
            "INSERT INTO target_sites
                (url, normalized_identifier, site_name, site_type, link_type, source_url, discovered_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(normalized_identifier) DO NOTHING",
            params![
                record.url,
                record.normalized_identifier,
                record.site_name,
                record.site_type.to_db_string(),
                record.link_type.to_db_string(),
                record.source_url,
                now
            ],
        )?;

        let stored = find_by_identifier(&conn, &record.normalized_identifier)?.ok_or_else(|| {
            StorageError::Database(format!(
                "upserted identifier '{}' not found",
                record.normalized_identifier
            ))
        })?;

        Ok(if inserted > 0 {
            UpsertOutcome::Inserted(stored)
        } else {
            UpsertOutcome::Existing(stored)
        })
    }

    fn get_target_site(&self, identifier: &str) -> StorageResult<Option<StoredTargetSite>> {
        let conn = self.conn()?;
        find_by_identifier(&conn, identifier)
    }

    fn list_target_sites(&self) -> StorageResult<Vec<StoredTargetSite>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM target_sites ORDER BY id", TARGET_SITE_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], read_target_site_row)?
            .collect::<Result<Vec<_>, _>>()?;
        rows.into_iter().map(into_stored).collect()
    }

    fn count_target_sites(&self) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM target_sites", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_by_site_type(&self, site_type: SiteType) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM target_sites WHERE site_type = ?1",
            params![site_type.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_by_link_type(&self, link_type: LinkType) -> StorageResult<u64> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM target_sites WHERE link_type = ?1",
            params![link_type.to_db_string()],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(&self, config_hash: &str) -> StorageResult<i64> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn finish_run(
        &self,
        run_id: i64,
        status: RunStatus,
        sites_confirmed: u64,
    ) -> StorageResult<()> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();
        let updated = conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, sites_confirmed = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, sites_confirmed as i64, run_id],
        )?;
        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS);
        conn.query_row(&sql, params![run_id], read_run_row)
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let conn = self.conn()?;
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        Ok(conn.query_row(&sql, [], read_run_row).optional()?)
    }
}
