//! SQLite-backed release store

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::DateTime;
use rusqlite::Connection;
use tracing::{debug, info};

use crate::release::Release;
use crate::store::{ReleaseStore, StoreError};

/// Release store on a single SQLite database file.
///
/// One connection behind a mutex; every write runs in its own transaction,
/// which gives record_releases its per-batch atomicity.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database at `db_path`.
    pub fn new(db_path: &Path) -> Result<Self, StoreError> {
        info!("Opening release store at {:?}", db_path);

        let conn = Connection::open(db_path)?;

        // WAL keeps concurrent readers out of the writer's way
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_schema()?;

        Ok(store)
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn current_timestamp_ms() -> i64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time before UNIX epoch")
            .as_millis() as i64
    }

    fn create_schema(&self) -> Result<(), StoreError> {
        debug!("Creating release store schema");

        let conn = self.lock_conn()?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                identifier TEXT NOT NULL UNIQUE
            )
            "#,
            [],
        )?;

        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS releases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                version TEXT NOT NULL,
                published_at INTEGER,
                url TEXT,
                discovered_at INTEGER NOT NULL,
                FOREIGN KEY (project_id) REFERENCES projects(id) ON DELETE CASCADE,
                UNIQUE(project_id, version)
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_releases_project_id ON releases(project_id)",
            [],
        )?;

        Ok(())
    }

    /// Full release rows recorded for a project, in discovery order.
    pub fn stored_releases(&self, identifier: &str) -> Result<Vec<Release>, StoreError> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT r.version, r.published_at, r.url
            FROM releases r
            JOIN projects p ON r.project_id = p.id
            WHERE p.identifier = ?1
            ORDER BY r.id
            "#,
        )?;

        let releases = stmt
            .query_map([identifier], |row| {
                let published_at: Option<i64> = row.get(1)?;
                Ok(Release {
                    project: identifier.to_string(),
                    version: row.get(0)?,
                    published_at: published_at.and_then(DateTime::from_timestamp_millis),
                    url: row.get(2)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(releases)
    }
}

impl ReleaseStore for SqliteStore {
    fn seen_versions(&self, identifier: &str) -> Result<HashSet<String>, StoreError> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r#"
            SELECT r.version
            FROM releases r
            JOIN projects p ON r.project_id = p.id
            WHERE p.identifier = ?1
            "#,
        )?;

        let versions = stmt
            .query_map([identifier], |row| row.get(0))?
            .collect::<Result<HashSet<String>, _>>()?;

        Ok(versions)
    }

    fn record_releases(&self, identifier: &str, releases: &[Release]) -> Result<(), StoreError> {
        if releases.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        let now = Self::current_timestamp_ms();

        tx.execute(
            "INSERT INTO projects (identifier) VALUES (?1) ON CONFLICT(identifier) DO NOTHING",
            [identifier],
        )?;

        let project_id: i64 = tx.query_row(
            "SELECT id FROM projects WHERE identifier = ?1",
            [identifier],
            |row| row.get(0),
        )?;

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO releases
                    (project_id, version, published_at, url, discovered_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )?;

            for release in releases {
                stmt.execute((
                    project_id,
                    &release.version,
                    release.published_at.map(|t| t.timestamp_millis()),
                    &release.url,
                    now,
                ))?;
            }
        }

        tx.commit()?;

        debug!(
            "Recorded {} releases for '{}'",
            releases.len(),
            identifier
        );

        Ok(())
    }
}
