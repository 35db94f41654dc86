//! SQLite-backed VersionStore adapter

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use tracing::debug;

use crate::store::{StoreResult, VersionInfo, VersionStore};
use crate::StoreError;

/// Durable version store backed by a SQLite file
///
/// Schema: a `plans` table holding the latest snapshot per (owner, trip)
/// and an append-only `plan_versions` table holding every snapshot. Both
/// writes and the MAX(version)+1 read happen inside one transaction, so
/// version assignment is atomic even with concurrent writers.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Open (and initialize if needed) a store at the given path
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        debug!(path = %path.as_ref().display(), "SqliteStore::open: called");
        let conn = Connection::open(path)?;
        Self::init(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Open an in-memory SQLite store (useful for tests)
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(&conn)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    fn init(conn: &Connection) -> StoreResult<()> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             CREATE TABLE IF NOT EXISTS plans (
                 owner       TEXT NOT NULL,
                 trip        TEXT NOT NULL,
                 plan        TEXT NOT NULL,
                 PRIMARY KEY (owner, trip)
             );
             CREATE TABLE IF NOT EXISTS plan_versions (
                 owner       TEXT NOT NULL,
                 trip        TEXT NOT NULL,
                 version     INTEGER NOT NULL,
                 modified_by TEXT NOT NULL,
                 plan        TEXT NOT NULL,
                 created_at  TEXT NOT NULL,
                 PRIMARY KEY (owner, trip, version)
             );
             CREATE INDEX IF NOT EXISTS idx_versions_key
                 ON plan_versions(owner, trip);",
        )?;
        Ok(())
    }
}

impl VersionStore for SqliteStore {
    fn get(&self, owner: &str, trip: &str, version: Option<u32>) -> StoreResult<Option<Value>> {
        debug!(%owner, %trip, ?version, "SqliteStore::get: called");
        let conn = self.conn.lock().expect("store mutex poisoned");

        let json: Option<String> = match version {
            None => conn
                .query_row(
                    "SELECT plan FROM plans WHERE owner = ?1 AND trip = ?2",
                    params![owner, trip],
                    |row| row.get(0),
                )
                .optional()?,
            Some(v) => conn
                .query_row(
                    "SELECT plan FROM plan_versions
                     WHERE owner = ?1 AND trip = ?2 AND version = ?3",
                    params![owner, trip, v],
                    |row| row.get(0),
                )
                .optional()?,
        };

        match json {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn append(&self, owner: &str, trip: &str, plan: &Value, modified_by: &str) -> StoreResult<u32> {
        debug!(%owner, %trip, %modified_by, "SqliteStore::append: called");
        let mut conn = self.conn.lock().expect("store mutex poisoned");
        let tx = conn.transaction()?;

        let max: Option<u32> = tx.query_row(
            "SELECT MAX(version) FROM plan_versions WHERE owner = ?1 AND trip = ?2",
            params![owner, trip],
            |row| row.get(0),
        )?;
        let next = max.unwrap_or(0) + 1;

        let text = plan.to_string();
        let now = Utc::now().to_rfc3339();

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO plan_versions
                 (owner, trip, version, modified_by, plan, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![owner, trip, next, modified_by, text, now],
        )?;
        if inserted == 0 {
            // Another writer landed the same version between our MAX read and
            // the insert. Cannot happen while the connection mutex is held;
            // seeing it means the storage layer is broken.
            return Err(StoreError::VersionConflict {
                owner: owner.to_string(),
                trip: trip.to_string(),
                version: next,
            });
        }

        tx.execute(
            "INSERT INTO plans (owner, trip, plan) VALUES (?1, ?2, ?3)
             ON CONFLICT(owner, trip) DO UPDATE SET plan = excluded.plan",
            params![owner, trip, text],
        )?;

        tx.commit()?;
        debug!(%owner, %trip, version = next, "SqliteStore::append: committed");
        Ok(next)
    }

    fn list_versions(&self, owner: &str, trip: &str) -> StoreResult<Vec<VersionInfo>> {
        debug!(%owner, %trip, "SqliteStore::list_versions: called");
        let conn = self.conn.lock().expect("store mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT version, modified_by, created_at FROM plan_versions
             WHERE owner = ?1 AND trip = ?2
             ORDER BY version ASC",
        )?;

        let rows = stmt.query_map(params![owner, trip], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;

        let mut versions = Vec::new();
        for row in rows {
            let (version, modified_by, created_at) = row?;
            let created_at = DateTime::parse_from_rfc3339(&created_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            versions.push(VersionInfo {
                version,
                modified_by,
                created_at,
            });
        }
        Ok(versions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("open in-memory store")
    }

    #[test]
    fn test_append_assigns_consecutive_versions() {
        let store = store();
        let plan = json!({"destination": "Zurich"});

        assert_eq!(store.append("ada", "trip-1", &plan, "ada").unwrap(), 1);
        assert_eq!(store.append("ada", "trip-1", &plan, "ada").unwrap(), 2);
        assert_eq!(store.append("ada", "trip-1", &plan, "grace").unwrap(), 3);

        let versions = store.list_versions("ada", "trip-1").unwrap();
        let numbers: Vec<u32> = versions.iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(versions[2].modified_by, "grace");
    }

    #[test]
    fn test_keys_are_isolated() {
        let store = store();
        let plan = json!({"x": 1});

        store.append("ada", "trip-1", &plan, "ada").unwrap();
        assert_eq!(store.append("ada", "trip-2", &plan, "ada").unwrap(), 1);
        assert_eq!(store.append("bob", "trip-1", &plan, "bob").unwrap(), 1);
    }

    #[test]
    fn test_get_latest_and_specific_version() {
        let store = store();
        store.append("ada", "t", &json!({"v": 1}), "ada").unwrap();
        store.append("ada", "t", &json!({"v": 2}), "ada").unwrap();

        let latest = store.get("ada", "t", None).unwrap().unwrap();
        assert_eq!(latest["v"], 2);

        let first = store.get("ada", "t", Some(1)).unwrap().unwrap();
        assert_eq!(first["v"], 1);

        assert!(store.get("ada", "t", Some(9)).unwrap().is_none());
        assert!(store.get("ada", "missing", None).unwrap().is_none());
    }

    #[test]
    fn test_unknown_key_lists_empty() {
        let store = store();
        assert!(store.list_versions("nobody", "nothing").unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans.db");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.append("ada", "t", &json!({"v": 1}), "ada").unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        assert_eq!(store.append("ada", "t", &json!({"v": 2}), "ada").unwrap(), 2);
        assert_eq!(store.list_versions("ada", "t").unwrap().len(), 2);
    }

    #[test]
    fn test_concurrent_appends_never_gap() {
        use std::sync::Arc;

        let store = Arc::new(store());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                store
                    .append("ada", "t", &json!({"writer": i}), "ada")
                    .unwrap()
            }));
        }

        let mut versions: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        versions.sort_unstable();
        assert_eq!(versions, (1..=8).collect::<Vec<u32>>());
    }
}
