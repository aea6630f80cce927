//! Shared handle to the SQLite store.
//!
//! rusqlite is synchronous; every call is moved onto tokio's blocking pool
//! so request tasks suspend instead of blocking the runtime. One connection
//! is shared behind a mutex, so statements are serialized per process and
//! consistency beyond a single call is left to SQLite transactions.

use std::path::Path;
use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use super::sqlite::{open_database, open_memory_database};
use super::DatabaseError;

#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Open (or create) the on-disk database and run migrations.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        let conn = open_database(path)?;
        tracing::info!(path = %path.display(), "Database opened");
        Ok(Self::from_connection(conn))
    }

    /// Migrated in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Run `f` against the connection on the blocking pool.
    pub async fn call<F, R>(&self, f: F) -> Result<R, DatabaseError>
    where
        F: FnOnce(&mut Connection) -> Result<R, DatabaseError> + Send + 'static,
        R: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| DatabaseError::LockPoisoned)?;
            f(&mut guard)
        })
        .await
        .map_err(|e| DatabaseError::TaskJoin(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn call_runs_against_migrated_schema() {
        let store = Store::open_in_memory().unwrap();
        let roles: i64 = store
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM roles", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(roles, 5);
    }

    #[tokio::test]
    async fn call_propagates_errors() {
        let store = Store::open_in_memory().unwrap();
        let result: Result<(), _> = store
            .call(|conn| {
                conn.execute("INSERT INTO no_such_table VALUES (1)", [])?;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Sqlite(_))));
    }

    #[tokio::test]
    async fn clones_share_one_database() {
        let store = Store::open_in_memory().unwrap();
        let other = store.clone();
        store
            .call(|conn| {
                conn.execute("INSERT INTO buildings (name, code) VALUES ('Main', 'B1')", [])?;
                Ok(())
            })
            .await
            .unwrap();
        let count: i64 = other
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM buildings", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn on_disk_store_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("hospital.db");
        {
            let store = Store::open(&path).unwrap();
            store
                .call(|conn| {
                    conn.execute("INSERT INTO vendors (name, address, email, phone_number) VALUES ('Acme', 'Road 1', 'a@acme.test', '555')", [])?;
                    Ok(())
                })
                .await
                .unwrap();
        }
        let reopened = Store::open(&path).unwrap();
        let count: i64 = reopened
            .call(|conn| Ok(conn.query_row("SELECT COUNT(*) FROM vendors", [], |row| row.get(0))?))
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
