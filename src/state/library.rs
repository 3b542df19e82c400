use chrono::Local;
use rusqlite::{Connection, Params, Row};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Result;

/// The Library is the single access point to the SQLite catalog file.
///
/// It holds no connection. Every call opens one, runs a single statement in
/// autocommit mode and drops it again, so nothing spans two calls.
#[derive(Clone)]
pub struct Library {
    db_path: PathBuf,
}

impl Library {
    /// Open (or create) the catalog at `db_path` and make sure the schema exists.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();

        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let library = Library { db_path };
        library.init_schema()?;

        info!(path = ?library.db_path, "Database initialized");
        Ok(library)
    }

    /// Create tables and indexes if they don't exist.
    /// Never drops or alters existing tables, so it is safe on every launch.
    pub fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;

        // One row per photography client
        conn.execute(
            "CREATE TABLE IF NOT EXISTS clients (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT NOT NULL,
                folder_path     TEXT NOT NULL,
                type_id         INTEGER,
                date            TEXT,
                phone           TEXT,
                email           TEXT,
                notes           TEXT,
                thumbnail_path  TEXT,
                created_at      TEXT,
                updated_at      TEXT
            )",
            [],
        )?;

        // One row per shoot type; client_count is kept in sync by the repository
        conn.execute(
            "CREATE TABLE IF NOT EXISTS types (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                name            TEXT UNIQUE NOT NULL,
                color           TEXT DEFAULT '#CCCCCC',
                created_at      TEXT,
                client_count    INTEGER DEFAULT 0
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_clients_name ON clients(name)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_clients_type ON clients(type_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_clients_date ON clients(date)",
            [],
        )?;

        debug!("Database schema initialized");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Run one mutating statement and return the last inserted row id.
    /// The id is only meaningful for INSERT statements.
    pub fn execute<P: Params>(&self, sql: &str, params: P) -> Result<i64> {
        let conn = self.connect()?;
        conn.execute(sql, params)?;
        Ok(conn.last_insert_rowid())
    }

    /// Run one query and collect every row through `map`.
    pub fn fetch<T, P, F>(&self, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt
            .query_map(params, map)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }

    /// Copy the database file into `dir` under a timestamped name.
    pub fn backup_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir)?;

        let stamp = Local::now().format("%Y%m%d_%H%M%S");
        let target = dir.join(format!("clients_{}.db", stamp));
        fs::copy(&self.db_path, &target)?;

        info!(from = ?self.db_path, to = ?target, "Database backed up");
        Ok(target)
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}
