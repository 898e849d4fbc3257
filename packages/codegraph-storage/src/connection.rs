//! Shared SQLite connection handle and schema bootstrap.
//!
//! `rusqlite::Connection` isn't `Sync`, so every adapter holds the same
//! `Arc<parking_lot::Mutex<Connection>>` and locks it for the duration
//! of a single statement or transaction. Sync ports (`LedgerStore`,
//! `UnitsStore`, `GraphStore`) lock it directly; the async `VectorStore`
//! and `CacheTier` adapters move the lock onto a blocking thread via
//! `tokio::task::spawn_blocking` so a slow query never stalls the
//! executor.

use crate::error::Result;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Arc;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS ledger (
    project_id TEXT NOT NULL,
    path TEXT NOT NULL,
    content_hash TEXT NOT NULL,
    PRIMARY KEY (project_id, path)
);

CREATE TABLE IF NOT EXISTS units (
    project_id TEXT NOT NULL,
    unit_id TEXT NOT NULL,
    file_path TEXT NOT NULL,
    kind TEXT NOT NULL,
    data BLOB NOT NULL,
    PRIMARY KEY (project_id, unit_id)
);
CREATE INDEX IF NOT EXISTS idx_units_file ON units(project_id, file_path);

CREATE TABLE IF NOT EXISTS vectors (
    unit_id TEXT PRIMARY KEY,
    model_id TEXT NOT NULL,
    dim INTEGER NOT NULL,
    vector BLOB NOT NULL,
    file_path TEXT NOT NULL,
    language TEXT
);
CREATE INDEX IF NOT EXISTS idx_vectors_file ON vectors(file_path);
CREATE INDEX IF NOT EXISTS idx_vectors_model ON vectors(model_id);

CREATE TABLE IF NOT EXISTS edges (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    src_unit_id TEXT NOT NULL,
    dst_unit_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    weight REAL,
    evidence TEXT,
    unresolved INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_edges_src ON edges(src_unit_id);
CREATE INDEX IF NOT EXISTS idx_edges_dst ON edges(dst_unit_id);
"#;

#[derive(Clone)]
pub struct SqliteDb {
    pub(crate) conn: Arc<Mutex<Connection>>,
}

impl SqliteDb {
    /// Open (or create) a database file at `path` and apply the schema.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// An ephemeral database, for tests and single-process scratch runs.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}
