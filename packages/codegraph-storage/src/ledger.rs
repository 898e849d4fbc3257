//! SQLite-backed `LedgerStore` and `UnitsStore` (spec §4.2, §6).

use crate::connection::SqliteDb;
use crate::error::StorageError;
use codegraph_ir::domain::Unit;
use codegraph_ir::features::ledger::{LedgerStore, UnitsStore};
use codegraph_ir::Result;
use rusqlite::params;
use std::collections::HashMap;

pub struct SqliteLedgerStore {
    db: SqliteDb,
}

impl SqliteLedgerStore {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

impl LedgerStore for SqliteLedgerStore {
    fn snapshot(&self, project_id: &str) -> Result<HashMap<String, String>> {
        let conn = self.db.conn.lock();
        let mut stmt = conn
            .prepare("SELECT path, content_hash FROM ledger WHERE project_id = ?1")
            .map_err(StorageError::from)?;
        let rows = stmt
            .query_map(params![project_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(StorageError::from)?;
        let mut out = HashMap::new();
        for row in rows {
            let (path, hash) = row.map_err(StorageError::from)?;
            out.insert(path, hash);
        }
        Ok(out)
    }

    fn commit_upsert(&self, project_id: &str, path: &str, hash: &str) -> Result<()> {
        let conn = self.db.conn.lock();
        conn.execute(
            "INSERT INTO ledger (project_id, path, content_hash) VALUES (?1, ?2, ?3)
             ON CONFLICT(project_id, path) DO UPDATE SET content_hash = excluded.content_hash",
            params![project_id, path, hash],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn commit_delete(&self, project_id: &str, path: &str) -> Result<()> {
        let conn = self.db.conn.lock();
        conn.execute(
            "DELETE FROM ledger WHERE project_id = ?1 AND path = ?2",
            params![project_id, path],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }
}

pub struct SqliteUnitsStore {
    db: SqliteDb,
}

impl SqliteUnitsStore {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

impl UnitsStore for SqliteUnitsStore {
    fn replace_file_units(&self, project_id: &str, file_path: &str, units: Vec<Unit>) -> Result<Vec<String>> {
        let mut conn = self.db.conn.lock();
        let tx = conn.transaction().map_err(StorageError::from)?;

        let removed: Vec<String> = {
            let mut stmt = tx
                .prepare("SELECT unit_id FROM units WHERE project_id = ?1 AND file_path = ?2")
                .map_err(StorageError::from)?;
            let rows = stmt
                .query_map(params![project_id, file_path], |row| row.get::<_, String>(0))
                .map_err(StorageError::from)?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row.map_err(StorageError::from)?);
            }
            ids
        };

        tx.execute(
            "DELETE FROM units WHERE project_id = ?1 AND file_path = ?2",
            params![project_id, file_path],
        )
        .map_err(StorageError::from)?;

        for unit in &units {
            let data = serde_json::to_vec(unit).map_err(StorageError::from)?;
            tx.execute(
                "INSERT INTO units (project_id, unit_id, file_path, kind, data) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![project_id, unit.unit_id, unit.file_path, unit.kind.as_str(), data],
            )
            .map_err(StorageError::from)?;
        }

        tx.commit().map_err(StorageError::from)?;
        Ok(removed)
    }

    fn remove_file_units(&self, project_id: &str, file_path: &str) -> Result<Vec<String>> {
        let conn = self.db.conn.lock();
        let removed: Vec<String> = {
            let mut stmt = conn
                .prepare("SELECT unit_id FROM units WHERE project_id = ?1 AND file_path = ?2")
                .map_err(StorageError::from)?;
            let rows = stmt
                .query_map(params![project_id, file_path], |row| row.get::<_, String>(0))
                .map_err(StorageError::from)?;
            let mut ids = Vec::new();
            for row in rows {
                ids.push(row.map_err(StorageError::from)?);
            }
            ids
        };
        conn.execute(
            "DELETE FROM units WHERE project_id = ?1 AND file_path = ?2",
            params![project_id, file_path],
        )
        .map_err(StorageError::from)?;
        Ok(removed)
    }

    fn get_unit(&self, project_id: &str, unit_id: &str) -> Result<Option<Unit>> {
        let conn = self.db.conn.lock();
        let mut stmt = conn
            .prepare("SELECT data FROM units WHERE project_id = ?1 AND unit_id = ?2")
            .map_err(StorageError::from)?;
        let mut rows = stmt.query(params![project_id, unit_id]).map_err(StorageError::from)?;
        if let Some(row) = rows.next().map_err(StorageError::from)? {
            let data: Vec<u8> = row.get(0).map_err(StorageError::from)?;
            let unit: Unit = serde_json::from_slice(&data).map_err(StorageError::from)?;
            Ok(Some(unit))
        } else {
            Ok(None)
        }
    }

    fn list_project_units(&self, project_id: &str) -> Result<Vec<Unit>> {
        let conn = self.db.conn.lock();
        let mut stmt = conn
            .prepare("SELECT data FROM units WHERE project_id = ?1")
            .map_err(StorageError::from)?;
        let rows = stmt
            .query_map(params![project_id], |row| row.get::<_, Vec<u8>>(0))
            .map_err(StorageError::from)?;
        let mut out = Vec::new();
        for row in rows {
            let data = row.map_err(StorageError::from)?;
            let unit: Unit = serde_json::from_slice(&data).map_err(StorageError::from)?;
            out.push(unit);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codegraph_ir::domain::UnitKind;
    use codegraph_ir::shared::ports::Language;

    fn unit(file_path: &str, name: &str, start_line: u32) -> Unit {
        Unit::new(
            file_path,
            UnitKind::Function,
            name,
            name,
            start_line,
            start_line + 4,
            Language::Python,
            "def f(): pass",
            "hash",
        )
    }

    #[test]
    fn ledger_roundtrips_snapshot_and_commit() {
        let store = SqliteLedgerStore::new(SqliteDb::open_in_memory().unwrap());
        assert!(store.snapshot("p1").unwrap().is_empty());

        store.commit_upsert("p1", "a.py", "h1").unwrap();
        let snap = store.snapshot("p1").unwrap();
        assert_eq!(snap.get("a.py"), Some(&"h1".to_string()));

        store.commit_upsert("p1", "a.py", "h2").unwrap();
        assert_eq!(store.snapshot("p1").unwrap().get("a.py"), Some(&"h2".to_string()));

        store.commit_delete("p1", "a.py").unwrap();
        assert!(store.snapshot("p1").unwrap().is_empty());
    }

    #[test]
    fn ledger_is_scoped_per_project() {
        let store = SqliteLedgerStore::new(SqliteDb::open_in_memory().unwrap());
        store.commit_upsert("p1", "a.py", "h1").unwrap();
        store.commit_upsert("p2", "a.py", "h2").unwrap();
        assert_eq!(store.snapshot("p1").unwrap().get("a.py"), Some(&"h1".to_string()));
        assert_eq!(store.snapshot("p2").unwrap().get("a.py"), Some(&"h2".to_string()));
    }

    #[test]
    fn replace_file_units_swaps_set_and_reports_removed_ids() {
        let db = SqliteDb::open_in_memory().unwrap();
        let store = SqliteUnitsStore::new(db);

        let first = vec![unit("a.py", "f", 1), unit("a.py", "g", 10)];
        let removed = store.replace_file_units("p1", "a.py", first.clone()).unwrap();
        assert!(removed.is_empty());
        assert_eq!(store.list_project_units("p1").unwrap().len(), 2);

        let second = vec![unit("a.py", "f", 1)];
        let removed = store.replace_file_units("p1", "a.py", second).unwrap();
        assert_eq!(removed, vec![first[1].unit_id.clone()]);
        assert_eq!(store.list_project_units("p1").unwrap().len(), 1);
    }

    #[test]
    fn get_unit_returns_none_for_unknown_id() {
        let store = SqliteUnitsStore::new(SqliteDb::open_in_memory().unwrap());
        assert!(store.get_unit("p1", "missing").unwrap().is_none());
    }

    #[test]
    fn remove_file_units_clears_and_returns_ids() {
        let store = SqliteUnitsStore::new(SqliteDb::open_in_memory().unwrap());
        let units = vec![unit("a.py", "f", 1)];
        store.replace_file_units("p1", "a.py", units.clone()).unwrap();
        let removed = store.remove_file_units("p1", "a.py").unwrap();
        assert_eq!(removed, vec![units[0].unit_id.clone()]);
        assert!(store.list_project_units("p1").unwrap().is_empty());
    }
}
