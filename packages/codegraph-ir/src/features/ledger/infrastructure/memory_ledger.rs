//! In-process `LedgerStore` — the correctness reference and the
//! implementation used by default in tests. `codegraph-storage`
//! provides the persistent SQLite-backed implementation.

use crate::features::ledger::domain::ports::LedgerStore;
use crate::shared::models::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryLedgerStore {
    // (project_id, path) -> content_hash
    committed: RwLock<HashMap<(String, String), String>>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn snapshot(&self, project_id: &str) -> Result<HashMap<String, String>> {
        let guard = self.committed.read();
        Ok(guard
            .iter()
            .filter(|((pid, _), _)| pid == project_id)
            .map(|((_, path), hash)| (path.clone(), hash.clone()))
            .collect())
    }

    fn commit_upsert(&self, project_id: &str, path: &str, hash: &str) -> Result<()> {
        self.committed
            .write()
            .insert((project_id.to_string(), path.to_string()), hash.to_string());
        Ok(())
    }

    fn commit_delete(&self, project_id: &str, path: &str) -> Result<()> {
        self.committed
            .write()
            .remove(&(project_id.to_string(), path.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_scoped_per_project() {
        let store = MemoryLedgerStore::new();
        store.commit_upsert("p1", "a.rs", "h1").unwrap();
        store.commit_upsert("p2", "a.rs", "h2").unwrap();

        let snap1 = store.snapshot("p1").unwrap();
        assert_eq!(snap1.get("a.rs"), Some(&"h1".to_string()));

        let snap2 = store.snapshot("p2").unwrap();
        assert_eq!(snap2.get("a.rs"), Some(&"h2".to_string()));
    }

    #[test]
    fn delete_removes_from_snapshot() {
        let store = MemoryLedgerStore::new();
        store.commit_upsert("p1", "a.rs", "h1").unwrap();
        store.commit_delete("p1", "a.rs").unwrap();
        assert!(store.snapshot("p1").unwrap().is_empty());
    }
}
