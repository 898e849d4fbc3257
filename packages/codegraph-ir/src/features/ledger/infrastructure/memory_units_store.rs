//! In-process `UnitsStore` — the correctness reference and the
//! implementation used by default in tests. `codegraph-storage`
//! provides the persistent SQLite-backed implementation.

use crate::domain::Unit;
use crate::features::ledger::domain::ports::UnitsStore;
use crate::shared::models::Result;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
pub struct MemoryUnitsStore {
    // (project_id, unit_id) -> unit
    units: RwLock<HashMap<(String, String), Unit>>,
    // (project_id, file_path) -> unit_ids
    by_file: RwLock<HashMap<(String, String), Vec<String>>>,
}

impl MemoryUnitsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UnitsStore for MemoryUnitsStore {
    fn replace_file_units(&self, project_id: &str, file_path: &str, units: Vec<Unit>) -> Result<Vec<String>> {
        let removed = self.remove_file_units(project_id, file_path)?;
        let mut table = self.units.write();
        let mut by_file = self.by_file.write();
        let mut ids = Vec::with_capacity(units.len());
        for unit in units {
            ids.push(unit.unit_id.clone());
            table.insert((project_id.to_string(), unit.unit_id.clone()), unit);
        }
        by_file.insert((project_id.to_string(), file_path.to_string()), ids);
        Ok(removed)
    }

    fn remove_file_units(&self, project_id: &str, file_path: &str) -> Result<Vec<String>> {
        let key = (project_id.to_string(), file_path.to_string());
        let ids = self.by_file.write().remove(&key).unwrap_or_default();
        let mut table = self.units.write();
        for id in &ids {
            table.remove(&(project_id.to_string(), id.clone()));
        }
        Ok(ids)
    }

    fn get_unit(&self, project_id: &str, unit_id: &str) -> Result<Option<Unit>> {
        Ok(self.units.read().get(&(project_id.to_string(), unit_id.to_string())).cloned())
    }

    fn list_project_units(&self, project_id: &str) -> Result<Vec<Unit>> {
        Ok(self
            .units
            .read()
            .iter()
            .filter(|((pid, _), _)| pid == project_id)
            .map(|(_, unit)| unit.clone())
            .collect())
    }
}
