//! Change Ledger port (spec §4.2).
//!
//! "The ledger is keyed by `(project_id, path)`." Writes are staged and
//! committed only after the dependent components acknowledge success
//! for each path — this trait exposes `snapshot` (read the last
//! committed state) and `commit_*` (advance it one path at a time), so
//! a crash between them leaves the ledger pointing at the last fully
//! processed state, never a half-written one.

use crate::domain::Unit;
use crate::shared::models::Result;
use std::collections::HashMap;

pub trait LedgerStore: Send + Sync {
    /// The last committed `path -> content_hash` map for a project.
    fn snapshot(&self, project_id: &str) -> Result<HashMap<String, String>>;

    /// Commit that `path` was (re)processed successfully with `hash`.
    fn commit_upsert(&self, project_id: &str, path: &str, hash: &str) -> Result<()>;

    /// Commit that `path` was deleted and fully cascaded downstream.
    fn commit_delete(&self, project_id: &str, path: &str) -> Result<()>;
}

/// The `units` side of the Ledger & Units store (spec §6: "Required
/// tables: ... units(unit_id, file_path, kind, ...)"). Kept as its own
/// port, not bundled into `LedgerStore`, since it's keyed by unit id
/// rather than path and adapters may back the two tables differently.
pub trait UnitsStore: Send + Sync {
    /// Replace every unit previously recorded for `file_path` with
    /// `units` (spec §4.3 Consistency note via the Relationship Graph's
    /// analogous "replace outgoing edges atomically"). Returns the unit
    /// ids that existed before and are no longer present, so the caller
    /// can cascade their removal through the Vector Store and graph.
    fn replace_file_units(&self, project_id: &str, file_path: &str, units: Vec<Unit>) -> Result<Vec<String>>;

    /// Remove every unit recorded for `file_path`, returning their ids.
    fn remove_file_units(&self, project_id: &str, file_path: &str) -> Result<Vec<String>>;

    fn get_unit(&self, project_id: &str, unit_id: &str) -> Result<Option<Unit>>;

    fn list_project_units(&self, project_id: &str) -> Result<Vec<Unit>>;
}
