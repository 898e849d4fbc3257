//! `ChangeRecord` entity (spec §3) — the output of the Change Ledger's classification.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub path: String,
    pub prev_hash: Option<String>,
    pub new_hash: Option<String>,
    pub status: ChangeStatus,
}

/// Aggregate counts returned by `Ledger::classify` (spec §4.2 contract).
///
/// `unchanged` is a count only — unchanged paths are never materialized
/// as a list (spec §4.2: "unchanged is not materialized as a list, only
/// counted").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeCounts {
    pub added: usize,
    pub modified: usize,
    pub deleted: usize,
    pub unchanged: usize,
}
