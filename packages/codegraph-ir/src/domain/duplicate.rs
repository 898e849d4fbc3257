//! `DuplicateGroup` entity (spec §3) — transient, recomputed per report request.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateType {
    Exact,
    Semantic,
    Structural,
}

impl DuplicateType {
    /// Rank used for tie-breaking (spec §4.7: "higher type rank wins").
    pub fn rank(&self) -> u8 {
        match self {
            DuplicateType::Exact => 2,
            DuplicateType::Semantic => 1,
            DuplicateType::Structural => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicateType::Exact => "exact",
            DuplicateType::Semantic => "semantic",
            DuplicateType::Structural => "structural",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateGroup {
    pub group_id: String,
    #[serde(rename = "type")]
    pub kind: DuplicateType,
    pub similarity: f64,
    pub members: Vec<String>,
    pub representative_unit_id: String,
    pub estimated_lines_saved: u64,
    /// Rule-based consolidation hint (spec §4.7 "Reporting").
    pub consolidation_hint: String,
}
