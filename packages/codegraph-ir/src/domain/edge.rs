//! `Edge` entity (spec §3) — typed, directed relationships between units.

use serde::{Deserialize, Serialize};

/// Edge kinds. `Calls`, `Imports`, `Extends`, `Implements`, `Contains`
/// are extracted; `SimilarTo` and `PartOf` are derived by the
/// similarity engine (spec §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Calls,
    Imports,
    Extends,
    Implements,
    Contains,
    SimilarTo,
    PartOf,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Calls => "calls",
            EdgeKind::Imports => "imports",
            EdgeKind::Extends => "extends",
            EdgeKind::Implements => "implements",
            EdgeKind::Contains => "contains",
            EdgeKind::SimilarTo => "similar_to",
            EdgeKind::PartOf => "part_of",
        }
    }

    /// Edges extracted directly from the AST, as opposed to derived ones.
    pub fn is_static(&self) -> bool {
        !matches!(self, EdgeKind::SimilarTo | EdgeKind::PartOf)
    }
}

/// A directed edge between two units (spec invariant 4: both endpoints
/// must exist; cascading delete on unit removal is enforced by the
/// Relationship Graph, not by this value type).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub src_unit_id: String,
    pub dst_unit_id: String,
    pub kind: EdgeKind,
    pub weight: Option<f64>,
    pub evidence: Option<String>,
    /// True for name-only call resolution that could not be confirmed
    /// (REDESIGN FLAGS §9).
    pub unresolved: bool,
}

impl Edge {
    pub fn new(src_unit_id: impl Into<String>, dst_unit_id: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            src_unit_id: src_unit_id.into(),
            dst_unit_id: dst_unit_id.into(),
            kind,
            weight: None,
            evidence: None,
            unresolved: false,
        }
    }

    pub fn unresolved(mut self) -> Self {
        self.unresolved = true;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}
