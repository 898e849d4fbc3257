//! Relationship Graph domain types (spec §4.8).

use crate::config::RiskLevel;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Traversal direction relative to a unit (spec §4.8 `neighbors`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Out,
    In,
    Both,
}

/// Result of `traverse` (spec §4.8): every node reached within
/// `max_depth`, plus one (shortest) path per reached node from the
/// start node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraversalResult {
    pub visited_nodes: Vec<String>,
    pub paths: Vec<Vec<String>>,
}

/// Result of `impact` (spec §4.8): counts of affected units bucketed
/// by kind, plus a risk band.
///
/// Buckets are unit kinds (`class`, `method`, `function`, `block`)
/// keyed by their `UnitKind::as_str()`, plus a `test` bucket for
/// affected units whose file path looks test-shaped (spec §8 scenario
/// 5's "2 tests"). Extraction excludes test directories outright
/// (spec §4.3), so this bucket is a best-effort filename heuristic
/// (`*_test.*`, `*.test.*`, `test_*.*`) over whatever units did get
/// extracted, not a guarantee of completeness — see DESIGN.md.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactResult {
    pub target_unit_id: String,
    pub affected_total: usize,
    pub affected_by_kind: BTreeMap<String, usize>,
    pub risk: RiskLevel,
}

/// Edge kinds considered "dependent on" relationships for impact
/// analysis (spec §8 scenario 5: "through extends and calls"). Deliberately
/// excludes `Contains` (structural, not a dependency) and the derived
/// `SimilarTo`/`PartOf` kinds.
pub const IMPACT_KINDS: [crate::domain::EdgeKind; 3] = [
    crate::domain::EdgeKind::Calls,
    crate::domain::EdgeKind::Extends,
    crate::domain::EdgeKind::Implements,
];

pub fn looks_like_test_path(file_path: &str) -> bool {
    let lower = file_path.to_lowercase();
    let file_name = lower.rsplit('/').next().unwrap_or(&lower);
    file_name.starts_with("test_")
        || file_name.contains("_test.")
        || file_name.contains(".test.")
        || file_name.contains("_spec.")
        || file_name.contains(".spec.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_common_test_filename_shapes() {
        assert!(looks_like_test_path("src/test_auth.py"));
        assert!(looks_like_test_path("src/auth.test.ts"));
        assert!(looks_like_test_path("src/auth_spec.rb"));
        assert!(!looks_like_test_path("src/auth.py"));
    }
}
