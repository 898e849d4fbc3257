//! Risk banding for impact analysis (spec §4.8).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

/// Count cut-offs mapping total affected count to a risk band (spec §6,
/// §8 scenario 5: defaults `critical>50, high>20, medium>10`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub medium: usize,
    pub high: usize,
    pub critical: usize,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            medium: 10,
            high: 20,
            critical: 50,
        }
    }
}

impl RiskThresholds {
    /// Classify a total affected-node count into a risk band.
    pub fn classify(&self, total_affected: usize) -> RiskLevel {
        if total_affected > self.critical {
            RiskLevel::Critical
        } else if total_affected > self.high {
            RiskLevel::High
        } else if total_affected > self.medium {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_thresholds_match_spec_scenario_5() {
        let t = RiskThresholds::default();
        // "A class Base with 12 transitive dependents... risk is medium"
        assert_eq!(t.classify(12), RiskLevel::Medium);
        assert_eq!(t.classify(10), RiskLevel::Low);
        assert_eq!(t.classify(21), RiskLevel::High);
        assert_eq!(t.classify(51), RiskLevel::Critical);
    }
}
