//! Typed configuration surface (spec §6 table).
//!
//! This module only defines and validates the surface: loading it from
//! a file or CLI flags is an external collaborator's job (spec §1,
//! Non-goals), but the struct is `serde`-deserializable from YAML so a
//! caller can wire it up trivially.

mod risk;
mod validation;

pub use risk::{RiskLevel, RiskThresholds};
pub use validation::{ConfigError, ConfigValidator};

use crate::shared::ports::Language;
use serde::{Deserialize, Serialize};

/// Duplicate-classification thresholds (spec §3 invariant 6, §4.7).
///
/// "An implementer should treat the three thresholds as the only
/// knobs and refuse to expose alternatives" (spec §9 Open Questions).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DuplicateThresholds {
    pub t_exact: f64,
    pub t_semantic: f64,
    pub t_structural: f64,
}

impl Default for DuplicateThresholds {
    fn default() -> Self {
        Self {
            t_exact: 0.98,
            t_semantic: 0.80,
            t_structural: 0.70,
        }
    }
}

/// The full recognized configuration surface (spec §6 table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub include_globs: Vec<String>,
    pub exclude_globs: Vec<String>,
    pub max_file_bytes: u64,
    pub min_block_lines: u32,
    pub languages: Vec<Language>,
    pub embedding_model_id: String,
    pub embedding_dim: usize,
    pub batch_size: usize,
    pub max_concurrency: usize,
    pub remote_cache_url: Option<String>,
    pub remote_cache_timeout_ms: u64,
    pub thresholds: DuplicateThresholds,
    pub top_k_neighbors: usize,
    pub risk_thresholds: RiskThresholds,
    pub max_error_rate: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            include_globs: vec!["**/*".to_string()],
            exclude_globs: default_exclude_globs(),
            max_file_bytes: 1_000_000,
            min_block_lines: 5,
            languages: Language::ALL.to_vec(),
            embedding_model_id: "abstract-provider-v1".to_string(),
            embedding_dim: 384,
            batch_size: 32,
            max_concurrency: 4,
            remote_cache_url: None,
            remote_cache_timeout_ms: 500,
            thresholds: DuplicateThresholds::default(),
            top_k_neighbors: 20,
            risk_thresholds: RiskThresholds::default(),
            max_error_rate: 0.05,
        }
    }
}

fn default_exclude_globs() -> Vec<String> {
    vec![
        "**/node_modules/**".to_string(),
        "**/target/**".to_string(),
        "**/dist/**".to_string(),
        "**/build/**".to_string(),
        "**/vendor/**".to_string(),
        "**/*.test.*".to_string(),
        "**/*.spec.*".to_string(),
        "**/tests/**".to_string(),
        "**/test/**".to_string(),
    ]
}

impl Config {
    pub fn from_yaml(source: &str) -> Result<Self, crate::shared::models::CodegraphError> {
        let config: Self = serde_yaml::from_str(source)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigValidator::new(self).validate()
    }
}
