//! `Embedding` entity (spec §3).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A dense vector produced for a unit by an abstract embedding provider.
///
/// All embeddings within one store share `(model_id, D)` (spec
/// invariant 3) — `D = vector.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding {
    pub unit_id: String,
    pub vector: Vec<f32>,
    pub model_id: String,
    pub created_at: DateTime<Utc>,
}

impl Embedding {
    pub fn new(unit_id: impl Into<String>, vector: Vec<f32>, model_id: impl Into<String>) -> Self {
        Self {
            unit_id: unit_id.into(),
            vector,
            model_id: model_id.into(),
            created_at: Utc::now(),
        }
    }

    pub fn dim(&self) -> usize {
        self.vector.len()
    }
}
