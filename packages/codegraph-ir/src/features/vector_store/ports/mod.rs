//! Vector Store port (C6, spec §4.6).

use crate::features::vector_store::domain::MetadataFilter;
use crate::shared::models::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMetadata {
    pub file_path: String,
    pub language: Option<String>,
    pub model_id: String,
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or replace the vector for `unit_id`. Must reject vectors
    /// whose dimension doesn't match the store's pinned `D` (spec §8
    /// Boundary: "Vector store refuses upserts with vectors of wrong
    /// dimension"), and whose `model_id` doesn't match the store's
    /// (spec invariant 3).
    async fn upsert(&self, unit_id: &str, vector: Vec<f32>, metadata: VectorMetadata) -> Result<()>;

    async fn delete(&self, unit_id: &str) -> Result<()>;

    async fn delete_by_file(&self, file_path: &str) -> Result<usize>;

    /// kNN by an arbitrary query vector. `k > N` returns all `N`
    /// results, ordered by similarity descending (spec §8 Boundary).
    async fn knn(&self, query: &[f32], k: usize, filter: Option<MetadataFilter>) -> Result<Vec<(String, f64)>>;

    /// kNN using a unit's own stored vector as the query.
    async fn knn_by_id(&self, unit_id: &str, k: usize, filter: Option<MetadataFilter>) -> Result<Vec<(String, f64)>>;

    async fn get_vector(&self, unit_id: &str) -> Result<Option<Vec<f32>>>;

    fn dimension(&self) -> usize;

    fn model_id(&self) -> &str;

    async fn len(&self) -> Result<usize>;
}
