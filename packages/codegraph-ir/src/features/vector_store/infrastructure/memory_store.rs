//! In-memory `VectorStore` (spec §4.6 "Exact scan is the required
//! correctness fallback for small N") — also the default test/
//! benchmark implementation; `codegraph-storage` provides the
//! SQLite-backed one for N up to ~10^6.

use crate::features::vector_store::domain::{cosine, MetadataFilter};
use crate::features::vector_store::ports::{VectorMetadata, VectorStore};
use crate::shared::models::{CodegraphError, Result};
use async_trait::async_trait;
use dashmap::DashMap;

struct Entry {
    vector: Vec<f32>,
    metadata: VectorMetadata,
}

pub struct InMemoryVectorStore {
    entries: DashMap<String, Entry>,
    dimension: usize,
    model_id: String,
}

impl InMemoryVectorStore {
    pub fn new(dimension: usize, model_id: impl Into<String>) -> Self {
        Self {
            entries: DashMap::new(),
            dimension,
            model_id: model_id.into(),
        }
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn upsert(&self, unit_id: &str, vector: Vec<f32>, metadata: VectorMetadata) -> Result<()> {
        if vector.len() != self.dimension {
            return Err(CodegraphError::vector_store(format!(
                "dimension mismatch: expected {}, got {}",
                self.dimension,
                vector.len()
            )));
        }
        if metadata.model_id != self.model_id {
            return Err(CodegraphError::vector_store(format!(
                "model_id mismatch: store pinned to {}, got {}",
                self.model_id, metadata.model_id
            )));
        }
        self.entries.insert(unit_id.to_string(), Entry { vector, metadata });
        Ok(())
    }

    async fn delete(&self, unit_id: &str) -> Result<()> {
        self.entries.remove(unit_id);
        Ok(())
    }

    async fn delete_by_file(&self, file_path: &str) -> Result<usize> {
        let before = self.entries.len();
        self.entries.retain(|_, e| e.metadata.file_path != file_path);
        Ok(before - self.entries.len())
    }

    async fn knn(&self, query: &[f32], k: usize, filter: Option<MetadataFilter>) -> Result<Vec<(String, f64)>> {
        if query.len() != self.dimension {
            return Err(CodegraphError::vector_store(format!(
                "query dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            )));
        }
        let mut scored: Vec<(String, f64)> = self
            .entries
            .iter()
            .filter(|e| {
                filter
                    .as_ref()
                    .map(|f| f.matches(&e.metadata.file_path, e.metadata.language.as_deref()))
                    .unwrap_or(true)
            })
            .map(|e| (e.key().clone(), cosine(query, &e.value().vector)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn knn_by_id(&self, unit_id: &str, k: usize, filter: Option<MetadataFilter>) -> Result<Vec<(String, f64)>> {
        let Some(entry) = self.entries.get(unit_id) else {
            return Ok(Vec::new());
        };
        let query = entry.vector.clone();
        drop(entry);
        self.knn(&query, k, filter).await
    }

    async fn get_vector(&self, unit_id: &str) -> Result<Option<Vec<f32>>> {
        Ok(self.entries.get(unit_id).map(|e| e.vector.clone()))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(file_path: &str) -> VectorMetadata {
        VectorMetadata {
            file_path: file_path.to_string(),
            language: Some("python".to_string()),
            model_id: "m1".to_string(),
        }
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_dimension() {
        let store = InMemoryVectorStore::new(4, "m1");
        let err = store.upsert("u1", vec![1.0, 2.0], meta("a.py")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn knn_orders_by_similarity_descending() {
        let store = InMemoryVectorStore::new(2, "m1");
        store.upsert("near", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("far", vec![0.0, 1.0], meta("b.py")).await.unwrap();
        let results = store.knn(&[1.0, 0.1], 2, None).await.unwrap();
        assert_eq!(results[0].0, "near");
    }

    #[tokio::test]
    async fn knn_k_greater_than_n_returns_all() {
        let store = InMemoryVectorStore::new(2, "m1");
        store.upsert("u1", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        let results = store.knn(&[1.0, 0.0], 50, None).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn filter_applied_during_search_not_after() {
        let store = InMemoryVectorStore::new(2, "m1");
        store.upsert("self", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("other", vec![0.9, 0.1], meta("b.py")).await.unwrap();
        let filter = crate::features::vector_store::domain::MetadataFilter::exclude_file("a.py");
        let results = store.knn(&[1.0, 0.0], 5, Some(filter)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "other");
    }

    #[tokio::test]
    async fn delete_by_file_cascades() {
        let store = InMemoryVectorStore::new(2, "m1");
        store.upsert("u1", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("u2", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("u3", vec![1.0, 0.0], meta("b.py")).await.unwrap();
        let removed = store.delete_by_file("a.py").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len().await.unwrap(), 1);
    }
}
