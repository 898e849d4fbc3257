//! SQLite-backed `VectorStore` (spec §4.6) — exact cosine scan over a
//! packed little-endian f32 blob per row. "Exact scan is the required
//! correctness fallback for small N" (spec §4.6); an ANN index is an
//! explicit Non-goal, so this adapter is the store, not a fallback path
//! within it.

use crate::connection::SqliteDb;
use crate::error::StorageError;
use async_trait::async_trait;
use codegraph_ir::features::vector_store::{cosine, MetadataFilter, VectorMetadata, VectorStore};
use codegraph_ir::{CodegraphError, Result};
use rusqlite::params;

pub struct SqliteVectorStore {
    db: SqliteDb,
    dimension: usize,
    model_id: String,
}

impl SqliteVectorStore {
    pub fn new(db: SqliteDb, dimension: usize, model_id: impl Into<String>) -> Self {
        Self {
            db,
            dimension,
            model_id: model_id.into(),
        }
    }
}

fn pack(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn unpack(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn join_err(e: tokio::task::JoinError) -> CodegraphError {
    CodegraphError::vector_store(format!("blocking task panicked: {e}"))
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
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

        let db = self.db.clone();
        let unit_id = unit_id.to_string();
        let dim = self.dimension as i64;
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = db.conn.lock();
            let blob = pack(&vector);
            conn.execute(
                "INSERT INTO vectors (unit_id, model_id, dim, vector, file_path, language)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT(unit_id) DO UPDATE SET
                    model_id = excluded.model_id,
                    dim = excluded.dim,
                    vector = excluded.vector,
                    file_path = excluded.file_path,
                    language = excluded.language",
                params![unit_id, metadata.model_id, dim, blob, metadata.file_path, metadata.language],
            )
            .map_err(StorageError::from)?;
            Ok(())
        })
        .await
        .map_err(join_err)??;
        Ok(())
    }

    async fn delete(&self, unit_id: &str) -> Result<()> {
        let db = self.db.clone();
        let unit_id = unit_id.to_string();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let conn = db.conn.lock();
            conn.execute("DELETE FROM vectors WHERE unit_id = ?1", params![unit_id])
                .map_err(StorageError::from)?;
            Ok(())
        })
        .await
        .map_err(join_err)??;
        Ok(())
    }

    async fn delete_by_file(&self, file_path: &str) -> Result<usize> {
        let db = self.db.clone();
        let file_path = file_path.to_string();
        tokio::task::spawn_blocking(move || -> Result<usize> {
            let conn = db.conn.lock();
            let removed = conn
                .execute("DELETE FROM vectors WHERE file_path = ?1", params![file_path])
                .map_err(StorageError::from)?;
            Ok(removed)
        })
        .await
        .map_err(join_err)?
    }

    async fn knn(&self, query: &[f32], k: usize, filter: Option<MetadataFilter>) -> Result<Vec<(String, f64)>> {
        if query.len() != self.dimension {
            return Err(CodegraphError::vector_store(format!(
                "query dimension mismatch: expected {}, got {}",
                self.dimension,
                query.len()
            )));
        }

        let db = self.db.clone();
        let model_id = self.model_id.clone();
        let rows = tokio::task::spawn_blocking(move || -> Result<Vec<(String, Vec<u8>, String, Option<String>)>> {
            let conn = db.conn.lock();
            let mut stmt = conn
                .prepare("SELECT unit_id, vector, file_path, language FROM vectors WHERE model_id = ?1")
                .map_err(StorageError::from)?;
            let rows = stmt
                .query_map(params![model_id], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, Vec<u8>>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, Option<String>>(3)?,
                    ))
                })
                .map_err(StorageError::from)?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row.map_err(StorageError::from)?);
            }
            Ok(out)
        })
        .await
        .map_err(join_err)??;

        let query = query.to_vec();
        let mut scored: Vec<(String, f64)> = rows
            .into_iter()
            .filter(|(_, _, file_path, language)| {
                filter
                    .as_ref()
                    .map(|f| f.matches(file_path, language.as_deref()))
                    .unwrap_or(true)
            })
            .map(|(unit_id, blob, _, _)| (unit_id, cosine(&query, &unpack(&blob))))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }

    async fn knn_by_id(&self, unit_id: &str, k: usize, filter: Option<MetadataFilter>) -> Result<Vec<(String, f64)>> {
        match self.get_vector(unit_id).await? {
            Some(vector) => self.knn(&vector, k, filter).await,
            None => Ok(Vec::new()),
        }
    }

    async fn get_vector(&self, unit_id: &str) -> Result<Option<Vec<f32>>> {
        let db = self.db.clone();
        let unit_id = unit_id.to_string();
        let blob = tokio::task::spawn_blocking(move || -> Result<Option<Vec<u8>>> {
            let conn = db.conn.lock();
            let mut stmt = conn
                .prepare("SELECT vector FROM vectors WHERE unit_id = ?1")
                .map_err(StorageError::from)?;
            let mut rows = stmt.query(params![unit_id]).map_err(StorageError::from)?;
            if let Some(row) = rows.next().map_err(StorageError::from)? {
                Ok(Some(row.get::<_, Vec<u8>>(0).map_err(StorageError::from)?))
            } else {
                Ok(None)
            }
        })
        .await
        .map_err(join_err)??;
        Ok(blob.map(|b| unpack(&b)))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn len(&self) -> Result<usize> {
        let db = self.db.clone();
        tokio::task::spawn_blocking(move || -> Result<usize> {
            let conn = db.conn.lock();
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM vectors", [], |row| row.get(0))
                .map_err(StorageError::from)?;
            Ok(count as usize)
        })
        .await
        .map_err(join_err)?
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

    fn store() -> SqliteVectorStore {
        SqliteVectorStore::new(SqliteDb::open_in_memory().unwrap(), 2, "m1")
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_dimension() {
        let store = store();
        let err = store.upsert("u1", vec![1.0], meta("a.py")).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn upsert_rejects_wrong_model_id() {
        let store = store();
        let mut bad_meta = meta("a.py");
        bad_meta.model_id = "other".to_string();
        let err = store.upsert("u1", vec![1.0, 0.0], bad_meta).await;
        assert!(err.is_err());
    }

    #[tokio::test]
    async fn knn_orders_by_similarity_descending() {
        let store = store();
        store.upsert("near", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("far", vec![0.0, 1.0], meta("b.py")).await.unwrap();
        let results = store.knn(&[1.0, 0.1], 2, None).await.unwrap();
        assert_eq!(results[0].0, "near");
    }

    #[tokio::test]
    async fn knn_k_greater_than_n_returns_all() {
        let store = store();
        store.upsert("u1", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        let results = store.knn(&[1.0, 0.0], 50, None).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn filter_applied_during_search_not_after() {
        let store = store();
        store.upsert("self", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("other", vec![0.9, 0.1], meta("b.py")).await.unwrap();
        let filter = MetadataFilter::exclude_file("a.py");
        let results = store.knn(&[1.0, 0.0], 5, Some(filter)).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].0, "other");
    }

    #[tokio::test]
    async fn delete_by_file_cascades() {
        let store = store();
        store.upsert("u1", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("u2", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("u3", vec![1.0, 0.0], meta("b.py")).await.unwrap();
        let removed = store.delete_by_file("a.py").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn upsert_then_upsert_again_overwrites_not_duplicates() {
        let store = store();
        store.upsert("u1", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("u1", vec![0.0, 1.0], meta("a.py")).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
        let v = store.get_vector("u1").await.unwrap().unwrap();
        assert_eq!(v, vec![0.0, 1.0]);
    }

    #[tokio::test]
    async fn knn_by_id_uses_stored_vector_as_query() {
        let store = store();
        store.upsert("a", vec![1.0, 0.0], meta("a.py")).await.unwrap();
        store.upsert("b", vec![0.9, 0.1], meta("b.py")).await.unwrap();
        let results = store.knn_by_id("a", 2, None).await.unwrap();
        assert_eq!(results[0].0, "a");
    }
}
