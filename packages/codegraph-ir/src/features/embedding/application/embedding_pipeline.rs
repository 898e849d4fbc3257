//! Embedding Pipeline use-case (C4, spec §4.5).

use crate::config::Config;
use crate::features::cache::{embedding_key, TieredCache};
use crate::features::embedding::domain::{build_embedding_text, EmbeddingRequest, TEMPLATE_VERSION};
use crate::features::embedding::ports::EmbeddingProvider;
use crate::features::vector_store::{VectorMetadata, VectorStore};
use crate::domain::Unit;
use crate::shared::models::{CodegraphError, Result};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const MAX_ATTEMPTS: u32 = 4;
const BASE_BACKOFF_MS: u64 = 50;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EmbeddingRunOutcome {
    pub embedded: usize,
    pub cache_hits: usize,
    pub failed: usize,
    /// `true` if the run stayed within `MAX_ERROR_RATE` and committed;
    /// `false` if too many units failed (spec §4.5 Failure).
    pub succeeded: bool,
}

pub struct EmbeddingPipeline {
    provider: Arc<dyn EmbeddingProvider>,
    cache: Arc<TieredCache>,
    vector_store: Arc<dyn VectorStore>,
    batch_size: usize,
    max_concurrency: usize,
    max_error_rate: f64,
}

impl EmbeddingPipeline {
    pub fn new(
        provider: Arc<dyn EmbeddingProvider>,
        cache: Arc<TieredCache>,
        vector_store: Arc<dyn VectorStore>,
        config: &Config,
    ) -> Self {
        Self {
            provider,
            cache,
            vector_store,
            batch_size: config.batch_size,
            max_concurrency: config.max_concurrency,
            max_error_rate: config.max_error_rate,
        }
    }

    /// Embed every unit lacking a current embedding. `units` must
    /// already be filtered to those whose `normalized_hash` changed or
    /// who have no embedding at all (spec invariant 2) — that
    /// filtering is the caller's (pipeline orchestrator's) job since it
    /// needs the ledger/store state this module doesn't hold.
    ///
    /// Batches run with up to `max_concurrency` in flight at once (spec
    /// §4.5 "Resource policy" / §5 "Embedding provider: rate-limited by
    /// a global semaphore of MAX_CONCURRENCY"), each task holding one
    /// permit for its lifetime; output order doesn't matter once
    /// batches are merged, since every unit is independently keyed by
    /// `unit_id` at the vector-store write.
    pub async fn run(&self, units: &[Unit]) -> Result<EmbeddingRunOutcome> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrency.max(1)));
        let total = units.len();

        let mut tasks = JoinSet::new();
        for batch in units.chunks(self.batch_size.max(1)) {
            let permit = semaphore.clone().acquire_owned().await.map_err(|e| {
                CodegraphError::embedding(format!("semaphore closed: {e}"))
            })?;
            let provider = self.provider.clone();
            let cache = self.cache.clone();
            let vector_store = self.vector_store.clone();
            let owned_batch: Vec<Unit> = batch.to_vec();
            tasks.spawn(async move {
                let outcome = run_batch(&provider, &cache, &vector_store, &owned_batch).await;
                drop(permit);
                outcome
            });
        }

        let mut outcome = EmbeddingRunOutcome::default();
        while let Some(joined) = tasks.join_next().await {
            let batch_outcome = joined.map_err(|e| CodegraphError::embedding(format!("embedding task panicked: {e}")))?;
            outcome.embedded += batch_outcome.embedded;
            outcome.cache_hits += batch_outcome.cache_hits;
            outcome.failed += batch_outcome.failed;
        }

        let processed = outcome.embedded + outcome.cache_hits;
        let error_rate = if total == 0 { 0.0 } else { outcome.failed as f64 / total as f64 };
        outcome.succeeded = error_rate <= self.max_error_rate;
        if !outcome.succeeded {
            warn!(
                error_rate,
                max_error_rate = self.max_error_rate,
                processed,
                failed = outcome.failed,
                "embedding pipeline: error rate exceeded threshold, run failed"
            );
        }
        Ok(outcome)
    }
}

async fn run_batch(
    provider: &Arc<dyn EmbeddingProvider>,
    cache: &Arc<TieredCache>,
    vector_store: &Arc<dyn VectorStore>,
    batch: &[Unit],
) -> EmbeddingRunOutcome {
    let mut outcome = EmbeddingRunOutcome::default();
    let mut to_fetch: Vec<(usize, String, String)> = Vec::new(); // (index, key, text)
    let mut results: Vec<Option<Vec<f32>>> = vec![None; batch.len()];

    for (i, unit) in batch.iter().enumerate() {
        let text = build_embedding_text(unit, &unit.raw_text);
        let key = format!("{}:{}", embedding_key(&text, provider.model_id()), TEMPLATE_VERSION);
        match cache.get(&key).await {
            Ok(Some(bytes)) => {
                if let Ok(vector) = deserialize_vector(&bytes) {
                    results[i] = Some(vector);
                    outcome.cache_hits += 1;
                    continue;
                }
            }
            _ => {}
        }
        to_fetch.push((i, key, text));
    }

    if !to_fetch.is_empty() {
        let texts: Vec<String> = to_fetch.iter().map(|(_, _, t)| t.clone()).collect();
        match embed_with_retry(provider, &texts).await {
            Ok(vectors) => {
                for ((i, key, _), vector) in to_fetch.iter().zip(vectors.into_iter()) {
                    let _ = cache.set(key, serialize_vector(&vector)).await;
                    results[*i] = Some(vector);
                }
            }
            Err(err) => {
                warn!(error = %err, batch_size = to_fetch.len(), "embedding pipeline: batch failed after retries");
                outcome.failed += to_fetch.len();
            }
        }
    }

    for (unit, vector) in batch.iter().zip(results.into_iter()) {
        let Some(vector) = vector else { continue };
        let metadata = VectorMetadata {
            file_path: unit.file_path.clone(),
            language: Some(unit.language.name().to_string()),
            model_id: provider.model_id().to_string(),
        };
        match vector_store.upsert(&unit.unit_id, vector, metadata).await {
            Ok(()) => outcome.embedded += 1,
            Err(err) => {
                warn!(unit_id = %unit.unit_id, error = %err, "embedding pipeline: vector store upsert failed");
                outcome.failed += 1;
            }
        }
    }

    outcome
}

async fn embed_with_retry(provider: &Arc<dyn EmbeddingProvider>, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    let mut attempt = 0u32;
    loop {
        attempt += 1;
        match provider.embed_batch(texts).await {
            Ok(vectors) => return Ok(vectors),
            Err(err) if attempt < MAX_ATTEMPTS => {
                let backoff = BASE_BACKOFF_MS * 2u64.pow(attempt - 1);
                debug!(attempt, backoff_ms = backoff, error = %err, "embedding provider call failed, retrying");
                tokio::time::sleep(std::time::Duration::from_millis(backoff)).await;
            }
            Err(err) => return Err(err),
        }
    }
}

fn serialize_vector(vector: &[f32]) -> Vec<u8> {
    vector.iter().flat_map(|f| f.to_le_bytes()).collect()
}

fn deserialize_vector(bytes: &[u8]) -> Result<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(CodegraphError::cache("corrupt cached vector"));
    }
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitKind;
    use crate::features::cache::{InMemoryTier, MokaTier};
    use crate::features::embedding::infrastructure::DeterministicProvider;
    use crate::features::vector_store::InMemoryVectorStore;
    use crate::shared::ports::Language;

    fn make_unit(name: &str) -> Unit {
        Unit::new(
            "a.py",
            UnitKind::Function,
            name,
            name,
            1,
            5,
            Language::Python,
            format!("def {name}(): pass"),
            format!("hash-{name}"),
        )
    }

    fn pipeline(dim: usize) -> (EmbeddingPipeline, Arc<InMemoryVectorStore>) {
        let provider = Arc::new(DeterministicProvider::new("m1", dim));
        let cache = Arc::new(TieredCache::new(Arc::new(MokaTier::default()), Some(Arc::new(InMemoryTier::new("l2"))), None, 500));
        let store = Arc::new(InMemoryVectorStore::new(dim, "m1"));
        let config = Config {
            batch_size: 2,
            max_concurrency: 2,
            ..Config::default()
        };
        (
            EmbeddingPipeline::new(provider, cache, store.clone(), &config),
            store,
        )
    }

    #[tokio::test]
    async fn embeds_all_units_and_writes_to_vector_store() {
        let (pipeline, store) = pipeline(8);
        let units = vec![make_unit("a"), make_unit("b"), make_unit("c")];
        let outcome = pipeline.run(&units).await.unwrap();
        assert_eq!(outcome.embedded, 3);
        assert!(outcome.succeeded);
        assert_eq!(store.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn second_run_hits_cache() {
        let (pipeline, _store) = pipeline(8);
        let units = vec![make_unit("a")];
        let first = pipeline.run(&units).await.unwrap();
        assert_eq!(first.embedded, 1);
        let second = pipeline.run(&units).await.unwrap();
        assert_eq!(second.cache_hits, 1);
        assert_eq!(second.embedded, 0);
    }
}
