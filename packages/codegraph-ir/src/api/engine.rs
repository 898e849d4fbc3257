//! The pipeline orchestrator and Query API (spec §4, §5, §6).
//!
//! `Engine::ingest` wires Scanner -> Change Ledger -> Unit Extractor ->
//! Embedding Pipeline -> Vector Store / Relationship Graph into one
//! pass, one path at a time, so a crash or cancellation mid-pass never
//! leaves the ledger pointing past what downstream components actually
//! committed (spec §4.2, §5). The query half (`search`, `find_similar`,
//! `duplicate_report`, `neighbors`, `traverse`, `impact`) reads back
//! over whatever store state the last successful `ingest` produced.

use crate::api::types::{IngestReport, SearchResult};
use crate::config::{Config, DuplicateThresholds};
use crate::domain::{ChangeStatus, Edge, EdgeKind, Unit};
use crate::features::cache::TieredCache;
use crate::features::embedding::{EmbeddingPipeline, EmbeddingProvider};
use crate::features::extraction::{resolve_references, ExtractionOutcome, Extractor, PendingReference};
use crate::features::graph::{Direction, GraphStore, ImpactResult, RelationshipGraph, TraversalResult};
use crate::features::ledger::{ChangeLedger, LedgerStore, UnitsStore};
use crate::features::scanner::Scanner;
use crate::features::similarity::{DuplicateEngine, DuplicateReport, SimilarityMatch};
use crate::features::vector_store::{MetadataFilter, VectorStore};
use crate::shared::models::{CodegraphError, Result, Span};
use crate::shared::ports::Language;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

const SNIPPET_MAX_CHARS: usize = 240;

/// Everything the orchestrator needs, injected at construction
/// (REDESIGN FLAGS §9: "dependency inversion... the pipeline
/// orchestrator should accept trait objects for every store").
pub struct Engine {
    config: Config,
    ledger_store: Arc<dyn LedgerStore>,
    units_store: Arc<dyn UnitsStore>,
    vector_store: Arc<dyn VectorStore>,
    graph_store: Arc<dyn GraphStore>,
    cache: Arc<TieredCache>,
    provider: Arc<dyn EmbeddingProvider>,
    extractor: Extractor,
}

impl Engine {
    /// Validates `config` and checks that the embedding provider and
    /// vector store both agree with `config.embedding_dim` (spec §6
    /// "embedding_dim pins the vector store's schema"; spec §7
    /// `SchemaMismatch` is fatal at init, before any writes).
    pub fn new(
        config: Config,
        ledger_store: Arc<dyn LedgerStore>,
        units_store: Arc<dyn UnitsStore>,
        vector_store: Arc<dyn VectorStore>,
        graph_store: Arc<dyn GraphStore>,
        cache: Arc<TieredCache>,
        provider: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        config
            .validate()
            .map_err(|e| CodegraphError::config(e.to_string()))?;

        if provider.dimension() != config.embedding_dim {
            return Err(CodegraphError::config(format!(
                "embedding provider dimension {} does not match configured embedding_dim {}",
                provider.dimension(),
                config.embedding_dim
            )));
        }
        if vector_store.dimension() != config.embedding_dim {
            return Err(CodegraphError::config(format!(
                "vector store dimension {} does not match configured embedding_dim {}",
                vector_store.dimension(),
                config.embedding_dim
            )));
        }

        let extractor = Extractor::new(&config);
        Ok(Self {
            config,
            ledger_store,
            units_store,
            vector_store,
            graph_store,
            cache,
            provider,
            extractor,
        })
    }

    // ---- ingest ---------------------------------------------------

    pub async fn ingest(&self, project_id: &str, root: impl AsRef<Path>) -> Result<IngestReport> {
        self.ingest_cancellable(project_id, root, &AtomicBool::new(false)).await
    }

    /// As `ingest`, but checked against `cancel` between every file
    /// (spec §5: "cancellation takes effect at the next file
    /// boundary... whatever has already been committed remains valid").
    pub async fn ingest_cancellable(
        &self,
        project_id: &str,
        root: impl AsRef<Path>,
        cancel: &AtomicBool,
    ) -> Result<IngestReport> {
        let root = root.as_ref();
        let scan = Scanner::new(&self.config).scan(root);
        let ledger = ChangeLedger::new(self.ledger_store.as_ref());
        let classify = ledger.classify(project_id, root, &scan.files)?;

        let mut report = IngestReport {
            counts: classify.counts,
            scan_skipped: scan.skipped_entries,
            ..Default::default()
        };

        for record in classify.records.iter().filter(|r| r.status == ChangeStatus::Deleted) {
            if cancel.load(Ordering::SeqCst) {
                report.cancelled = true;
                return Ok(report);
            }
            match self.process_deletion(project_id, &record.path).await {
                Ok(()) => report.files_processed += 1,
                Err(err) => {
                    warn!(path = %record.path, error = %err, "ingest: failed to process deletion");
                    report.files_failed += 1;
                }
            }
        }

        let mut all_units: Vec<Unit> = Vec::new();
        let mut committed_paths: Vec<(String, String)> = Vec::new();
        let mut all_pending: Vec<PendingReference> = Vec::new();

        // Parsing is CPU-bound and per-file independent, so it runs as
        // a bounded-by-rayon-pool parallel pre-pass across every
        // changed path before any sequential store write begins (spec
        // §5 "stages run in parallel" / "bounded worker pool"),
        // grounded on the teacher's `.par_iter().map(...).collect()`
        // clone-detection idiom. Nothing is committed here — reads and
        // parses are side-effect-free, so a cancellation observed by
        // the apply loop below still discards any unreached results
        // without leaving partial store state.
        let changed_records: Vec<&crate::domain::ChangeRecord> = classify
            .records
            .iter()
            .filter(|r| matches!(r.status, ChangeStatus::Added | ChangeStatus::Modified))
            .collect();
        let mut extracted: HashMap<String, Result<ExtractionOutcome>> = changed_records
            .par_iter()
            .map(|record| (record.path.clone(), self.extract_file(root, &record.path)))
            .collect();

        for record in &changed_records {
            if cancel.load(Ordering::SeqCst) {
                report.cancelled = true;
                return Ok(report);
            }
            let outcome = extracted
                .remove(&record.path)
                .expect("every changed record was extracted in the pre-pass above");
            match outcome {
                Ok(outcome) => {
                    match self.apply_extraction(project_id, &record.path, &outcome).await {
                        Ok(()) => {
                            report.files_processed += 1;
                            if outcome.parse_failed {
                                report.parse_failures += 1;
                            }
                            all_units.extend(outcome.units);
                            all_pending.extend(outcome.pending);
                            if let Some(hash) = &record.new_hash {
                                committed_paths.push((record.path.clone(), hash.clone()));
                            }
                        }
                        Err(err) => {
                            warn!(path = %record.path, error = %err, "ingest: failed to commit extracted file");
                            report.files_failed += 1;
                        }
                    }
                }
                Err(err) => {
                    warn!(path = %record.path, error = %err, "ingest: failed to process file");
                    report.files_failed += 1;
                }
            }
        }

        // Second-pass name resolution against the full current project
        // unit table, so calls/extends/implements that cross a file
        // boundary still resolve (spec §4.3 "Edge extraction").
        if !all_pending.is_empty() {
            let project_units = self.units_store.list_project_units(project_id)?;
            let resolved = resolve_references(&project_units, &all_pending);
            if !resolved.is_empty() {
                let graph = RelationshipGraph::new(self.graph_store.as_ref(), self.config.risk_thresholds);
                let mut by_src: HashMap<String, Vec<Edge>> = HashMap::new();
                for edge in resolved {
                    by_src.entry(edge.src_unit_id.clone()).or_default().push(edge);
                }
                for (src, edges) in by_src {
                    let mut existing = graph.neighbors(&src, None, Direction::Out)?;
                    existing.retain(|e| e.kind == crate::domain::EdgeKind::Contains);
                    existing.extend(edges);
                    graph.replace_unit_edges(&src, existing)?;
                }
            }
        }

        // Embedding pipeline runs once over every unit from every
        // changed file this pass (cache hits absorb the units whose
        // normalized_hash didn't actually change, spec invariant 2).
        if all_units.is_empty() {
            report.embedding_succeeded = true;
        } else {
            let pipeline = EmbeddingPipeline::new(
                self.provider.clone(),
                self.cache.clone(),
                self.vector_store.clone(),
                &self.config,
            );
            let outcome = pipeline.run(&all_units).await?;
            report.units_embedded = outcome.embedded;
            report.units_cache_hits = outcome.cache_hits;
            report.units_failed = outcome.failed;
            report.embedding_succeeded = outcome.succeeded;
        }

        if report.embedding_succeeded {
            for (path, hash) in &committed_paths {
                ledger.commit_path(project_id, path, hash)?;
            }
        } else {
            warn!(
                project_id,
                "ingest: embedding run exceeded max_error_rate, ledger commit withheld for this pass"
            );
        }

        Ok(report)
    }

    async fn process_deletion(&self, project_id: &str, path: &str) -> Result<()> {
        let removed_unit_ids = self.units_store.remove_file_units(project_id, path)?;
        for unit_id in &removed_unit_ids {
            self.vector_store.delete(unit_id).await?;
        }
        self.vector_store.delete_by_file(path).await?;

        let graph = RelationshipGraph::new(self.graph_store.as_ref(), self.config.risk_thresholds);
        graph.delete_units(&removed_unit_ids)?;

        let ledger = ChangeLedger::new(self.ledger_store.as_ref());
        ledger.commit_deletion(project_id, path)
    }

    /// Read and parse one changed file into its units/edges/pending
    /// references. Pure and side-effect-free (no store writes), so it
    /// is safe to call from multiple rayon worker threads at once.
    fn extract_file(&self, root: &Path, path: &str) -> Result<ExtractionOutcome> {
        let full_path = root.join(path);
        let content = std::fs::read_to_string(&full_path)
            .map_err(|e| CodegraphError::from(e).with_file(path.to_string()))?;
        let language = Language::from_file_path(path);
        Ok(self.extractor.extract(path, &content, language))
    }

    /// Write one file's already-extracted units/edges into the units
    /// store and relationship graph (the sequential, single-writer
    /// half of per-file processing).
    async fn apply_extraction(&self, project_id: &str, path: &str, outcome: &ExtractionOutcome) -> Result<()> {
        let removed_ids = self.units_store.replace_file_units(project_id, path, outcome.units.clone())?;
        for unit_id in &removed_ids {
            self.vector_store.delete(unit_id).await?;
        }

        let graph = RelationshipGraph::new(self.graph_store.as_ref(), self.config.risk_thresholds);
        graph.delete_units(&removed_ids)?;
        graph.add_edges(outcome.edges.clone())?;
        Ok(())
    }

    // ---- query ------------------------------------------------------

    /// Semantic search (spec §6 `search`): embeds `query_text` with the
    /// injected provider and returns the nearest stored units.
    pub async fn search(
        &self,
        project_id: &str,
        query_text: &str,
        k: usize,
        filter: Option<MetadataFilter>,
    ) -> Result<Vec<SearchResult>> {
        let vectors = self.provider.embed_batch(&[query_text.to_string()]).await?;
        let query_vector = vectors
            .into_iter()
            .next()
            .ok_or_else(|| CodegraphError::embedding("provider returned no vector for the query text"))?;

        let hits = self.vector_store.knn(&query_vector, k, filter).await?;
        let mut results = Vec::with_capacity(hits.len());
        for (unit_id, score) in hits {
            let Some(unit) = self.units_store.get_unit(project_id, &unit_id)? else {
                continue;
            };
            results.push(SearchResult {
                unit_id: unit.unit_id.clone(),
                file_path: unit.file_path.clone(),
                span: Span::new(unit.start_line, unit.end_line),
                snippet: snippet_of(&unit.raw_text),
                score,
                match_type: "semantic".to_string(),
            });
        }
        Ok(results)
    }

    /// Nearest semantic neighbors of a known unit (spec §6 `find_similar`).
    pub async fn find_similar(&self, project_id: &str, unit_id: &str, k: usize) -> Result<Vec<SimilarityMatch>> {
        let Some(unit) = self.units_store.get_unit(project_id, unit_id)? else {
            return Err(CodegraphError::similarity(format!("no such unit: {unit_id}")));
        };
        let engine = DuplicateEngine::new(self.vector_store.clone(), self.config.thresholds, self.config.top_k_neighbors);
        engine.find_similar(&unit, k).await
    }

    /// Full duplicate-group report over a project's current units (spec
    /// §6 `duplicate_report`). `thresholds` overrides the configured
    /// defaults for a single call when supplied.
    pub async fn duplicate_report(
        &self,
        project_id: &str,
        thresholds: Option<DuplicateThresholds>,
    ) -> Result<DuplicateReport> {
        let units = self.units_store.list_project_units(project_id)?;
        let engine = DuplicateEngine::new(
            self.vector_store.clone(),
            thresholds.unwrap_or(self.config.thresholds),
            self.config.top_k_neighbors,
        );
        engine.duplicate_report(&units).await
    }

    /// Direct edges incident to `unit_id` (spec §6 `neighbors`).
    pub fn neighbors(&self, unit_id: &str, kinds: Option<&[EdgeKind]>, direction: Direction) -> Result<Vec<Edge>> {
        let graph = RelationshipGraph::new(self.graph_store.as_ref(), self.config.risk_thresholds);
        graph.neighbors(unit_id, kinds, direction)
    }

    /// Bounded forward traversal from `start` (spec §4.8/§6 `traverse`).
    pub fn traverse(&self, start: &str, kinds: Option<&[EdgeKind]>, max_depth: usize) -> Result<TraversalResult> {
        let graph = RelationshipGraph::new(self.graph_store.as_ref(), self.config.risk_thresholds);
        graph.traverse(start, kinds, max_depth)
    }

    /// Impact analysis (spec §6 `impact`, §8 scenario 5).
    pub fn impact(&self, project_id: &str, unit_id: &str, max_depth: usize) -> Result<ImpactResult> {
        let units = self.units_store.list_project_units(project_id)?;
        let units_by_id: HashMap<String, &Unit> = units.iter().map(|u| (u.unit_id.clone(), u)).collect();
        let graph = RelationshipGraph::new(self.graph_store.as_ref(), self.config.risk_thresholds);
        graph.impact(unit_id, max_depth, &units_by_id)
    }
}

fn snippet_of(raw_text: &str) -> String {
    let mut snippet: String = raw_text.chars().take(SNIPPET_MAX_CHARS).collect();
    if raw_text.chars().count() > SNIPPET_MAX_CHARS {
        snippet.push_str("...");
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cache::{InMemoryTier, MokaTier};
    use crate::features::embedding::DeterministicProvider;
    use crate::features::graph::InMemoryGraphStore;
    use crate::features::ledger::{MemoryLedgerStore, MemoryUnitsStore};
    use crate::features::vector_store::InMemoryVectorStore;
    use std::fs;

    fn test_engine(dim: usize) -> Engine {
        let config = Config {
            embedding_dim: dim,
            batch_size: 4,
            max_concurrency: 2,
            ..Config::default()
        };
        let cache = Arc::new(TieredCache::new(Arc::new(MokaTier::default()), Some(Arc::new(InMemoryTier::new("l2"))), None, 500));
        Engine::new(
            config,
            Arc::new(MemoryLedgerStore::new()),
            Arc::new(MemoryUnitsStore::new()),
            Arc::new(InMemoryVectorStore::new(dim, "abstract-provider-v1")),
            Arc::new(InMemoryGraphStore::new()),
            cache,
            Arc::new(DeterministicProvider::new("abstract-provider-v1", dim)),
        )
        .unwrap()
    }

    #[test]
    fn rejects_mismatched_vector_store_dimension() {
        let config = Config {
            embedding_dim: 8,
            ..Config::default()
        };
        let cache = Arc::new(TieredCache::new(Arc::new(MokaTier::default()), None, None, 500));
        let result = Engine::new(
            config,
            Arc::new(MemoryLedgerStore::new()),
            Arc::new(MemoryUnitsStore::new()),
            Arc::new(InMemoryVectorStore::new(16, "abstract-provider-v1")),
            Arc::new(InMemoryGraphStore::new()),
            cache,
            Arc::new(DeterministicProvider::new("abstract-provider-v1", 8)),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn empty_project_yields_zero_counts() {
        let engine = test_engine(8);
        let dir = tempfile::tempdir().unwrap();
        let report = engine.ingest("p1", dir.path()).await.unwrap();
        assert_eq!(report.counts.added, 0);
        assert_eq!(report.files_processed, 0);
        assert!(report.embedding_succeeded);
    }

    #[tokio::test]
    async fn ingest_extracts_embeds_and_commits() {
        let engine = test_engine(8);
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def greet():\n    return 'hi'\n").unwrap();

        let report = engine.ingest("p1", dir.path()).await.unwrap();
        assert_eq!(report.counts.added, 1);
        assert_eq!(report.files_processed, 1);
        assert!(report.embedding_succeeded);
        assert_eq!(report.units_embedded, 1);

        // second pass over the same content is a no-op
        let second = engine.ingest("p1", dir.path()).await.unwrap();
        assert_eq!(second.counts.unchanged, 1);
        assert_eq!(second.files_processed, 0);
    }

    #[tokio::test]
    async fn deleted_file_cascades_unit_and_vector_removal() {
        let engine = test_engine(8);
        let dir = tempfile::tempdir().unwrap();
        let file_path = dir.path().join("a.py");
        fs::write(&file_path, "def greet():\n    return 'hi'\n").unwrap();
        engine.ingest("p1", dir.path()).await.unwrap();

        fs::remove_file(&file_path).unwrap();
        let report = engine.ingest("p1", dir.path()).await.unwrap();
        assert_eq!(report.counts.deleted, 1);

        let units = engine.units_store.list_project_units("p1").unwrap();
        assert!(units.is_empty());
    }

    #[tokio::test]
    async fn cancellation_stops_before_processing_further_files() {
        let engine = test_engine(8);
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def f(): pass\n").unwrap();
        fs::write(dir.path().join("b.py"), "def g(): pass\n").unwrap();

        let cancel = AtomicBool::new(true);
        let report = engine.ingest_cancellable("p1", dir.path(), &cancel).await.unwrap();
        assert!(report.cancelled);
        assert_eq!(report.files_processed, 0);
    }

    #[tokio::test]
    async fn search_finds_semantically_close_units() {
        let engine = test_engine(8);
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def add(a, b):\n    return a + b\n").unwrap();
        engine.ingest("p1", dir.path()).await.unwrap();

        let results = engine.search("p1", "def add(a, b):\n    return a + b\n", 5, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].file_path, "a.py");
    }

    #[tokio::test]
    async fn impact_reflects_cross_file_call_edges() {
        let engine = test_engine(8);
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("base.py"), "def helper():\n    return 1\n").unwrap();
        fs::write(dir.path().join("caller.py"), "def caller():\n    return helper()\n").unwrap();
        engine.ingest("p1", dir.path()).await.unwrap();

        let units = engine.units_store.list_project_units("p1").unwrap();
        let helper = units.iter().find(|u| u.name == "helper").unwrap();
        let impact = engine.impact("p1", &helper.unit_id, 5).unwrap();
        assert_eq!(impact.affected_total, 1);
    }

    #[tokio::test]
    async fn duplicate_report_groups_exact_duplicates_across_files() {
        let engine = test_engine(8);
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "def f():\n    return 1\n").unwrap();
        fs::write(dir.path().join("b.py"), "def f():\n    return 1\n").unwrap();
        engine.ingest("p1", dir.path()).await.unwrap();

        let report = engine.duplicate_report("p1", None).await.unwrap();
        assert_eq!(report.groups.len(), 1);
    }
}
