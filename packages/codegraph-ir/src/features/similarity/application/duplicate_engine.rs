//! Similarity & Duplication Engine use-case (C7, spec §4.7).

use crate::config::DuplicateThresholds;
use crate::domain::{DuplicateGroup, DuplicateType, Unit};
use crate::features::extraction::domain::normalize;
use crate::features::similarity::domain::{classify_pair, sim_struct};
use crate::features::vector_store::{MetadataFilter, VectorStore};
use crate::shared::models::{sha256_hex, Result};
use petgraph::unionfind::UnionFind;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DuplicateStats {
    pub units_considered: usize,
    pub groups_found: usize,
    /// `true` when the Vector Store held no embeddings for this run,
    /// so classification fell back to exact + structural only (spec
    /// §4.7 Failure).
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DuplicateReport {
    pub groups: Vec<DuplicateGroup>,
    pub stats: DuplicateStats,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatch {
    pub unit_id: String,
    pub score: f64,
    pub match_type: String,
}

struct ScoredPair {
    a: usize,
    b: usize,
    kind: DuplicateType,
    score: f64,
}

pub struct DuplicateEngine {
    vector_store: Arc<dyn VectorStore>,
    thresholds: DuplicateThresholds,
    top_k: usize,
}

impl DuplicateEngine {
    pub fn new(vector_store: Arc<dyn VectorStore>, thresholds: DuplicateThresholds, top_k: usize) -> Self {
        Self {
            vector_store,
            thresholds,
            top_k: top_k.max(1),
        }
    }

    /// Semantic nearest-neighbor lookup for a single unit (spec §6
    /// `find_similar`), independent of duplicate-group construction.
    pub async fn find_similar(&self, unit: &Unit, k: usize) -> Result<Vec<SimilarityMatch>> {
        let filter = MetadataFilter::exclude_file(&unit.file_path);
        let results = self.vector_store.knn_by_id(&unit.unit_id, k, Some(filter)).await?;
        Ok(results
            .into_iter()
            .map(|(unit_id, score)| SimilarityMatch {
                unit_id,
                score,
                match_type: "semantic".to_string(),
            })
            .collect())
    }

    /// Build the classified duplicate report for a set of units (spec
    /// §4.7 "Group construction" / "Reporting"). `units` is the full
    /// current unit set the report should consider; recomputed per
    /// request, nothing persists between calls.
    pub async fn duplicate_report(&self, units: &[Unit]) -> Result<DuplicateReport> {
        let total_vectors = self.vector_store.len().await?;
        let degraded = total_vectors == 0;
        if degraded {
            debug!("duplicate engine: no embeddings present, degrading to exact + structural");
        }

        let mut index_of: HashMap<&str, usize> = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            index_of.insert(unit.unit_id.as_str(), i);
        }
        let mut dsu = UnionFind::new(units.len());
        let mut scored_pairs: Vec<ScoredPair> = Vec::new();
        let mut seen: std::collections::HashSet<(usize, usize)> = std::collections::HashSet::new();

        // Exact duplicates: bucket by normalized_hash first, so they're
        // found even when the unit has no embedding at all.
        let mut by_hash: HashMap<&str, Vec<usize>> = HashMap::new();
        for (i, unit) in units.iter().enumerate() {
            by_hash.entry(unit.normalized_hash.as_str()).or_default().push(i);
        }
        for bucket in by_hash.values().filter(|b| b.len() > 1) {
            for w in 1..bucket.len() {
                try_classify_and_union(
                    units,
                    &self.thresholds,
                    &mut seen,
                    &mut dsu,
                    &mut scored_pairs,
                    bucket[0],
                    bucket[w],
                    None,
                );
            }
        }

        if !degraded {
            for (i, unit) in units.iter().enumerate() {
                let filter = MetadataFilter::exclude_file(&unit.file_path);
                let candidates = self.vector_store.knn_by_id(&unit.unit_id, self.top_k, Some(filter)).await?;
                for (candidate_id, sim_cos) in candidates {
                    let Some(&j) = index_of.get(candidate_id.as_str()) else { continue };
                    try_classify_and_union(units, &self.thresholds, &mut seen, &mut dsu, &mut scored_pairs, i, j, Some(sim_cos));
                }
            }
        } else {
            // No embeddings anywhere: fall back to pairwise structural
            // comparison among same-language units (spec §4.7 Failure
            // — "must still terminate"). Bounded to same language to
            // keep the O(n^2) scan from exploding across large repos.
            let mut by_lang: HashMap<&str, Vec<usize>> = HashMap::new();
            for (i, unit) in units.iter().enumerate() {
                by_lang.entry(unit.language.name()).or_default().push(i);
            }
            for group in by_lang.values() {
                for a in 0..group.len() {
                    for b in (a + 1)..group.len() {
                        try_classify_and_union(units, &self.thresholds, &mut seen, &mut dsu, &mut scored_pairs, group[a], group[b], None);
                    }
                }
            }
        }

        let mut members_by_root: HashMap<usize, Vec<usize>> = HashMap::new();
        for i in 0..units.len() {
            members_by_root.entry(dsu.find(i)).or_default().push(i);
        }

        let mut groups: Vec<DuplicateGroup> = Vec::new();
        for members in members_by_root.values() {
            if members.len() < 2 {
                continue;
            }
            let member_set: std::collections::HashSet<usize> = members.iter().copied().collect();
            let internal: Vec<&ScoredPair> = scored_pairs
                .iter()
                .filter(|p| member_set.contains(&p.a) && member_set.contains(&p.b))
                .collect();
            if internal.is_empty() {
                continue;
            }

            let kind = internal.iter().map(|p| p.kind).max_by_key(|k| k.rank()).unwrap_or(DuplicateType::Structural);
            let mean_similarity = internal.iter().map(|p| p.score).sum::<f64>() / internal.len() as f64;

            let mut totals: HashMap<usize, (f64, usize)> = HashMap::new();
            for pair in &internal {
                let e = totals.entry(pair.a).or_insert((0.0, 0));
                e.0 += pair.score;
                e.1 += 1;
                let e = totals.entry(pair.b).or_insert((0.0, 0));
                e.0 += pair.score;
                e.1 += 1;
            }
            let representative_idx = *members
                .iter()
                .max_by(|&&a, &&b| {
                    let avg = |idx: usize| totals.get(&idx).map(|(sum, n)| sum / *n as f64).unwrap_or(0.0);
                    avg(a)
                        .partial_cmp(&avg(b))
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| units[b].unit_id.cmp(&units[a].unit_id))
                })
                .expect("members is non-empty");

            let mut member_ids: Vec<String> = members.iter().map(|&i| units[i].unit_id.clone()).collect();
            member_ids.sort();

            let representative_unit_id = units[representative_idx].unit_id.clone();
            let lines_saved: f64 = members
                .iter()
                .filter(|&&i| i != representative_idx)
                .map(|&i| units[i].line_count() as f64 * 0.7)
                .sum();

            let any_class = members.iter().any(|&i| matches!(units[i].kind, crate::domain::UnitKind::Class));
            let languages: std::collections::HashSet<&str> = members.iter().map(|&i| units[i].language.name()).collect();
            let consolidation_hint = consolidation_hint(members.len(), &languages, any_class);

            groups.push(DuplicateGroup {
                group_id: sha256_hex(member_ids.join(",").as_bytes()),
                kind,
                similarity: mean_similarity,
                members: member_ids,
                representative_unit_id,
                estimated_lines_saved: lines_saved.round() as u64,
                consolidation_hint,
            });
        }
        groups.sort_by(|a, b| a.group_id.cmp(&b.group_id));

        Ok(DuplicateReport {
            stats: DuplicateStats {
                units_considered: units.len(),
                groups_found: groups.len(),
                degraded,
            },
            groups,
        })
    }
}

/// Score an unordered unit pair and union its members in `dsu` if the
/// classification cascade (spec §4.7) crosses a threshold. No-op on a
/// pair already scored in either order.
#[allow(clippy::too_many_arguments)]
fn try_classify_and_union(
    units: &[Unit],
    thresholds: &DuplicateThresholds,
    seen: &mut std::collections::HashSet<(usize, usize)>,
    dsu: &mut UnionFind<usize>,
    scored_pairs: &mut Vec<ScoredPair>,
    a: usize,
    b: usize,
    sim_cos: Option<f64>,
) {
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    if lo == hi || !seen.insert((lo, hi)) {
        return;
    }
    let ua = &units[lo];
    let ub = &units[hi];
    let exact_match = ua.normalized_hash == ub.normalized_hash;
    let struct_score = sim_struct(&normalize(&ua.raw_text, ua.language), &normalize(&ub.raw_text, ub.language));
    if let Some((kind, score)) = classify_pair(exact_match, sim_cos, struct_score, thresholds) {
        dsu.union(lo, hi);
        scored_pairs.push(ScoredPair { a: lo, b: hi, kind, score });
    }
}

fn consolidation_hint(group_size: usize, languages: &std::collections::HashSet<&str>, any_class: bool) -> String {
    let scope = if languages.len() > 1 { "cross-language" } else { "same-language" };
    if any_class {
        format!("{group_size} {scope} duplicate implementations of a class; consider extracting a shared base class")
    } else if group_size > 2 {
        format!("{group_size} {scope} duplicate implementations; consider extracting a shared helper function")
    } else {
        format!("{group_size} {scope} duplicate implementations; consider consolidating into one function")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UnitKind;
    use crate::features::vector_store::{InMemoryVectorStore, VectorMetadata};
    use crate::shared::ports::Language;

    fn unit(id: &str, file: &str, raw_text: &str, normalized_hash: &str) -> Unit {
        let mut u = Unit::new(file, UnitKind::Function, id, id, 1, 5, Language::Python, raw_text, normalized_hash);
        u.unit_id = id.to_string();
        u
    }

    async fn store_with(entries: &[(&str, &str, Vec<f32>)]) -> Arc<InMemoryVectorStore> {
        let store = Arc::new(InMemoryVectorStore::new(2, "m1"));
        for (id, file, vec) in entries {
            store
                .upsert(
                    id,
                    vec.clone(),
                    VectorMetadata {
                        file_path: file.to_string(),
                        language: Some("python".to_string()),
                        model_id: "m1".to_string(),
                    },
                )
                .await
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn exact_duplicates_form_a_group_even_without_embeddings() {
        let store = Arc::new(InMemoryVectorStore::new(2, "m1"));
        let engine = DuplicateEngine::new(store, DuplicateThresholds::default(), 5);
        let units = vec![
            unit("a", "a.py", "def f(): pass", "same-hash"),
            unit("b", "b.py", "def f(): pass", "same-hash"),
        ];
        let report = engine.duplicate_report(&units).await.unwrap();
        assert!(report.stats.degraded);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].kind, DuplicateType::Exact);
        assert_eq!(report.groups[0].members, vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn semantic_duplicates_form_a_group_via_vector_store() {
        let store = store_with(&[("a", "a.py", vec![1.0, 0.0]), ("b", "b.py", vec![0.99, 0.01])]).await;
        let engine = DuplicateEngine::new(store, DuplicateThresholds::default(), 5);
        let units = vec![
            unit("a", "a.py", "def f(): return 1", "hash-a"),
            unit("b", "b.py", "def g(): return 2", "hash-b"),
        ];
        let report = engine.duplicate_report(&units).await.unwrap();
        assert!(!report.stats.degraded);
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].kind, DuplicateType::Semantic);
    }

    #[tokio::test]
    async fn unrelated_units_form_no_group() {
        let store = store_with(&[("a", "a.py", vec![1.0, 0.0]), ("b", "b.py", vec![0.0, 1.0])]).await;
        let engine = DuplicateEngine::new(store, DuplicateThresholds::default(), 5);
        let units = vec![
            unit("a", "a.py", "def f(): return 1", "hash-a"),
            unit("b", "b.py", "class C: pass", "hash-b"),
        ];
        let report = engine.duplicate_report(&units).await.unwrap();
        assert!(report.groups.is_empty());
    }

    #[tokio::test]
    async fn find_similar_excludes_self_file() {
        let store = store_with(&[("a", "a.py", vec![1.0, 0.0]), ("b", "b.py", vec![0.9, 0.1])]).await;
        let engine = DuplicateEngine::new(store, DuplicateThresholds::default(), 5);
        let a = unit("a", "a.py", "def f(): return 1", "hash-a");
        let matches = engine.find_similar(&a, 5).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].unit_id, "b");
    }
}
