//! Relationship Graph use-case (C8, spec §4.8).

use crate::config::RiskThresholds;
use crate::domain::{Edge, EdgeKind, Unit};
use crate::features::graph::domain::{looks_like_test_path, Direction, ImpactResult, TraversalResult, IMPACT_KINDS};
use crate::features::graph::ports::GraphStore;
use crate::shared::models::Result;
use std::collections::{HashMap, HashSet, VecDeque};

pub struct RelationshipGraph<'a, S: GraphStore + ?Sized> {
    store: &'a S,
    risk_thresholds: RiskThresholds,
}

impl<'a, S: GraphStore + ?Sized> RelationshipGraph<'a, S> {
    pub fn new(store: &'a S, risk_thresholds: RiskThresholds) -> Self {
        Self { store, risk_thresholds }
    }

    pub fn add_edge(&self, edge: Edge) -> Result<()> {
        self.store.add_edge(edge)
    }

    pub fn add_edges(&self, edges: Vec<Edge>) -> Result<()> {
        for edge in edges {
            self.store.add_edge(edge)?;
        }
        Ok(())
    }

    /// Atomically replace a unit's outgoing edges with the extractor's
    /// freshly-computed set (spec §4.8 Consistency).
    pub fn replace_unit_edges(&self, src_unit_id: &str, edges: Vec<Edge>) -> Result<()> {
        self.store.replace_outgoing(src_unit_id, edges)
    }

    /// Cascade-delete every edge touching the given unit ids (spec
    /// §4.8 Consistency: file deletion removes `src.file = X` or
    /// `dst.file = X` edges; deleting per-unit here is equivalent
    /// since every edge of a deleted file's units is incident to one
    /// of them).
    pub fn delete_units(&self, unit_ids: &[String]) -> Result<usize> {
        let mut total = 0usize;
        for id in unit_ids {
            total += self.store.delete_edges_for_unit(id)?;
        }
        Ok(total)
    }

    pub fn neighbors(&self, unit_id: &str, kinds: Option<&[EdgeKind]>, direction: Direction) -> Result<Vec<Edge>> {
        self.store.neighbors(unit_id, kinds, direction)
    }

    pub fn traverse(&self, start: &str, kinds: Option<&[EdgeKind]>, max_depth: usize) -> Result<TraversalResult> {
        self.store.traverse(start, kinds, max_depth)
    }

    /// Impact analysis (spec §4.8, §8 scenario 5): reachable set of
    /// units that depend on `unit_id` (incoming `calls`/`extends`/
    /// `implements` edges) within `max_depth`, bucketed by unit kind,
    /// with a risk band from `risk_thresholds`.
    pub fn impact(&self, unit_id: &str, max_depth: usize, units_by_id: &HashMap<String, &Unit>) -> Result<ImpactResult> {
        let mut depth_of: HashMap<String, usize> = HashMap::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        depth_of.insert(unit_id.to_string(), 0);
        queue.push_back(unit_id.to_string());

        while let Some(cur) = queue.pop_front() {
            let depth = depth_of[&cur];
            if depth >= max_depth {
                continue;
            }
            let incoming = self.store.neighbors(&cur, Some(&IMPACT_KINDS), Direction::In)?;
            for edge in incoming {
                if !depth_of.contains_key(&edge.src_unit_id) {
                    depth_of.insert(edge.src_unit_id.clone(), depth + 1);
                    queue.push_back(edge.src_unit_id);
                }
            }
        }

        let affected: HashSet<&String> = depth_of.keys().filter(|id| id.as_str() != unit_id).collect();
        let mut affected_by_kind: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
        for id in &affected {
            if let Some(unit) = units_by_id.get(id.as_str()) {
                *affected_by_kind.entry(unit.kind.as_str().to_string()).or_insert(0) += 1;
                if looks_like_test_path(&unit.file_path) {
                    *affected_by_kind.entry("test".to_string()).or_insert(0) += 1;
                }
            }
        }

        let affected_total = affected.len();
        Ok(ImpactResult {
            target_unit_id: unit_id.to_string(),
            affected_total,
            affected_by_kind,
            risk: self.risk_thresholds.classify(affected_total),
        })
    }
}
