//! SQLite-backed `GraphStore` (spec §4.8).

use crate::connection::SqliteDb;
use crate::error::StorageError;
use codegraph_ir::domain::{Edge, EdgeKind};
use codegraph_ir::features::graph::{Direction, GraphStore, TraversalResult};
use codegraph_ir::Result;
use rusqlite::params;
use std::collections::{HashMap, VecDeque};

pub struct SqliteGraphStore {
    db: SqliteDb,
}

impl SqliteGraphStore {
    pub fn new(db: SqliteDb) -> Self {
        Self { db }
    }
}

fn parse_edge_kind(s: &str) -> EdgeKind {
    match s {
        "calls" => EdgeKind::Calls,
        "imports" => EdgeKind::Imports,
        "extends" => EdgeKind::Extends,
        "implements" => EdgeKind::Implements,
        "similar_to" => EdgeKind::SimilarTo,
        "part_of" => EdgeKind::PartOf,
        _ => EdgeKind::Contains,
    }
}

fn matches_kind(kinds: Option<&[EdgeKind]>, kind: EdgeKind) -> bool {
    kinds.map(|ks| ks.contains(&kind)).unwrap_or(true)
}

fn row_to_edge(row: &rusqlite::Row<'_>) -> rusqlite::Result<Edge> {
    let kind_str: String = row.get(2)?;
    Ok(Edge {
        src_unit_id: row.get(0)?,
        dst_unit_id: row.get(1)?,
        kind: parse_edge_kind(&kind_str),
        weight: row.get(3)?,
        evidence: row.get(4)?,
        unresolved: row.get::<_, i64>(5)? != 0,
    })
}

const EDGE_COLUMNS: &str = "src_unit_id, dst_unit_id, kind, weight, evidence, unresolved";

impl GraphStore for SqliteGraphStore {
    fn add_edge(&self, edge: Edge) -> Result<()> {
        let conn = self.db.conn.lock();
        conn.execute(
            &format!("INSERT INTO edges ({EDGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                edge.src_unit_id,
                edge.dst_unit_id,
                edge.kind.as_str(),
                edge.weight,
                edge.evidence,
                edge.unresolved as i64
            ],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn replace_outgoing(&self, src_unit_id: &str, edges: Vec<Edge>) -> Result<()> {
        let mut conn = self.db.conn.lock();
        let tx = conn.transaction().map_err(StorageError::from)?;
        tx.execute("DELETE FROM edges WHERE src_unit_id = ?1", params![src_unit_id])
            .map_err(StorageError::from)?;
        for edge in edges {
            tx.execute(
                &format!("INSERT INTO edges ({EDGE_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
                params![
                    edge.src_unit_id,
                    edge.dst_unit_id,
                    edge.kind.as_str(),
                    edge.weight,
                    edge.evidence,
                    edge.unresolved as i64
                ],
            )
            .map_err(StorageError::from)?;
        }
        tx.commit().map_err(StorageError::from)?;
        Ok(())
    }

    fn delete_edges_for_unit(&self, unit_id: &str) -> Result<usize> {
        let conn = self.db.conn.lock();
        let removed = conn
            .execute(
                "DELETE FROM edges WHERE src_unit_id = ?1 OR dst_unit_id = ?1",
                params![unit_id],
            )
            .map_err(StorageError::from)?;
        Ok(removed)
    }

    fn neighbors(&self, unit_id: &str, kinds: Option<&[EdgeKind]>, direction: Direction) -> Result<Vec<Edge>> {
        let conn = self.db.conn.lock();
        let mut out = Vec::new();
        if matches!(direction, Direction::Out | Direction::Both) {
            let mut stmt = conn
                .prepare(&format!("SELECT {EDGE_COLUMNS} FROM edges WHERE src_unit_id = ?1"))
                .map_err(StorageError::from)?;
            let rows = stmt.query_map(params![unit_id], row_to_edge).map_err(StorageError::from)?;
            for row in rows {
                let edge = row.map_err(StorageError::from)?;
                if matches_kind(kinds, edge.kind) {
                    out.push(edge);
                }
            }
        }
        if matches!(direction, Direction::In | Direction::Both) {
            let mut stmt = conn
                .prepare(&format!("SELECT {EDGE_COLUMNS} FROM edges WHERE dst_unit_id = ?1"))
                .map_err(StorageError::from)?;
            let rows = stmt.query_map(params![unit_id], row_to_edge).map_err(StorageError::from)?;
            for row in rows {
                let edge = row.map_err(StorageError::from)?;
                if matches_kind(kinds, edge.kind) {
                    out.push(edge);
                }
            }
        }
        Ok(out)
    }

    /// Mirrors the in-memory store's BFS exactly (same queue order,
    /// same shortest-parent-chain path reconstruction) so swapping
    /// adapters never changes `traverse`'s observable result.
    fn traverse(&self, start: &str, kinds: Option<&[EdgeKind]>, max_depth: usize) -> Result<TraversalResult> {
        let mut depth_of: HashMap<String, usize> = HashMap::new();
        let mut parent: HashMap<String, String> = HashMap::new();
        let mut queue: VecDeque<String> = VecDeque::new();
        depth_of.insert(start.to_string(), 0);
        queue.push_back(start.to_string());

        while let Some(cur) = queue.pop_front() {
            let depth = depth_of[&cur];
            if depth >= max_depth {
                continue;
            }
            for edge in self.neighbors(&cur, kinds, Direction::Out)? {
                if !depth_of.contains_key(&edge.dst_unit_id) {
                    depth_of.insert(edge.dst_unit_id.clone(), depth + 1);
                    parent.insert(edge.dst_unit_id.clone(), cur.clone());
                    queue.push_back(edge.dst_unit_id);
                }
            }
        }

        let mut visited_nodes: Vec<String> = depth_of.keys().filter(|&k| k != start).cloned().collect();
        visited_nodes.sort();

        let mut paths: Vec<Vec<String>> = depth_of
            .keys()
            .filter(|&k| k != start)
            .map(|node| {
                let mut path = vec![node.clone()];
                let mut cur = node.clone();
                while let Some(p) = parent.get(&cur) {
                    path.push(p.clone());
                    if p == start {
                        break;
                    }
                    cur = p.clone();
                }
                path.reverse();
                path
            })
            .collect();
        paths.sort();

        Ok(TraversalResult { visited_nodes, paths })
    }
}
