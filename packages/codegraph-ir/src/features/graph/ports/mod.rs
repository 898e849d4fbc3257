//! Relationship Graph port (spec §4.8).

use crate::domain::{Edge, EdgeKind};
use crate::features::graph::domain::{Direction, TraversalResult};
use crate::shared::models::Result;

pub trait GraphStore: Send + Sync {
    /// Insert one edge, creating its endpoint nodes if they don't
    /// already exist (spec invariant 4 requires both units to exist
    /// logically; the store itself only tracks unit ids, the caller
    /// is responsible for not adding edges for deleted units).
    fn add_edge(&self, edge: Edge) -> Result<()>;

    /// Replace every outgoing edge from `src_unit_id` with `edges`
    /// atomically (spec §4.8 Consistency: "On unit change, outgoing
    /// edges are replaced atomically with the new set from the
    /// extractor").
    fn replace_outgoing(&self, src_unit_id: &str, edges: Vec<Edge>) -> Result<()>;

    /// Remove every edge incident to `unit_id` (spec §4.8
    /// Consistency: cascading delete on unit/file removal). Returns
    /// the number of edges removed.
    fn delete_edges_for_unit(&self, unit_id: &str) -> Result<usize>;

    /// Edges incident to `unit_id`, optionally filtered by `kinds`.
    fn neighbors(&self, unit_id: &str, kinds: Option<&[EdgeKind]>, direction: Direction) -> Result<Vec<Edge>>;

    /// Bounded forward (outgoing) traversal from `start` (spec §4.8).
    fn traverse(&self, start: &str, kinds: Option<&[EdgeKind]>, max_depth: usize) -> Result<TraversalResult>;
}
