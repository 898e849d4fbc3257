//! Relationship Graph (C8, spec §4.8): typed directed edges between
//! units, bounded traversal, and impact analysis.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::RelationshipGraph;
pub use domain::{Direction, ImpactResult, TraversalResult};
pub use infrastructure::InMemoryGraphStore;
pub use ports::GraphStore;
