pub mod petgraph_store;

pub use petgraph_store::InMemoryGraphStore;
