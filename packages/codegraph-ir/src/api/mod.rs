//! Query API (spec §6): `ingest`, `search`, `find_similar`,
//! `duplicate_report`, `neighbors`, `traverse`, `impact`.
//!
//! `Engine` is the pipeline orchestrator: it owns no storage itself,
//! wiring together whichever `LedgerStore` / `UnitsStore` /
//! `VectorStore` / `GraphStore` / `CacheTier` / `EmbeddingProvider`
//! implementations are injected at construction time (dependency
//! inversion, per REDESIGN FLAGS §9). `codegraph-storage` supplies the
//! SQLite-backed ones; this crate's in-memory adapters are the
//! correctness reference.

mod engine;
mod types;

pub use engine::Engine;
pub use types::{IngestReport, SearchResult};
