//! codegraph-ir: the semantic code intelligence engine's domain and
//! application logic — scanning, change tracking, unit extraction,
//! caching, embedding, vector search, duplicate detection, and the
//! relationship graph, all storage-backend agnostic.
//!
//! `codegraph-storage` provides the SQLite-backed adapters for the
//! ports defined here; the in-memory adapters in this crate are the
//! correctness reference and the default for tests.

pub mod api;
pub mod config;
pub mod domain;
pub mod features;
pub mod shared;

pub use shared::models::{CodegraphError, ErrorKind, Result};
