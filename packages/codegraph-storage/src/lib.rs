//! Persistence adapters for `codegraph-ir`'s ports.
//!
//! Every adapter here implements a port trait defined in
//! `codegraph-ir::features::*` against SQLite (or, for the L2 cache
//! tier, the filesystem): `SqliteLedgerStore`/`SqliteUnitsStore`
//! (`LedgerStore`/`UnitsStore`, spec §4.2/§6), `SqliteVectorStore`
//! (`VectorStore`, spec §4.6), `SqliteGraphStore` (`GraphStore`, spec
//! §4.8), and `FsCacheTier` (`CacheTier`, spec §4.4). All adapters
//! sharing one SQLite file should be built from the same [`SqliteDb`]
//! handle, since it owns the single connection mutex and the schema
//! bootstrap.
//!
//! `codegraph-ir`'s in-memory adapters remain the correctness
//! reference; these exist to carry state across runs and past process
//! sizes the in-memory ones can't hold.

pub mod cache;
pub mod connection;
pub mod error;
pub mod graph;
pub mod ledger;
pub mod vector_store;

pub use cache::FsCacheTier;
pub use connection::SqliteDb;
pub use error::{ErrorKind, Result, StorageError};
pub use graph::SqliteGraphStore;
pub use ledger::{SqliteLedgerStore, SqliteUnitsStore};
pub use vector_store::SqliteVectorStore;
