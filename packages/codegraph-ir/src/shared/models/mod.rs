//! Crate-wide primitive types shared across every feature module.

pub mod error;
pub mod ids;
pub mod span;

pub use error::{CodegraphError, ErrorKind, Result};
pub use ids::{normalized_hash, sha256_hex, unit_id, StreamingHasher};
pub use span::Span;
