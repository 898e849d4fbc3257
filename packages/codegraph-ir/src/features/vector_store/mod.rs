//! C6 — Vector Store (spec §4.6).

pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use domain::{cosine, MetadataFilter};
pub use infrastructure::InMemoryVectorStore;
pub use ports::{VectorMetadata, VectorStore};
