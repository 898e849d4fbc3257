//! Embedding Pipeline feature (C4, spec §4.5).

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod ports;

pub use application::{EmbeddingPipeline, EmbeddingRunOutcome};
pub use domain::{build_embedding_text, ContextHints, EmbeddingRequest, TEMPLATE_VERSION};
pub use infrastructure::DeterministicProvider;
pub use ports::EmbeddingProvider;
