mod embedding_pipeline;

pub use embedding_pipeline::{EmbeddingPipeline, EmbeddingRunOutcome};
