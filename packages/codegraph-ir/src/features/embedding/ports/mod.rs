//! Embedding Provider port (spec §4.5: "The pipeline exposes only this
//! batch interface; it does not choose the model").

use crate::shared::models::Result;
use async_trait::async_trait;

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a batch of texts. Output order must match input order
    /// (spec §4.5 "Batching").
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_id(&self) -> &str;

    fn dimension(&self) -> usize;
}
