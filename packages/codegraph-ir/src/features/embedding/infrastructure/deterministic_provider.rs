//! A deterministic stand-in `EmbeddingProvider`.
//!
//! The spec treats the embedding model as an abstract collaborator
//! (§1 "Explicitly out of scope: specific choice of embedding model");
//! this hashes each text into a unit vector so tests and benchmarks get
//! reproducible, order-preserving output without a network call. Real
//! deployments inject a real provider behind the same trait.

use crate::features::embedding::ports::EmbeddingProvider;
use crate::shared::models::{sha256_hex, Result};
use async_trait::async_trait;

pub struct DeterministicProvider {
    model_id: String,
    dimension: usize,
}

impl DeterministicProvider {
    pub fn new(model_id: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dimension,
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = Vec::with_capacity(self.dimension);
        let mut seed = sha256_hex(text.as_bytes());
        while vector.len() < self.dimension {
            seed = sha256_hex(seed.as_bytes());
            for chunk in seed.as_bytes().chunks(2) {
                if vector.len() >= self.dimension {
                    break;
                }
                let byte = u8::from_str_radix(std::str::from_utf8(chunk).unwrap_or("0"), 16).unwrap_or(0);
                vector.push((byte as f32 / 255.0) * 2.0 - 1.0);
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for DeterministicProvider {
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_text_yields_same_vector() {
        let provider = DeterministicProvider::new("test-model", 8);
        let a = provider.embed_batch(&["hello".to_string()]).await.unwrap();
        let b = provider.embed_batch(&["hello".to_string()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn output_order_matches_input_order() {
        let provider = DeterministicProvider::new("test-model", 4);
        let out = provider
            .embed_batch(&["a".to_string(), "b".to_string(), "c".to_string()])
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_ne!(out[0], out[1]);
    }
}
