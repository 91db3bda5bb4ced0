//! Deterministic mock embedding provider used by integration tests that do
//! not want a live embedding host (grounded in
//! `memory-core/src/embeddings/mock_model.rs`).

use async_trait::async_trait;
use memory_core::{Error, Result};

use crate::EmbeddingClient;

/// Produces a deterministic, content-derived vector of the configured
/// dimension. Two calls with the same text always return the same vector,
/// and texts that share words score high on cosine similarity — enough to
/// exercise hybrid search and duplicate detection without a network call.
pub struct MockEmbeddingClient {
    dimension: usize,
}

impl MockEmbeddingClient {
    #[must_use]
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn hash_embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        for (i, word) in text.to_lowercase().split_whitespace().enumerate() {
            let mut hash: u64 = 1469598103934665603; // FNV offset basis
            for byte in word.bytes() {
                hash ^= u64::from(byte);
                hash = hash.wrapping_mul(1099511628211); // FNV prime
            }
            let bucket = (hash as usize) % self.dimension;
            vector[bucket] += 1.0 / (i as f32 + 1.0).sqrt();
        }
        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingClient for MockEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::validation("embed", "text must not be empty"));
        }
        Ok(self.hash_embed(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        texts.iter().map(|t| self.hash_embed_checked(t)).collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

impl MockEmbeddingClient {
    fn hash_embed_checked(&self, text: &str) -> Result<Vec<f32>> {
        if text.is_empty() {
            return Err(Error::validation("embed_batch", "text must not be empty"));
        }
        Ok(self.hash_embed(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosine_similarity;

    #[tokio::test]
    async fn same_text_yields_same_vector() {
        let client = MockEmbeddingClient::new(384);
        let a = client.embed("refund payment service").await.unwrap();
        let b = client.embed("refund payment service").await.unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 384);
    }

    #[tokio::test]
    async fn shared_vocabulary_scores_higher_than_unrelated_text() {
        let client = MockEmbeddingClient::new(384);
        let a = client
            .embed("payment service handles refunds")
            .await
            .unwrap();
        let b = client
            .embed("refund workflow in the payment service")
            .await
            .unwrap();
        let c = client.embed("weather report for Tuesday").await.unwrap();

        let sim_ab = cosine_similarity(&a, &b);
        let sim_ac = cosine_similarity(&a, &c);
        assert!(sim_ab > sim_ac);
    }

    #[tokio::test]
    async fn empty_batch_short_circuits() {
        let client = MockEmbeddingClient::new(384);
        let out = client.embed_batch(&[]).await.unwrap();
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn empty_text_is_rejected() {
        let client = MockEmbeddingClient::new(384);
        assert!(client.embed("").await.is_err());
    }
}
