#![allow(clippy::missing_errors_doc)]

//! # Memory Embed
//!
//! The Embedding Client (spec §4.2): turns text into a fixed-dimension
//! vector and enforces the dimension invariant (E1) before the vector ever
//! reaches the Query Layer.
//!
//! Grounded in the teacher's `memory-core/src/embeddings/provider.rs`
//! `EmbeddingProvider` trait — the same shape (an `embed_text`/`embed_batch`
//! trait implemented by a real HTTP-backed provider and a deterministic
//! mock for tests), narrowed to exactly the two operations spec §4.2
//! requires.

mod http;
mod mock;
mod similarity;

pub use http::HttpEmbeddingClient;
pub use mock::MockEmbeddingClient;
pub use similarity::cosine_similarity;

use async_trait::async_trait;
use memory_core::Result;

/// Default character bound applied before a text is handed to the provider
/// (spec §4.2 "Very long inputs are truncated at a caller-specified
/// character bound").
pub const DEFAULT_TRUNCATION_CHARS: usize = 8192;

/// The Embedding Client contract.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embeds a single text, enforcing the dimension invariant before
    /// returning.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of texts. An empty input returns an empty output
    /// without calling the provider (spec §4.2).
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    /// The dimension this client's vectors must have (schema invariant E1).
    fn dimension(&self) -> usize;
}

/// Truncates `text` to at most `max_chars` characters, respecting UTF-8
/// char boundaries.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        let text = "héllo wörld";
        let truncated = truncate_chars(text, 5);
        assert_eq!(truncated, "héllo");
    }

    #[test]
    fn truncate_chars_is_noop_when_shorter_than_bound() {
        let text = "short";
        assert_eq!(truncate_chars(text, 100), "short");
    }
}
