//! HTTP-backed embedding provider, pointed at an Ollama-compatible
//! `/api/embed` endpoint by default (spec §6 "Embedding host").
//!
//! Grounded in `memory-core/src/embeddings/openai.rs` (the teacher's
//! reqwest-based provider) — same request/response shape, adapted to a
//! locally-hosted embedding endpoint instead of a hosted API key provider,
//! since spec §6 lists no API key in the configuration surface.

use async_trait::async_trait;
use memory_core::{Error, Result};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, warn};

use crate::{truncate_chars, EmbeddingClient, DEFAULT_TRUNCATION_CHARS};

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    #[serde(alias = "embeddings")]
    embedding: EmbedField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbedField {
    Single(Vec<f32>),
    Batch(Vec<Vec<f32>>),
}

/// Embeds text by calling a remote embedding host over HTTP.
pub struct HttpEmbeddingClient {
    client: reqwest::Client,
    host: String,
    model: String,
    dimension: usize,
    truncate_chars: usize,
}

impl HttpEmbeddingClient {
    #[must_use]
    pub fn new(host: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            host: host.into(),
            model: model.into(),
            dimension,
            truncate_chars: DEFAULT_TRUNCATION_CHARS,
        }
    }

    #[must_use]
    pub fn with_truncation(mut self, max_chars: usize) -> Self {
        self.truncate_chars = max_chars;
        self
    }

    fn check_dimension(&self, op: &'static str, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.dimension {
            warn!(
                expected = self.dimension,
                actual = embedding.len(),
                "embedding dimension mismatch"
            );
            return Err(Error::validation(
                op,
                format!(
                    "embedding dimension mismatch: expected {}, got {}",
                    self.dimension,
                    embedding.len()
                ),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let truncated = truncate_chars(text, self.truncate_chars);
        debug!(model = %self.model, chars = truncated.len(), "requesting embedding");

        let url = format!("{}/api/embed", self.host.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "input": truncated }))
            .send()
            .await
            .map_err(|e| Error::Provider(format!("embedding host unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "embedding host returned status {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed embedding response: {e}")))?;

        let embedding = match parsed.embedding {
            EmbedField::Single(v) => v,
            EmbedField::Batch(mut v) => v.pop().ok_or_else(|| {
                Error::Provider("embedding host returned an empty batch".to_string())
            })?,
        };

        self.check_dimension("embed", &embedding)?;
        Ok(embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let truncated: Vec<&str> = texts
            .iter()
            .map(|t| truncate_chars(t, self.truncate_chars))
            .collect();

        let url = format!("{}/api/embed", self.host.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "input": truncated }))
            .send()
            .await
            .map_err(|e| Error::Provider(format!("embedding host unreachable: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Provider(format!(
                "embedding host returned status {}",
                response.status()
            )));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| Error::Provider(format!("malformed embedding response: {e}")))?;

        let embeddings = match parsed.embedding {
            EmbedField::Single(v) => vec![v],
            EmbedField::Batch(v) => v,
        };

        for embedding in &embeddings {
            self.check_dimension("embed_batch", embedding)?;
        }

        Ok(embeddings)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
