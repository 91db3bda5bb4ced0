//! Retrieval Engine — hybrid search orchestration (spec §4.5).
//!
//! `embed → lexical + vector candidate sub-queries → Reciprocal Rank Fusion
//! (k=60) → top L by fused score → fire-and-forget access-stamp update`.
//! Replicated for entities, episodes, and procedures; only the table/field
//! names and the per-record fetch differ.

use std::sync::Arc;

use memory_backend::query::{entities, episodes, procedures, search};
use memory_backend::BackendSession;
use memory_core::model::{Entity, Episode, Procedure};
use memory_core::{Error, Result};
use memory_embed::EmbeddingClient;
use tracing::warn;

use crate::rrf::{fuse, RRF_K};

/// Default result limit (spec §4.5: "default 10, clamped to [1,100]").
pub const DEFAULT_LIMIT: u32 = 10;
/// Upper bound a caller-supplied limit is clamped to.
pub const MAX_LIMIT: u32 = 100;

/// Clamps a caller-supplied `limit` to spec §4.5's bounds: `0`, negative, or
/// absent defaults to 10; anything above 100 is a validation error (spec §8
/// "boundary behaviour").
pub fn resolve_limit(requested: Option<i64>) -> Result<u32> {
    match requested {
        None | Some(0) => Ok(DEFAULT_LIMIT),
        Some(n) if n < 0 => Ok(DEFAULT_LIMIT),
        Some(n) if n as u64 > MAX_LIMIT as u64 => Err(Error::validation(
            "search",
            format!("limit must be in [1,100], got {n}"),
        )),
        Some(n) => Ok(n as u32),
    }
}

/// One fused, fetched search result: the full record plus its fused RRF
/// score.
#[derive(Debug, Clone)]
pub struct SearchHit<T> {
    pub record: T,
    pub score: f32,
}

/// Hybrid-search orchestration over entities, episodes, and procedures.
pub struct RetrievalEngine {
    session: Arc<BackendSession>,
    embed_client: Arc<dyn EmbeddingClient>,
}

impl RetrievalEngine {
    #[must_use]
    pub fn new(session: Arc<BackendSession>, embed_client: Arc<dyn EmbeddingClient>) -> Self {
        Self {
            session,
            embed_client,
        }
    }

    /// Fuses a lexical and a vector candidate list and returns the top
    /// `limit` ids with their fused scores (spec §4.5 steps 3-4).
    fn fuse_top(
        lexical: Vec<search::Candidate>,
        vector: Vec<search::Candidate>,
        limit: u32,
    ) -> Vec<(String, f32)> {
        let lexical_ids: Vec<String> = lexical.into_iter().map(|c| c.id).collect();
        let vector_ids: Vec<String> = vector.into_iter().map(|c| c.id).collect();
        fuse(&[lexical_ids, vector_ids], RRF_K)
            .into_iter()
            .take(limit as usize)
            .map(|f| (f.id, f.score))
            .collect()
    }

    async fn embed_query(&self, query_text: &str) -> Result<Vec<f32>> {
        if query_text.trim().is_empty() {
            return Err(Error::validation("search", "query must not be empty"));
        }
        self.embed_client.embed(query_text).await
    }

    /// Hybrid search over entities (spec §4.5 main algorithm).
    pub async fn search_entities(
        &self,
        query_text: &str,
        labels: Option<&[String]>,
        limit: u32,
        context: Option<&str>,
    ) -> Result<Vec<SearchHit<Entity>>> {
        let query_embedding = self.embed_query(query_text).await?;

        let lexical = search::lexical_candidates(
            &self.session,
            "entity",
            "content",
            query_text,
            limit,
            labels,
            context,
        )
        .await?;
        let vector = search::vector_candidates(
            &self.session,
            "entity",
            "embedding",
            &query_embedding,
            limit * 2,
            labels,
            context,
        )
        .await?;

        let fused = Self::fuse_top(lexical, vector, limit);
        let mut hits = Vec::with_capacity(fused.len());
        for (id, score) in fused {
            if let Some(entity) = entities::get_entity(&self.session, &id).await? {
                hits.push(SearchHit {
                    record: entity,
                    score,
                });
            }
        }

        // Fire-and-forget: freshen recency for every surfaced result without
        // blocking the response (spec §4.5 step 5, §9 "fire-and-forget
        // access tracking").
        for hit in &hits {
            let session = Arc::clone(&self.session);
            let id = hit.record.id.clone();
            tokio::spawn(async move {
                if let Err(err) = entities::update_access(&session, &id).await {
                    warn!(entity_id = %id, error = %err, "fire-and-forget update_access failed");
                }
            });
        }

        Ok(hits)
    }

    /// Hybrid search over episodes: body full-text + episode embedding
    /// (spec §4.5 final paragraph).
    pub async fn search_episodes(
        &self,
        query_text: &str,
        limit: u32,
        context: Option<&str>,
        before: Option<chrono::DateTime<chrono::Utc>>,
        after: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<Vec<SearchHit<Episode>>> {
        let query_embedding = self.embed_query(query_text).await?;

        let lexical = search::lexical_candidates(
            &self.session,
            "episode",
            "content",
            query_text,
            limit,
            None,
            context,
        )
        .await?;
        let vector = search::vector_candidates(
            &self.session,
            "episode",
            "embedding",
            &query_embedding,
            limit * 2,
            None,
            context,
        )
        .await?;

        let fused = Self::fuse_top(lexical, vector, limit);
        let mut hits = Vec::with_capacity(fused.len());
        for (id, score) in fused {
            if let Some(episode) = episodes::get_episode(&self.session, &id).await? {
                if time_window_matches(episode.timestamp, before, after) {
                    hits.push(SearchHit {
                        record: episode,
                        score,
                    });
                }
            }
        }

        for hit in &hits {
            let session = Arc::clone(&self.session);
            let id = hit.record.id.clone();
            tokio::spawn(async move {
                if let Err(err) = episodes::update_access(&session, &id).await {
                    warn!(episode_id = %id, error = %err, "fire-and-forget update_access failed");
                }
            });
        }

        Ok(hits)
    }

    /// Hybrid search over procedures: name+description+steps concatenation
    /// for the lexical side, procedure embedding for the vector side (spec
    /// §4.5 final paragraph).
    pub async fn search_procedures(
        &self,
        query_text: &str,
        limit: u32,
        context: Option<&str>,
    ) -> Result<Vec<SearchHit<Procedure>>> {
        let query_embedding = self.embed_query(query_text).await?;

        let lexical = search::lexical_candidates(
            &self.session,
            "procedure",
            "lexical_text",
            query_text,
            limit,
            None,
            context,
        )
        .await?;
        let vector = search::vector_candidates(
            &self.session,
            "procedure",
            "embedding",
            &query_embedding,
            limit * 2,
            None,
            context,
        )
        .await?;

        let fused = Self::fuse_top(lexical, vector, limit);
        let mut hits = Vec::with_capacity(fused.len());
        for (id, score) in fused {
            if let Some(procedure) = procedures::get_procedure(&self.session, &id).await? {
                hits.push(SearchHit {
                    record: procedure,
                    score,
                });
            }
        }

        for hit in &hits {
            let session = Arc::clone(&self.session);
            let id = hit.record.id.clone();
            tokio::spawn(async move {
                if let Err(err) = procedures::update_access(&session, &id).await {
                    warn!(procedure_id = %id, error = %err, "fire-and-forget update_access failed");
                }
            });
        }

        Ok(hits)
    }
}

fn time_window_matches(
    timestamp: chrono::DateTime<chrono::Utc>,
    before: Option<chrono::DateTime<chrono::Utc>>,
    after: Option<chrono::DateTime<chrono::Utc>>,
) -> bool {
    if let Some(before) = before {
        if timestamp >= before {
            return false;
        }
    }
    if let Some(after) = after {
        if timestamp <= after {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_limit_defaults_on_zero_negative_or_missing() {
        assert_eq!(resolve_limit(None).unwrap(), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some(0)).unwrap(), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some(-5)).unwrap(), DEFAULT_LIMIT);
    }

    #[test]
    fn resolve_limit_rejects_above_max() {
        assert!(resolve_limit(Some(101)).is_err());
    }

    #[test]
    fn resolve_limit_passes_through_valid_values() {
        assert_eq!(resolve_limit(Some(42)).unwrap(), 42);
        assert_eq!(resolve_limit(Some(100)).unwrap(), 100);
    }

    #[test]
    fn time_window_excludes_outside_bounds() {
        use chrono::{Duration, Utc};
        let now = Utc::now();
        let before = now + Duration::hours(1);
        let after = now - Duration::hours(1);
        assert!(time_window_matches(now, Some(before), Some(after)));
        assert!(!time_window_matches(now, Some(now - Duration::minutes(1)), None));
        assert!(!time_window_matches(now, None, Some(now + Duration::minutes(1))));
    }
}
