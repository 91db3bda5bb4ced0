//! Maintenance Engine (spec §4.7): the `reflect` tool's two actions, decay
//! and duplicate-pair identification. Bound/default resolution lives here;
//! the decay formula and the similarity cross-join live in the Query Layer
//! (`memory_backend::query::maintenance`) since both are single statements.

use std::sync::Arc;

use memory_backend::query::maintenance;
use memory_backend::BackendSession;
use memory_core::Result;
use serde::Serialize;

pub use memory_backend::query::maintenance::{DecayedEntity, SimilarPair};

/// Default lookback window for `action=decay` (spec §6 "decay_days
/// (default 30)").
pub const DEFAULT_DECAY_DAYS: i64 = 30;
/// Default cosine-similarity threshold for `action=similar` (spec §4.7:
/// "default 0.85").
pub const DEFAULT_SIMILARITY_THRESHOLD: f32 = 0.85;
/// Default result cap shared by both actions (spec §6: "limit (default
/// 10)").
pub const DEFAULT_LIMIT: u32 = 10;

/// Outcome of `action=decay` (spec §4.7 step 4).
#[derive(Debug, Clone, Serialize)]
pub struct DecayResult {
    pub affected: u64,
    pub dry_run: bool,
    pub entities: Vec<DecayedEntity>,
}

/// Outcome of `action=similar` — identification only, always reports
/// `dry_run: true` (spec §4.7 final line).
#[derive(Debug, Clone, Serialize)]
pub struct SimilarResult {
    pub count: u64,
    pub dry_run: bool,
    pub pairs: Vec<SimilarPair>,
}

/// Applies the resolution rules for `decay_days` and the `limit`/threshold
/// pair shared by both `reflect` actions.
#[must_use]
pub fn resolve_decay_days(requested: Option<i64>) -> i64 {
    match requested {
        Some(n) if n > 0 => n,
        _ => DEFAULT_DECAY_DAYS,
    }
}

#[must_use]
pub fn resolve_similarity_threshold(requested: Option<f32>) -> f32 {
    match requested {
        Some(t) if t > 0.0 && t <= 1.0 => t,
        _ => DEFAULT_SIMILARITY_THRESHOLD,
    }
}

#[must_use]
pub fn resolve_limit(requested: Option<i64>) -> u32 {
    match requested {
        Some(n) if n > 0 => n as u32,
        _ => DEFAULT_LIMIT,
    }
}

/// Decay and duplicate-pair maintenance passes over the entity table.
pub struct MaintenanceEngine {
    session: Arc<BackendSession>,
}

impl MaintenanceEngine {
    #[must_use]
    pub fn new(session: Arc<BackendSession>) -> Self {
        Self { session }
    }

    /// `action=decay` (spec §4.7): downscales `decay_weight`/`importance`
    /// for entities unused since before `now - days`, respecting the floor
    /// (invariant E3). A `dry_run` reports the before/after tuples without
    /// writing.
    pub async fn decay(
        &self,
        days: i64,
        context: Option<&str>,
        global: bool,
        dry_run: bool,
    ) -> Result<DecayResult> {
        let entities = maintenance::apply_decay(&self.session, days, context, global, dry_run).await?;
        Ok(DecayResult {
            affected: entities.len() as u64,
            dry_run,
            entities,
        })
    }

    /// `action=similar` (spec §4.7): identifies candidate duplicate entity
    /// pairs by cosine similarity. Never mutates the store.
    pub async fn similar(
        &self,
        threshold: f32,
        limit: u32,
        context: Option<&str>,
        global: bool,
    ) -> Result<SimilarResult> {
        let pairs =
            maintenance::find_similar_pairs(&self.session, threshold, limit, context, global).await?;
        Ok(SimilarResult {
            count: pairs.len() as u64,
            dry_run: true,
            pairs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_decay_days_defaults_on_non_positive_or_missing() {
        assert_eq!(resolve_decay_days(None), DEFAULT_DECAY_DAYS);
        assert_eq!(resolve_decay_days(Some(0)), DEFAULT_DECAY_DAYS);
        assert_eq!(resolve_decay_days(Some(-3)), DEFAULT_DECAY_DAYS);
        assert_eq!(resolve_decay_days(Some(60)), 60);
    }

    #[test]
    fn resolve_similarity_threshold_defaults_outside_unit_interval() {
        assert_eq!(
            resolve_similarity_threshold(None),
            DEFAULT_SIMILARITY_THRESHOLD
        );
        assert_eq!(
            resolve_similarity_threshold(Some(0.0)),
            DEFAULT_SIMILARITY_THRESHOLD
        );
        assert_eq!(
            resolve_similarity_threshold(Some(1.5)),
            DEFAULT_SIMILARITY_THRESHOLD
        );
        assert_eq!(resolve_similarity_threshold(Some(0.9)), 0.9);
    }

    #[test]
    fn resolve_limit_defaults_on_non_positive_or_missing() {
        assert_eq!(resolve_limit(None), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some(-1)), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some(25)), 25);
    }
}
