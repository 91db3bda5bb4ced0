//! Maintenance Engine backing operations (spec §4.7): `apply_decay`,
//! `find_similar_pairs`.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use memory_core::{Error, Result};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use super::record::{take, thing_id};
use crate::dialect::COSINE_SIMILARITY_FN;
use crate::session::BackendSession;

/// Before/after decay values for one affected entity (spec §4.7 step 4).
#[derive(Debug, Clone, Serialize)]
pub struct DecayedEntity {
    pub entity_id: String,
    pub old_decay_weight: f32,
    pub new_decay_weight: f32,
    pub old_importance: f32,
    pub new_importance: f32,
}

#[derive(Debug, Deserialize)]
struct StaleEntity {
    id: Thing,
    decay_weight: f32,
    importance: f32,
}

/// Applies decay to entities unused since before `now - days`, optionally
/// scoped to `context` unless `global` (spec §4.7 `action=decay`). With
/// `dry_run`, reports the before/after tuples without writing.
pub async fn apply_decay(
    session: &BackendSession,
    days: i64,
    context: Option<&str>,
    global: bool,
    dry_run: bool,
) -> Result<Vec<DecayedEntity>> {
    let cutoff = Utc::now() - ChronoDuration::days(days);
    let (scope_clause, mut variables) = scope_clause(context, global);
    variables.push(("cutoff", serde_json::json!(cutoff)));

    let select_stmt = format!(
        "SELECT id, decay_weight, importance FROM entity \
         WHERE accessed < $cutoff AND decay_weight > 0.1{scope_clause}"
    );

    let mut response = session.query(&select_stmt, variables.clone()).await?;
    let stale = take::<StaleEntity>(&mut response, 0, "apply_decay")?;

    let decayed: Vec<DecayedEntity> = stale
        .into_iter()
        .map(|entity| DecayedEntity {
            entity_id: thing_id(&entity.id),
            old_decay_weight: entity.decay_weight,
            new_decay_weight: (entity.decay_weight * 0.9).max(0.1),
            old_importance: entity.importance,
            new_importance: (entity.importance * 0.9).max(0.1),
        })
        .collect();

    if dry_run || decayed.is_empty() {
        return Ok(decayed);
    }

    let update_stmt = format!(
        "UPDATE entity SET decay_weight = math::max([decay_weight * 0.9, 0.1]), \
         importance = math::max([importance * 0.9, 0.1]) \
         WHERE accessed < $cutoff AND decay_weight > 0.1{scope_clause}"
    );
    session
        .query(&update_stmt, variables)
        .await
        .map_err(|e| Error::internal("apply_decay", format!("failed to write decayed values: {e}")))?;

    Ok(decayed)
}

fn scope_clause(context: Option<&str>, global: bool) -> (String, Vec<(&'static str, serde_json::Value)>) {
    if global {
        return (String::new(), Vec::new());
    }
    match context {
        Some(ctx) => (
            " AND context = $context".to_string(),
            vec![("context", serde_json::json!(ctx))],
        ),
        None => (String::new(), Vec::new()),
    }
}

/// A candidate duplicate pair (spec §4.7 `action=similar`). Identification
/// only — no merge is performed.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarPair {
    pub entity1_id: String,
    pub entity1_name: String,
    pub entity2_id: String,
    pub entity2_name: String,
    pub similarity: f32,
}

#[derive(Debug, Deserialize)]
struct SimilarPairRow {
    entity1_id: Thing,
    entity1_name: String,
    entity2_id: Thing,
    entity2_name: String,
    similarity: f32,
}

/// Cross-joins the entity table with itself (`e1.id < e2.id` to yield each
/// unordered pair once), keeps pairs at or above `threshold`, returns the
/// `limit` highest-similarity pairs (spec §4.7 `action=similar`).
pub async fn find_similar_pairs(
    session: &BackendSession,
    threshold: f32,
    limit: u32,
    context: Option<&str>,
    global: bool,
) -> Result<Vec<SimilarPair>> {
    if !(0.0..=1.0).contains(&threshold) || threshold <= 0.0 {
        return Err(Error::validation(
            "find_similar_pairs",
            "threshold must be in (0,1]",
        ));
    }

    let (scope_clause, mut variables) = scope_clause(context, global);
    variables.push(("threshold", serde_json::json!(threshold)));
    variables.push(("limit", serde_json::json!(limit)));

    let statement = format!(
        "SELECT e1.id AS entity1_id, e1.content AS entity1_name, \
                e2.id AS entity2_id, e2.content AS entity2_name, \
                {COSINE_SIMILARITY_FN}(e1.embedding, e2.embedding) AS similarity \
         FROM entity AS e1, entity AS e2 \
         WHERE e1.id < e2.id \
           AND {COSINE_SIMILARITY_FN}(e1.embedding, e2.embedding) >= $threshold{scope_clause} \
         ORDER BY similarity DESC LIMIT $limit"
    );

    let mut response = session.query(&statement, variables).await?;
    let rows = take::<SimilarPairRow>(&mut response, 0, "find_similar_pairs")?;

    Ok(rows
        .into_iter()
        .map(|row| SimilarPair {
            entity1_id: thing_id(&row.entity1_id),
            entity1_name: row.entity1_name,
            entity2_id: thing_id(&row.entity2_id),
            entity2_name: row.entity2_name,
            similarity: row.similarity,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_formula_respects_the_floor() {
        let decayed = DecayedEntity {
            entity_id: "e1".to_string(),
            old_decay_weight: 0.11,
            new_decay_weight: (0.11_f32 * 0.9).max(0.1),
            old_importance: 0.11,
            new_importance: (0.11_f32 * 0.9).max(0.1),
        };
        assert!(decayed.new_decay_weight >= 0.1);
        assert!(decayed.new_importance >= 0.1);
    }

    #[test]
    fn global_scope_drops_the_context_clause() {
        let (clause, vars) = scope_clause(Some("proj"), true);
        assert_eq!(clause, "");
        assert!(vars.is_empty());
    }

    #[test]
    fn context_without_global_adds_the_clause() {
        let (clause, vars) = scope_clause(Some("proj"), false);
        assert!(clause.contains("context = $context"));
        assert_eq!(vars.len(), 1);
    }
}
