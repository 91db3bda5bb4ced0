//! Candidate sub-queries for hybrid search (spec §4.5): lexical (BM25
//! full-text) and vector (HNSW cosine) candidate lists over the entity,
//! episode, and procedure tables. Fusion (Reciprocal Rank Fusion) is the
//! Retrieval Engine's job, not the Query Layer's — this module only returns
//! each sub-query's ranked candidate list.

use memory_core::Result;
use serde::Deserialize;
use surrealdb::sql::Thing;

use super::record::{take, thing_id};
use crate::dialect::{BM25_SCORE_FN, COSINE_SIMILARITY_FN, FULLTEXT_MATCH_OP};
use crate::session::BackendSession;

/// The HNSW search effort factor used for every vector candidate
/// sub-query (spec §4.5 step 3).
const VECTOR_EF: u32 = 40;

/// One ranked candidate: its id and the sub-query's relevance score. Rank
/// is this row's position in the returned list (1-based), assigned by the
/// caller, not stored here.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub id: String,
    pub score: f32,
}

#[derive(Debug, Deserialize)]
struct CandidateRow {
    id: Thing,
    score: f32,
}

fn rows_to_candidates(rows: Vec<CandidateRow>) -> Vec<Candidate> {
    rows.into_iter()
        .map(|row| Candidate {
            id: thing_id(&row.id),
            score: row.score,
        })
        .collect()
}

fn scope_filter(
    labels: Option<&[String]>,
    context: Option<&str>,
) -> (String, Vec<(&'static str, serde_json::Value)>) {
    let mut clauses = Vec::new();
    let mut variables = Vec::new();
    if let Some(labels) = labels {
        if !labels.is_empty() {
            clauses.push("labels CONTAINSANY $labels".to_string());
            variables.push(("labels", serde_json::json!(labels)));
        }
    }
    if let Some(ctx) = context {
        clauses.push("context = $context".to_string());
        variables.push(("context", serde_json::json!(ctx)));
    }
    if clauses.is_empty() {
        (String::new(), variables)
    } else {
        (format!(" AND {}", clauses.join(" AND ")), variables)
    }
}

/// Lexical (BM25 full-text) candidates against `table.field`, up to
/// `limit` rows, highest score first.
pub async fn lexical_candidates(
    session: &BackendSession,
    table: &str,
    field: &str,
    query_text: &str,
    limit: u32,
    labels: Option<&[String]>,
    context: Option<&str>,
) -> Result<Vec<Candidate>> {
    let (filter, mut variables) = scope_filter(labels, context);
    variables.insert(0, ("query_text", serde_json::json!(query_text)));
    variables.push(("limit", serde_json::json!(limit)));

    let statement = format!(
        "SELECT id, {BM25_SCORE_FN}(0) AS score FROM {table} \
         WHERE {field} {FULLTEXT_MATCH_OP} $query_text{filter} \
         ORDER BY score DESC LIMIT $limit"
    );

    let mut response = session.query(&statement, variables).await?;
    let rows = take::<CandidateRow>(&mut response, 0, "lexical_candidates")?;
    Ok(rows_to_candidates(rows))
}

/// Vector (HNSW cosine) candidates against `table.field`, up to `limit`
/// rows, highest similarity first.
pub async fn vector_candidates(
    session: &BackendSession,
    table: &str,
    field: &str,
    query_embedding: &[f32],
    limit: u32,
    labels: Option<&[String]>,
    context: Option<&str>,
) -> Result<Vec<Candidate>> {
    let (filter, mut variables) = scope_filter(labels, context);
    variables.insert(0, ("query_embedding", serde_json::json!(query_embedding)));
    variables.push(("limit", serde_json::json!(limit)));
    variables.push(("ef", serde_json::json!(VECTOR_EF)));

    let statement = format!(
        "SELECT id, {COSINE_SIMILARITY_FN}({field}, $query_embedding) AS score FROM {table} \
         WHERE {field} <|$limit,{{ef:$ef}}|> $query_embedding{filter} \
         ORDER BY score DESC LIMIT $limit"
    );

    let mut response = session.query(&statement, variables).await?;
    let rows = take::<CandidateRow>(&mut response, 0, "vector_candidates")?;
    Ok(rows_to_candidates(rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_filter_combines_labels_and_context() {
        let labels = vec!["pref".to_string()];
        let (clause, vars) = scope_filter(Some(&labels), Some("proj"));
        assert!(clause.contains("labels CONTAINSANY $labels"));
        assert!(clause.contains("context = $context"));
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn scope_filter_empty_when_nothing_bound() {
        let (clause, vars) = scope_filter(None, None);
        assert_eq!(clause, "");
        assert!(vars.is_empty());
    }
}
