//! Procedure operations (spec §4.3/§6): `upsert_procedure`, `get_procedure`,
//! `delete_procedure`, `list_procedures`.

use std::collections::BTreeSet;

use memory_core::model::{Procedure, ProcedureStep};
use memory_core::{Error, Result};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use super::record::{id_variables, take, take_one, thing_id};
use crate::session::BackendSession;

const TABLE: &str = "procedure";

#[derive(Debug, Deserialize)]
struct StoredProcedure {
    id: Thing,
    name: String,
    description: String,
    steps: Vec<ProcedureStep>,
    embedding: Vec<f32>,
    labels: BTreeSet<String>,
    context: Option<String>,
    access_count: u64,
}

impl From<StoredProcedure> for Procedure {
    fn from(row: StoredProcedure) -> Self {
        Procedure {
            id: thing_id(&row.id),
            name: row.name,
            description: row.description,
            steps: row.steps,
            embedding: row.embedding,
            labels: row.labels,
            context: row.context,
            access_count: row.access_count,
        }
    }
}

#[derive(Debug, Serialize)]
struct ProcedureContent<'a> {
    name: &'a str,
    description: &'a str,
    steps: &'a [ProcedureStep],
    embedding: &'a [f32],
    labels: &'a BTreeSet<String>,
    context: &'a Option<String>,
    access_count: u64,
    lexical_text: &'a str,
}

/// Creates or replaces a procedure by id. `lexical_text` (name + description
/// + steps, spec §4.5) is stored alongside the record and is what the
/// full-text index actually covers, so step content is searchable.
pub async fn upsert_procedure(session: &BackendSession, procedure: &Procedure) -> Result<Procedure> {
    let lexical_text = procedure.lexical_text();
    let content = ProcedureContent {
        name: &procedure.name,
        description: &procedure.description,
        steps: &procedure.steps,
        embedding: &procedure.embedding,
        labels: &procedure.labels,
        context: &procedure.context,
        access_count: procedure.access_count,
        lexical_text: &lexical_text,
    };

    let mut variables = id_variables(TABLE, &procedure.id);
    variables.push((
        "content",
        serde_json::to_value(&content)
            .map_err(|e| Error::internal("upsert_procedure", e.to_string()))?,
    ));

    let mut response = session
        .query(
            "UPSERT type::thing($tb, $id) CONTENT $content RETURN AFTER",
            variables,
        )
        .await?;

    take_one::<StoredProcedure>(&mut response, 0, "upsert_procedure")?
        .map(Procedure::from)
        .ok_or_else(|| Error::internal("upsert_procedure", "upsert returned no row"))
}

pub async fn get_procedure(session: &BackendSession, raw_id: &str) -> Result<Option<Procedure>> {
    let mut response = session
        .query(
            "SELECT * FROM type::thing($tb, $id)",
            id_variables(TABLE, raw_id),
        )
        .await?;
    Ok(take_one::<StoredProcedure>(&mut response, 0, "get_procedure")?.map(Procedure::from))
}

/// Deletes a procedure. Returns the number of records deleted (0 or 1).
pub async fn delete_procedure(session: &BackendSession, raw_id: &str) -> Result<u64> {
    let mut response = session
        .query(
            "DELETE type::thing($tb, $id) RETURN BEFORE",
            id_variables(TABLE, raw_id),
        )
        .await?;
    let deleted = take::<StoredProcedure>(&mut response, 0, "delete_procedure")?;
    Ok(deleted.len() as u64)
}

/// Lists every procedure, optionally scoped to a context (invariant C1).
pub async fn list_procedures(session: &BackendSession, context: Option<&str>) -> Result<Vec<Procedure>> {
    let (stmt, variables) = match context {
        Some(ctx) => (
            "SELECT * FROM procedure WHERE context = $context".to_string(),
            vec![("context", serde_json::json!(ctx))],
        ),
        None => ("SELECT * FROM procedure".to_string(), Vec::new()),
    };
    let mut response = session.query(&stmt, variables).await?;
    let rows = take::<StoredProcedure>(&mut response, 0, "list_procedures")?;
    Ok(rows.into_iter().map(Procedure::from).collect())
}

pub async fn update_access(session: &BackendSession, raw_id: &str) -> Result<()> {
    session
        .query(
            "UPDATE type::thing($tb, $id) SET access_count += 1",
            id_variables(TABLE, raw_id),
        )
        .await?;
    Ok(())
}
