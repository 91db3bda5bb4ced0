//! Entity operations (spec §4.3): `upsert_entity`, `get_entity`,
//! `delete_entity`, `list_labels`, `list_types`, `update_access`.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use memory_core::model::Entity;
use memory_core::{Error, RecordId, Result};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use super::record::{id_variables, take, take_one, thing_id};
use crate::session::BackendSession;

const TABLE: &str = "entity";

#[derive(Debug, Deserialize)]
struct StoredEntity {
    id: Thing,
    #[serde(rename = "type")]
    entity_type: String,
    labels: BTreeSet<String>,
    content: String,
    embedding: Vec<f32>,
    confidence: f32,
    source: Option<String>,
    decay_weight: f32,
    context: Option<String>,
    importance: f32,
    accessed: DateTime<Utc>,
    access_count: u64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl From<StoredEntity> for Entity {
    fn from(row: StoredEntity) -> Self {
        Entity {
            id: thing_id(&row.id),
            entity_type: row.entity_type,
            labels: row.labels,
            content: row.content,
            embedding: row.embedding,
            confidence: row.confidence,
            source: row.source,
            decay_weight: row.decay_weight,
            context: row.context,
            importance: row.importance,
            accessed: row.accessed,
            access_count: row.access_count,
            created: row.created,
            updated: row.updated,
        }
    }
}

#[derive(Debug, Serialize)]
struct EntityContent<'a> {
    #[serde(rename = "type")]
    entity_type: &'a str,
    labels: &'a BTreeSet<String>,
    content: &'a str,
    embedding: &'a [f32],
    confidence: f32,
    source: &'a Option<String>,
    decay_weight: f32,
    context: &'a Option<String>,
    importance: f32,
    accessed: DateTime<Utc>,
    access_count: u64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

/// Inserts or merges an entity by id: labels union with any existing
/// record's labels, embedding is overwritten, `updated` is refreshed,
/// `created` is preserved if the record already existed (invariant R1's
/// entity-side analogue, spec §4.3).
pub async fn upsert_entity(session: &BackendSession, mut entity: Entity) -> Result<Entity> {
    if entity.embedding.is_empty() {
        return Err(Error::validation("upsert_entity", "embedding must not be empty"));
    }

    let now = Utc::now();
    match get_entity(session, &entity.id).await? {
        Some(existing) => {
            entity.merge_labels(existing.labels);
            entity.created = existing.created;
        }
        None => entity.created = now,
    }
    entity.updated = now;

    let content = EntityContent {
        entity_type: &entity.entity_type,
        labels: &entity.labels,
        content: &entity.content,
        embedding: &entity.embedding,
        confidence: entity.confidence,
        source: &entity.source,
        decay_weight: entity.decay_weight,
        context: &entity.context,
        importance: entity.importance,
        accessed: entity.accessed,
        access_count: entity.access_count,
        created: entity.created,
        updated: entity.updated,
    };

    let mut variables = id_variables(TABLE, &entity.id);
    variables.push((
        "content",
        serde_json::to_value(&content)
            .map_err(|e| Error::internal("upsert_entity", e.to_string()))?,
    ));

    let mut response = session
        .query(
            "UPSERT type::thing($tb, $id) CONTENT $content RETURN AFTER",
            variables,
        )
        .await?;

    take_one::<StoredEntity>(&mut response, 0, "upsert_entity")?
        .map(Entity::from)
        .ok_or_else(|| Error::internal("upsert_entity", "upsert returned no row"))
}

/// Fetches an entity by id (accepting `table:id` or bare id). `None` if
/// absent.
pub async fn get_entity(session: &BackendSession, raw_id: &str) -> Result<Option<Entity>> {
    let mut response = session
        .query(
            "SELECT * FROM type::thing($tb, $id)",
            id_variables(TABLE, raw_id),
        )
        .await?;
    Ok(take_one::<StoredEntity>(&mut response, 0, "get_entity")?.map(Entity::from))
}

/// Deletes an entity and cascades removal of every incident `relates`/
/// `mentions` edge (invariant R2). Returns the number of entity records
/// deleted (0 or 1).
pub async fn delete_entity(session: &BackendSession, raw_id: &str) -> Result<u64> {
    let rid = RecordId::new(TABLE, raw_id);
    let mut variables = id_variables(TABLE, raw_id);
    variables.push(("rid_str", serde_json::json!(rid.to_string())));

    let mut response = session
        .query(
            "DELETE relates WHERE string::concat(in) = $rid_str OR string::concat(out) = $rid_str;
             DELETE mentions WHERE string::concat(out) = $rid_str;
             DELETE type::thing($tb, $id) RETURN BEFORE;",
            variables,
        )
        .await?;

    // The first two statements are cascades; the deleted-entity row set is
    // the third (index 2).
    let deleted = take::<StoredEntity>(&mut response, 2, "delete_entity")?;
    Ok(deleted.len() as u64)
}

/// Marks an entity as accessed: `accessed := now; access_count += 1;
/// decay_weight := 1.0` (spec §4.3 `update_access`). Called fire-and-forget
/// from the Retrieval Engine; failures are the caller's to log, not
/// propagate.
pub async fn update_access(session: &BackendSession, raw_id: &str) -> Result<()> {
    let mut variables = id_variables(TABLE, raw_id);
    variables.push(("now", serde_json::json!(Utc::now())));
    session
        .query(
            "UPDATE type::thing($tb, $id) SET accessed = $now, access_count += 1, decay_weight = 1.0",
            variables,
        )
        .await?;
    Ok(())
}

#[derive(Debug, Deserialize)]
pub struct LabelCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Deserialize)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub entity_type: String,
    pub count: u64,
}

/// Aggregates distinct labels with counts, optionally scoped to a context
/// (invariant C1).
pub async fn list_labels(session: &BackendSession, context: Option<&str>) -> Result<Vec<LabelCount>> {
    let (stmt, variables) = context_scoped(
        "SELECT label, count() AS count FROM (SELECT labels.* AS label FROM entity{filter}) GROUP BY label",
        context,
    );
    let mut response = session.query(&stmt, variables).await?;
    take(&mut response, 0, "list_labels")
}

/// Aggregates distinct entity types with counts, optionally scoped to a
/// context.
pub async fn list_types(session: &BackendSession, context: Option<&str>) -> Result<Vec<TypeCount>> {
    let (stmt, variables) = context_scoped(
        "SELECT type, count() AS count FROM entity{filter} GROUP BY type",
        context,
    );
    let mut response = session.query(&stmt, variables).await?;
    take(&mut response, 0, "list_types")
}

fn context_scoped(template: &str, context: Option<&str>) -> (String, Vec<(&'static str, serde_json::Value)>) {
    match context {
        Some(ctx) => (
            template.replace("{filter}", " WHERE context = $context"),
            vec![("context", serde_json::json!(ctx))],
        ),
        None => (template.replace("{filter}", ""), Vec::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_scoped_adds_filter_only_when_present() {
        let (stmt, vars) = context_scoped("SELECT * FROM entity{filter}", Some("proj"));
        assert!(stmt.contains("WHERE context = $context"));
        assert_eq!(vars.len(), 1);

        let (stmt, vars) = context_scoped("SELECT * FROM entity{filter}", None);
        assert_eq!(stmt, "SELECT * FROM entity");
        assert!(vars.is_empty());
    }
}
