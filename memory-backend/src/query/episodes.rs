//! Episode operations (spec §4.3/§6): `upsert_episode`, `get_episode`,
//! `delete_episode`, plus the `before`/`after` time-window filter
//! `search_episodes` needs.

use chrono::{DateTime, Utc};
use memory_core::model::Episode;
use memory_core::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use surrealdb::sql::Thing;

use super::record::{id_variables, take, take_one, thing_id};
use crate::session::BackendSession;

const TABLE: &str = "episode";

#[derive(Debug, Deserialize)]
struct StoredEpisode {
    id: Thing,
    content: String,
    summary: Option<String>,
    context: Option<String>,
    timestamp: DateTime<Utc>,
    embedding: Vec<f32>,
    access_count: u64,
    metadata: Value,
    #[serde(default)]
    entity_ids: Vec<String>,
}

impl From<StoredEpisode> for Episode {
    fn from(row: StoredEpisode) -> Self {
        Episode {
            id: thing_id(&row.id),
            content: row.content,
            summary: row.summary,
            context: row.context,
            timestamp: row.timestamp,
            embedding: row.embedding,
            access_count: row.access_count,
            metadata: row.metadata,
            entity_ids: row.entity_ids,
        }
    }
}

#[derive(Debug, Serialize)]
struct EpisodeContent<'a> {
    content: &'a str,
    summary: &'a Option<String>,
    context: &'a Option<String>,
    timestamp: DateTime<Utc>,
    embedding: &'a [f32],
    access_count: u64,
    metadata: &'a Value,
    entity_ids: &'a [String],
}

/// Creates or replaces an episode by id (`add_episode` is the tool-level
/// name; episodes are write-once in practice but the operation is an
/// upsert like every other record kind for consistency).
pub async fn upsert_episode(session: &BackendSession, episode: &Episode) -> Result<Episode> {
    let content = EpisodeContent {
        content: &episode.content,
        summary: &episode.summary,
        context: &episode.context,
        timestamp: episode.timestamp,
        embedding: &episode.embedding,
        access_count: episode.access_count,
        metadata: &episode.metadata,
        entity_ids: &episode.entity_ids,
    };

    let mut variables = id_variables(TABLE, &episode.id);
    variables.push((
        "content",
        serde_json::to_value(&content)
            .map_err(|e| Error::internal("upsert_episode", e.to_string()))?,
    ));

    let mut response = session
        .query(
            "UPSERT type::thing($tb, $id) CONTENT $content RETURN AFTER",
            variables,
        )
        .await?;

    let stored = take_one::<StoredEpisode>(&mut response, 0, "upsert_episode")?
        .ok_or_else(|| Error::internal("upsert_episode", "upsert returned no row"))?;

    for entity_id in &episode.entity_ids {
        let mut link_vars = id_variables("entity", entity_id);
        link_vars.push(("episode_tb", serde_json::json!(TABLE)));
        link_vars.push(("episode_id", serde_json::json!(stored.id.clone())));
        session
            .query(
                "RELATE (type::thing($episode_tb, $episode_id))->mentions->(type::thing($tb, $id))",
                link_vars,
            )
            .await?;
    }

    Ok(stored.into())
}

/// Fetches an episode by id.
pub async fn get_episode(session: &BackendSession, raw_id: &str) -> Result<Option<Episode>> {
    let mut response = session
        .query(
            "SELECT * FROM type::thing($tb, $id)",
            id_variables(TABLE, raw_id),
        )
        .await?;
    Ok(take_one::<StoredEpisode>(&mut response, 0, "get_episode")?.map(Episode::into))
}

/// Deletes an episode, cascading its `mentions` links. Returns the number
/// of episode records deleted (0 or 1).
pub async fn delete_episode(session: &BackendSession, raw_id: &str) -> Result<u64> {
    let mut variables = id_variables(TABLE, raw_id);
    let rid = memory_core::RecordId::new(TABLE, raw_id);
    variables.push(("rid_str", serde_json::json!(rid.to_string())));

    let mut response = session
        .query(
            "DELETE mentions WHERE string::concat(in) = $rid_str;
             DELETE type::thing($tb, $id) RETURN BEFORE;",
            variables,
        )
        .await?;

    let deleted = take::<StoredEpisode>(&mut response, 1, "delete_episode")?;
    Ok(deleted.len() as u64)
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
