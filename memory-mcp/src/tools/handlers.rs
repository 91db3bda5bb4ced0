//! One handler function per tool (spec §4.4): decode already-typed
//! arguments, resolve context, call into the engines or directly into the
//! Query Layer, and shape a JSON result. No statement assembly happens
//! here — that is the Query Layer's job.

use chrono::{DateTime, NaiveDateTime, Utc};
use memory_backend::query::{entities, episodes, graph, procedures};
use memory_backend::query::relations as relations_query;
use memory_core::model::{Entity, Episode, Procedure, ProcedureStep, Relation};
use memory_core::{Error, Result};
use serde_json::{json, Value};

use crate::state::AppState;
use crate::tools::args::{
    AddEpisodeArgs, ContextArgs, CreateProcedureArgs, FindPathArgs, IdArgs, PingArgs, ReflectArgs,
    RememberArgs, SearchArgs, SearchEpisodesArgs, SearchProceduresArgs, TraverseArgs,
};

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    // Bare timestamps (no offset) are treated as UTC (spec §6 `add_episode` note).
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Ok(DateTime::<Utc>::from_naive_utc_and_offset(naive, Utc));
        }
    }
    Err(Error::validation(
        "add_episode",
        format!("timestamp is not a valid ISO-8601 value: {raw}"),
    ))
}

pub async fn search(state: &AppState, args: SearchArgs) -> Result<Value> {
    let context = state.context_detector.resolve(args.context.as_deref());
    let limit = memory_engine::retrieval::resolve_limit(args.limit)?;
    let hits = state
        .retrieval
        .search_entities(&args.query, args.labels.as_deref(), limit, context.as_deref())
        .await?;
    Ok(json!({
        "results": hits.into_iter().map(|h| json!({ "entity": h.record, "score": h.score })).collect::<Vec<_>>(),
    }))
}

pub async fn get_entity(state: &AppState, args: IdArgs) -> Result<Value> {
    let entity = entities::get_entity(&state.session, &args.id)
        .await?
        .ok_or_else(|| Error::not_found("entity", &args.id))?;
    Ok(serde_json::to_value(entity).unwrap_or(Value::Null))
}

pub async fn list_labels(state: &AppState, args: ContextArgs) -> Result<Value> {
    let context = state.context_detector.resolve(args.context.as_deref());
    let rows = entities::list_labels(&state.session, context.as_deref()).await?;
    Ok(json!(rows
        .into_iter()
        .map(|r| json!({ "label": r.label, "count": r.count }))
        .collect::<Vec<_>>()))
}

pub async fn list_types(state: &AppState, args: ContextArgs) -> Result<Value> {
    let context = state.context_detector.resolve(args.context.as_deref());
    let rows = entities::list_types(&state.session, context.as_deref()).await?;
    Ok(json!(rows
        .into_iter()
        .map(|r| json!({ "type": r.entity_type, "count": r.count }))
        .collect::<Vec<_>>()))
}

pub async fn remember(state: &AppState, args: RememberArgs) -> Result<Value> {
    let mut stored_entities = Vec::new();
    for item in args.entities.unwrap_or_default() {
        let mut entity = Entity::new(item.id, item.entity_type, item.content);
        if let Some(labels) = item.labels {
            entity.merge_labels(labels);
        }
        if let Some(confidence) = item.confidence {
            entity = entity.with_confidence(confidence);
        }
        entity.source = item.source;
        entity.context = state.context_detector.resolve(item.context.as_deref());
        entity.embedding = state.embed_client.embed(&entity.content).await?;
        stored_entities.push(entities::upsert_entity(&state.session, entity).await?);
    }

    let mut stored_relations = Vec::new();
    for item in args.relations.unwrap_or_default() {
        let relation = Relation::new(item.from, item.to, item.rel_type, item.weight.unwrap_or(1.0));
        stored_relations.push(relations_query::create_relation(&state.session, &relation).await?);
    }

    Ok(json!({ "entities": stored_entities, "relations": stored_relations }))
}

pub async fn forget(state: &AppState, args: IdArgs) -> Result<Value> {
    let deleted = entities::delete_entity(&state.session, &args.id).await?;
    Ok(json!({ "deleted": deleted }))
}

pub async fn traverse(state: &AppState, args: TraverseArgs) -> Result<Value> {
    let depth = memory_engine::graph::resolve_depth(args.depth)?;
    let result = state
        .graph
        .traverse(&args.start, depth, args.relation_types.as_deref())
        .await?;
    Ok(serde_json::to_value(result).unwrap_or(Value::Null))
}

pub async fn find_path(state: &AppState, args: FindPathArgs) -> Result<Value> {
    let max_depth = memory_engine::graph::resolve_max_depth(args.max_depth)?;
    let result = state.graph.find_path(&args.from, &args.to, max_depth).await?;
    Ok(serde_json::to_value(result).unwrap_or(Value::Null))
}

pub async fn add_episode(state: &AppState, args: AddEpisodeArgs) -> Result<Value> {
    let id = uuid::Uuid::new_v4().to_string();
    let mut episode = Episode::new(id, args.content);
    episode.summary = args.summary;
    episode.context = state.context_detector.resolve(args.context.as_deref());
    if let Some(raw) = args.timestamp {
        episode.timestamp = parse_timestamp(&raw)?;
    }
    if let Some(metadata) = args.metadata {
        episode.metadata = metadata;
    }
    episode.entity_ids = args.entity_ids.unwrap_or_default();
    episode.embedding = state.embed_client.embed(&episode.content).await?;

    let stored = episodes::upsert_episode(&state.session, &episode).await?;
    Ok(serde_json::to_value(stored).unwrap_or(Value::Null))
}

pub async fn search_episodes(state: &AppState, args: SearchEpisodesArgs) -> Result<Value> {
    let context = state.context_detector.resolve(args.context.as_deref());
    let limit = memory_engine::retrieval::resolve_limit(args.limit)?;
    let before = args.before.as_deref().map(parse_timestamp).transpose()?;
    let after = args.after.as_deref().map(parse_timestamp).transpose()?;
    let hits = state
        .retrieval
        .search_episodes(&args.query, limit, context.as_deref(), before, after)
        .await?;
    Ok(json!({
        "results": hits.into_iter().map(|h| json!({ "episode": h.record, "score": h.score })).collect::<Vec<_>>(),
    }))
}

pub async fn get_episode(state: &AppState, args: IdArgs) -> Result<Value> {
    let episode = episodes::get_episode(&state.session, &args.id)
        .await?
        .ok_or_else(|| Error::not_found("episode", &args.id))?;
    Ok(serde_json::to_value(episode).unwrap_or(Value::Null))
}

pub async fn delete_episode(state: &AppState, args: IdArgs) -> Result<Value> {
    let deleted = episodes::delete_episode(&state.session, &args.id).await?;
    Ok(json!({ "deleted": deleted }))
}

pub async fn create_procedure(state: &AppState, args: CreateProcedureArgs) -> Result<Value> {
    let id = uuid::Uuid::new_v4().to_string();
    let mut procedure = Procedure::new(id, args.name, args.description);
    procedure.steps = args
        .steps
        .into_iter()
        .map(|s| ProcedureStep {
            content: s.content,
            optional: s.optional,
        })
        .collect();
    if let Some(labels) = args.labels {
        procedure.labels.extend(labels);
    }
    procedure.context = state.context_detector.resolve(args.context.as_deref());
    procedure.embedding = state.embed_client.embed(&procedure.lexical_text()).await?;

    let stored = procedures::upsert_procedure(&state.session, &procedure).await?;
    Ok(serde_json::to_value(stored).unwrap_or(Value::Null))
}

pub async fn search_procedures(state: &AppState, args: SearchProceduresArgs) -> Result<Value> {
    let context = state.context_detector.resolve(args.context.as_deref());
    let limit = memory_engine::retrieval::resolve_limit(args.limit)?;
    let hits = state
        .retrieval
        .search_procedures(&args.query, limit, context.as_deref())
        .await?;
    Ok(json!({
        "results": hits.into_iter().map(|h| json!({ "procedure": h.record, "score": h.score })).collect::<Vec<_>>(),
    }))
}

pub async fn get_procedure(state: &AppState, args: IdArgs) -> Result<Value> {
    let procedure = procedures::get_procedure(&state.session, &args.id)
        .await?
        .ok_or_else(|| Error::not_found("procedure", &args.id))?;
    Ok(serde_json::to_value(procedure).unwrap_or(Value::Null))
}

pub async fn list_procedures(state: &AppState, args: ContextArgs) -> Result<Value> {
    let context = state.context_detector.resolve(args.context.as_deref());
    let rows = procedures::list_procedures(&state.session, context.as_deref()).await?;
    Ok(json!(rows))
}

pub async fn delete_procedure(state: &AppState, args: IdArgs) -> Result<Value> {
    let deleted = procedures::delete_procedure(&state.session, &args.id).await?;
    Ok(json!({ "deleted": deleted }))
}

pub async fn reflect(state: &AppState, args: ReflectArgs) -> Result<Value> {
    let context = state.context_detector.resolve(args.context.as_deref());
    let global = args.global.unwrap_or(false);
    match args.action.as_str() {
        "decay" => {
            let days = memory_engine::maintenance::resolve_decay_days(args.decay_days);
            let dry_run = args.dry_run.unwrap_or(false);
            let result = state
                .maintenance
                .decay(days, context.as_deref(), global, dry_run)
                .await?;
            Ok(serde_json::to_value(result).unwrap_or(Value::Null))
        }
        "similar" => {
            let threshold =
                memory_engine::maintenance::resolve_similarity_threshold(args.similarity_threshold);
            let limit = memory_engine::maintenance::resolve_limit(args.limit);
            let result = state
                .maintenance
                .similar(threshold, limit, context.as_deref(), global)
                .await?;
            Ok(serde_json::to_value(result).unwrap_or(Value::Null))
        }
        other => Err(Error::validation(
            "reflect",
            format!("action must be 'decay' or 'similar', got '{other}'"),
        )),
    }
}

pub async fn ping(_state: &AppState, _args: PingArgs) -> Result<Value> {
    Ok(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rfc3339_timestamp() {
        let dt = parse_timestamp("2024-01-01T00:00:00Z").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn parses_bare_timestamp_as_utc() {
        let dt = parse_timestamp("2024-01-01T00:00:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_timestamp("not a date").is_err());
    }
}
