//! The 19-tool catalog (spec §4.4, §6): name, description, and input
//! schema for every tool `tools/list` advertises. Schemas are plain
//! `serde_json::json!()` values — the pack never reaches for an external
//! JSON-Schema validation crate, so neither do we; the dispatcher's own
//! typed [`crate::tools::args`] structs do the actual enforcement.

use serde_json::{json, Value};

use crate::protocol::Tool;

fn schema(properties: Value, required: &[&str]) -> Value {
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[must_use]
pub fn catalog() -> Vec<Tool> {
    vec![
        Tool::new(
            "search",
            "Hybrid lexical+vector search over entities",
            schema(
                json!({
                    "query": { "type": "string" },
                    "labels": { "type": "array", "items": { "type": "string" } },
                    "limit": { "type": "integer", "minimum": 1, "maximum": 100 },
                    "context": { "type": "string" },
                }),
                &["query"],
            ),
        ),
        Tool::new(
            "get_entity",
            "Fetches a single entity by id (bare id or table:id)",
            schema(json!({ "id": { "type": "string" } }), &["id"]),
        ),
        Tool::new(
            "list_labels",
            "Lists distinct entity labels with counts",
            schema(json!({ "context": { "type": "string" } }), &[]),
        ),
        Tool::new(
            "list_types",
            "Lists distinct entity types with counts",
            schema(json!({ "context": { "type": "string" } }), &[]),
        ),
        Tool::new(
            "remember",
            "Upserts entities and/or relations",
            schema(
                json!({
                    "entities": { "type": "array" },
                    "relations": { "type": "array" },
                }),
                &[],
            ),
        ),
        Tool::new(
            "forget",
            "Deletes an entity, cascading incident edges",
            schema(json!({ "id": { "type": "string" } }), &["id"]),
        ),
        Tool::new(
            "traverse",
            "Bounded-depth bidirectional neighbor exploration from a start entity",
            schema(
                json!({
                    "start": { "type": "string" },
                    "depth": { "type": "integer", "minimum": 1, "maximum": 10 },
                    "relation_types": { "type": "array", "items": { "type": "string" } },
                }),
                &["start"],
            ),
        ),
        Tool::new(
            "find_path",
            "Shortest directed path between two entities",
            schema(
                json!({
                    "from": { "type": "string" },
                    "to": { "type": "string" },
                    "max_depth": { "type": "integer", "minimum": 1, "maximum": 20 },
                }),
                &["from", "to"],
            ),
        ),
        Tool::new(
            "add_episode",
            "Records a chronological interaction transcript",
            schema(
                json!({
                    "content": { "type": "string" },
                    "summary": { "type": "string" },
                    "timestamp": { "type": "string" },
                    "context": { "type": "string" },
                    "metadata": { "type": "object" },
                    "entity_ids": { "type": "array", "items": { "type": "string" } },
                }),
                &["content"],
            ),
        ),
        Tool::new(
            "search_episodes",
            "Hybrid search over episodes with an optional time window",
            schema(
                json!({
                    "query": { "type": "string" },
                    "limit": { "type": "integer", "minimum": 1, "maximum": 100 },
                    "context": { "type": "string" },
                    "before": { "type": "string" },
                    "after": { "type": "string" },
                }),
                &["query"],
            ),
        ),
        Tool::new(
            "get_episode",
            "Fetches a single episode by id",
            schema(json!({ "id": { "type": "string" } }), &["id"]),
        ),
        Tool::new(
            "delete_episode",
            "Deletes an episode, cascading its mentions links",
            schema(json!({ "id": { "type": "string" } }), &["id"]),
        ),
        Tool::new(
            "create_procedure",
            "Creates a named, ordered how-to workflow",
            schema(
                json!({
                    "name": { "type": "string" },
                    "description": { "type": "string" },
                    "steps": { "type": "array" },
                    "labels": { "type": "array", "items": { "type": "string" } },
                    "context": { "type": "string" },
                }),
                &["name", "description", "steps"],
            ),
        ),
        Tool::new(
            "search_procedures",
            "Hybrid search over procedures",
            schema(
                json!({
                    "query": { "type": "string" },
                    "limit": { "type": "integer", "minimum": 1, "maximum": 100 },
                    "context": { "type": "string" },
                }),
                &["query"],
            ),
        ),
        Tool::new(
            "get_procedure",
            "Fetches a single procedure by id",
            schema(json!({ "id": { "type": "string" } }), &["id"]),
        ),
        Tool::new(
            "list_procedures",
            "Lists all procedures, optionally scoped to a context",
            schema(json!({ "context": { "type": "string" } }), &[]),
        ),
        Tool::new(
            "delete_procedure",
            "Deletes a procedure",
            schema(json!({ "id": { "type": "string" } }), &["id"]),
        ),
        Tool::new(
            "reflect",
            "Maintenance pass: decay of unused entities or duplicate-pair identification",
            schema(
                json!({
                    "action": { "type": "string", "enum": ["decay", "similar"] },
                    "decay_days": { "type": "integer" },
                    "similarity_threshold": { "type": "number" },
                    "limit": { "type": "integer" },
                    "dry_run": { "type": "boolean" },
                    "global": { "type": "boolean" },
                    "context": { "type": "string" },
                }),
                &["action"],
            ),
        ),
        Tool::new(
            "ping",
            "Health check; always succeeds if the dispatcher is reachable",
            schema(json!({}), &[]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_nineteen_tools() {
        assert_eq!(catalog().len(), 19);
    }

    #[test]
    fn every_tool_name_is_unique() {
        let names: std::collections::HashSet<_> = catalog().into_iter().map(|t| t.name).collect();
        assert_eq!(names.len(), 19);
    }
}
