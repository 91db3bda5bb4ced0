//! Typed argument shapes for the 19 tools (spec §6 table).
//!
//! A field typed as a bare (non-`Option`) type is a *required* argument:
//! deserializing it from a request missing that field fails, which the
//! dispatcher turns into a protocol-level error (spec §4.4 "structural
//! violations"). Bound checks that need domain knowledge — `limit`,
//! `depth`, `max_depth`, `similarity_threshold` — are left as raw `Option`s
//! here and resolved/validated by the engines, which is where the tool
//! error vs. protocol error distinction actually lives for those.

use serde::Deserialize;
use serde_json::Value;

fn default_object() -> Option<Value> {
    None
}

#[derive(Debug, Deserialize)]
pub struct SearchArgs {
    pub query: String,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdArgs {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ContextArgs {
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RememberEntityArg {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub content: String,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RememberRelationArg {
    pub from: String,
    pub to: String,
    pub rel_type: String,
    #[serde(default)]
    pub weight: Option<f32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RememberArgs {
    #[serde(default)]
    pub entities: Option<Vec<RememberEntityArg>>,
    #[serde(default)]
    pub relations: Option<Vec<RememberRelationArg>>,
}

#[derive(Debug, Deserialize)]
pub struct TraverseArgs {
    pub start: String,
    #[serde(default)]
    pub depth: Option<i64>,
    #[serde(default)]
    pub relation_types: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct FindPathArgs {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub max_depth: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct AddEpisodeArgs {
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default = "default_object")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub entity_ids: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct SearchEpisodesArgs {
    pub query: String,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub before: Option<String>,
    #[serde(default)]
    pub after: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProcedureStepArg {
    pub content: String,
    #[serde(default)]
    pub optional: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateProcedureArgs {
    pub name: String,
    pub description: String,
    pub steps: Vec<ProcedureStepArg>,
    #[serde(default)]
    pub labels: Option<Vec<String>>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchProceduresArgs {
    pub query: String,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReflectArgs {
    pub action: String,
    #[serde(default)]
    pub decay_days: Option<i64>,
    #[serde(default)]
    pub similarity_threshold: Option<f32>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub dry_run: Option<bool>,
    #[serde(default)]
    pub global: Option<bool>,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PingArgs {}

/// Decodes `arguments` into `T`, treating an absent argument object as `{}`
/// so that missing *required* fields surface the same "missing field"
/// deserialize error whether the caller omitted `arguments` entirely or
/// sent an empty object.
pub fn parse<T: for<'de> Deserialize<'de>>(arguments: Option<Value>) -> Result<T, serde_json::Error> {
    let value = arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_required_field_is_a_deserialize_error() {
        let result: Result<IdArgs, _> = parse(Some(json!({})));
        assert!(result.is_err());
    }

    #[test]
    fn absent_arguments_object_is_treated_as_empty() {
        let result: Result<ContextArgs, _> = parse(None);
        assert!(result.is_ok());
        assert!(result.unwrap().context.is_none());
    }

    #[test]
    fn search_args_round_trips() {
        let args: SearchArgs = parse(Some(json!({ "query": "refund", "limit": 5 }))).unwrap();
        assert_eq!(args.query, "refund");
        assert_eq!(args.limit, Some(5));
        assert!(args.labels.is_none());
    }
}
