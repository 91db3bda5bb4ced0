//! The three persistent memory kinds plus the edge kind (spec §3).

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Floor below which `decay_weight` and `importance` may never drop
/// (invariant E3).
pub const DECAY_FLOOR: f32 = 0.1;

/// Schema dimension assumed unless the backend is configured otherwise
/// (invariant E1's default `D`).
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

fn clamp_decay(value: f32) -> f32 {
    value.clamp(DECAY_FLOOR, 1.0)
}

/// A free-form knowledge atom: a fact, preference, or decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    pub labels: BTreeSet<String>,
    pub content: String,
    pub embedding: Vec<f32>,
    pub confidence: f32,
    pub source: Option<String>,
    pub decay_weight: f32,
    pub context: Option<String>,
    pub importance: f32,
    pub accessed: DateTime<Utc>,
    pub access_count: u64,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Entity {
    /// Builds a brand-new entity with the starting values spec §3 mandates:
    /// `decay_weight == 1.0`, `importance == 1.0`, `access_count == 0`.
    #[must_use]
    pub fn new(id: impl Into<String>, entity_type: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            labels: BTreeSet::new(),
            content: content.into(),
            embedding: Vec::new(),
            confidence: 1.0,
            source: None,
            decay_weight: 1.0,
            context: None,
            importance: 1.0,
            accessed: now,
            access_count: 0,
            created: now,
            updated: now,
        }
    }

    /// Union of this entity's labels with `other`, applying R1/upsert-merge
    /// semantics ("labels on update are the union of existing and new").
    pub fn merge_labels(&mut self, other: impl IntoIterator<Item = String>) {
        self.labels.extend(other);
    }

    /// Applies the access-tracking mutation from `update_access`
    /// (spec §4.3): `accessed := now; access_count += 1; decay_weight := 1.0`.
    /// `access_count` only ever grows (invariant E2).
    pub fn record_access(&mut self) {
        self.accessed = Utc::now();
        self.access_count += 1;
        self.decay_weight = 1.0;
    }

    /// Applies one round of decay (spec §4.7 step 2), respecting the floor
    /// (invariant E3).
    pub fn apply_decay_step(&mut self) {
        self.decay_weight = clamp_decay(self.decay_weight * 0.9);
        self.importance = clamp_decay(self.importance * 0.9);
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = clamp_unit(confidence);
        self
    }
}

/// A chronological interaction transcript that may link to entities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub id: String,
    pub content: String,
    pub summary: Option<String>,
    pub context: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub embedding: Vec<f32>,
    pub access_count: u64,
    pub metadata: Value,
    #[serde(default)]
    pub entity_ids: Vec<String>,
}

impl Episode {
    #[must_use]
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            summary: None,
            context: None,
            timestamp: Utc::now(),
            embedding: Vec::new(),
            access_count: 0,
            metadata: Value::Object(serde_json::Map::new()),
            entity_ids: Vec::new(),
        }
    }

    pub fn record_access(&mut self) {
        self.access_count += 1;
    }
}

/// One step of a named, ordered procedure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcedureStep {
    pub content: String,
    #[serde(default)]
    pub optional: bool,
}

/// A named, ordered step sequence describing a how-to workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Procedure {
    pub id: String,
    pub name: String,
    pub description: String,
    pub steps: Vec<ProcedureStep>,
    pub embedding: Vec<f32>,
    pub labels: BTreeSet<String>,
    pub context: Option<String>,
    pub access_count: u64,
}

impl Procedure {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            steps: Vec::new(),
            embedding: Vec::new(),
            labels: BTreeSet::new(),
            context: None,
            access_count: 0,
        }
    }

    /// Text used for the lexical side of hybrid search (spec §4.5):
    /// name + description + steps concatenated.
    #[must_use]
    pub fn lexical_text(&self) -> String {
        let mut text = format!("{} {}", self.name, self.description);
        for step in &self.steps {
            text.push(' ');
            text.push_str(&step.content);
        }
        text
    }

    pub fn record_access(&mut self) {
        self.access_count += 1;
    }
}

/// A directed, typed, weighted edge between two entities (the `relates`
/// table). At most one edge per `(from, to, rel_type)` triple (invariant
/// R1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relation {
    pub from: String,
    pub to: String,
    pub rel_type: String,
    pub weight: f32,
    #[serde(default)]
    pub metadata: Value,
}

impl Relation {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>, rel_type: impl Into<String>, weight: f32) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            rel_type: rel_type.into(),
            weight: clamp_unit(weight),
            metadata: Value::Object(serde_json::Map::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_entity_starts_at_full_weight() {
        let e = Entity::new("e1", "fact", "hello");
        assert_eq!(e.decay_weight, 1.0);
        assert_eq!(e.importance, 1.0);
        assert_eq!(e.access_count, 0);
    }

    #[test]
    fn decay_never_drops_below_floor() {
        let mut e = Entity::new("e1", "fact", "hello");
        for _ in 0..200 {
            e.apply_decay_step();
        }
        assert!(e.decay_weight >= DECAY_FLOOR);
        assert!(e.importance >= DECAY_FLOOR);
    }

    #[test]
    fn record_access_is_monotone_and_resets_decay() {
        let mut e = Entity::new("e1", "fact", "hello");
        e.decay_weight = 0.2;
        e.record_access();
        assert_eq!(e.access_count, 1);
        assert_eq!(e.decay_weight, 1.0);
        e.record_access();
        assert_eq!(e.access_count, 2);
    }

    #[test]
    fn merge_labels_is_a_union() {
        let mut e = Entity::new("e1", "fact", "hello");
        e.merge_labels(["a".to_string(), "b".to_string()]);
        e.merge_labels(["b".to_string(), "c".to_string()]);
        assert_eq!(e.labels.len(), 3);
    }

    #[test]
    fn procedure_lexical_text_concatenates_steps() {
        let mut p = Procedure::new("p1", "Deploy", "How to deploy the service");
        p.steps.push(ProcedureStep {
            content: "run tests".to_string(),
            optional: false,
        });
        p.steps.push(ProcedureStep {
            content: "push image".to_string(),
            optional: false,
        });
        let text = p.lexical_text();
        assert!(text.contains("Deploy"));
        assert!(text.contains("run tests"));
        assert!(text.contains("push image"));
    }

    #[test]
    fn relation_weight_is_clamped_to_unit_interval() {
        let r = Relation::new("entity:a", "entity:b", "uses", 1.5);
        assert_eq!(r.weight, 1.0);
        let r2 = Relation::new("entity:a", "entity:b", "uses", -0.5);
        assert_eq!(r2.weight, 0.0);
    }
}
