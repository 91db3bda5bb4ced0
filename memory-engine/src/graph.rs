//! Graph Engine (spec §4.6): bounded-depth neighbor traversal and shortest
//! path between two entities. Both are single backend statements — this
//! layer only clamps bounds, fetches the anchor entity, and shapes the
//! result; no BFS/DFS runs here or in the Query Layer.

use std::sync::Arc;

use memory_backend::query::{entities, graph};
use memory_backend::BackendSession;
use memory_core::model::Entity;
use memory_core::{Error, Result};
use serde::Serialize;

pub use memory_backend::query::graph::{Neighbor, PathResult};

/// Default/bound pair for `traverse`'s `depth` (spec §4.6: "clamped to
/// [1,10]; default 2").
const DEFAULT_DEPTH: u32 = 2;
const MIN_DEPTH: u32 = 1;
const MAX_DEPTH: u32 = 10;

/// Default/bound pair for `find_path`'s `max_depth` (spec §4.6: "clamped to
/// [1,20], default 5").
const DEFAULT_MAX_DEPTH: u32 = 5;
const MIN_MAX_DEPTH: u32 = 1;
const MAX_MAX_DEPTH: u32 = 20;

/// `traverse`'s clamp: `0`/absent defaults to 2; anything outside [1,10] is
/// a validation error (spec §8 "boundary behaviour": "`depth = 0` defaults
/// to 2; `depth = 11` fails validation").
pub fn resolve_depth(requested: Option<i64>) -> Result<u32> {
    match requested {
        None | Some(0) => Ok(DEFAULT_DEPTH),
        Some(n) if n < MIN_DEPTH as i64 || n > MAX_DEPTH as i64 => Err(Error::validation(
            "traverse",
            format!("depth must be in [{MIN_DEPTH},{MAX_DEPTH}], got {n}"),
        )),
        Some(n) => Ok(n as u32),
    }
}

/// `find_path`'s clamp for `max_depth`.
pub fn resolve_max_depth(requested: Option<i64>) -> Result<u32> {
    match requested {
        None | Some(0) => Ok(DEFAULT_MAX_DEPTH),
        Some(n) if n < MIN_MAX_DEPTH as i64 || n > MAX_MAX_DEPTH as i64 => Err(Error::validation(
            "find_path",
            format!("max_depth must be in [{MIN_MAX_DEPTH},{MAX_MAX_DEPTH}], got {n}"),
        )),
        Some(n) => Ok(n as u32),
    }
}

/// The start entity annotated with its outgoing and incoming neighbor lists
/// (spec §4.6 `traverse`'s result shape).
#[derive(Debug, Clone, Serialize)]
pub struct TraversalResult {
    pub entity: Entity,
    pub outgoing_neighbors: Vec<Neighbor>,
    pub incoming_neighbors: Vec<Neighbor>,
}

/// Bidirectional traversal and shortest-path search over the `relates`
/// graph.
pub struct GraphEngine {
    session: Arc<BackendSession>,
}

impl GraphEngine {
    #[must_use]
    pub fn new(session: Arc<BackendSession>) -> Self {
        Self { session }
    }

    /// Bounded-depth, direction-symmetric exploration from `start` (spec
    /// §4.6). Fails with [`Error::NotFound`] if `start` does not exist.
    pub async fn traverse(
        &self,
        start_id: &str,
        depth: u32,
        rel_types: Option<&[String]>,
    ) -> Result<TraversalResult> {
        let entity = entities::get_entity(&self.session, start_id)
            .await?
            .ok_or_else(|| Error::not_found("entity", start_id))?;

        let (outgoing_neighbors, incoming_neighbors) =
            graph::traverse(&self.session, &entity.id, depth, rel_types).await?;

        Ok(TraversalResult {
            entity,
            outgoing_neighbors,
            incoming_neighbors,
        })
    }

    /// Shortest directed path of length ≤ `max_depth` between two entities
    /// (spec §4.6 `find_path`). `from == to` is the zero-length trivial
    /// path, answered without a round trip to the backend.
    pub async fn find_path(&self, from_id: &str, to_id: &str, max_depth: u32) -> Result<PathResult> {
        graph::find_path(&self.session, from_id, to_id, max_depth).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_depth_defaults_on_zero_or_missing() {
        assert_eq!(resolve_depth(None).unwrap(), DEFAULT_DEPTH);
        assert_eq!(resolve_depth(Some(0)).unwrap(), DEFAULT_DEPTH);
    }

    #[test]
    fn resolve_depth_rejects_out_of_range() {
        assert!(resolve_depth(Some(11)).is_err());
        assert!(resolve_depth(Some(-1)).is_err());
    }

    #[test]
    fn resolve_depth_passes_through_in_range_values() {
        assert_eq!(resolve_depth(Some(5)).unwrap(), 5);
        assert_eq!(resolve_depth(Some(10)).unwrap(), 10);
    }

    #[test]
    fn resolve_max_depth_defaults_and_bounds() {
        assert_eq!(resolve_max_depth(None).unwrap(), DEFAULT_MAX_DEPTH);
        assert!(resolve_max_depth(Some(21)).is_err());
        assert_eq!(resolve_max_depth(Some(20)).unwrap(), 20);
    }
}
