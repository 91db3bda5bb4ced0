#![allow(clippy::missing_errors_doc)]

//! # Memory Engine
//!
//! The Retrieval Engine (spec §4.5), Graph Engine (spec §4.6), and
//! Maintenance Engine (spec §4.7): the layer that turns Query Layer
//! primitives into the algorithms a tool call actually wants — hybrid
//! search with Reciprocal Rank Fusion, bounded graph traversal and
//! shortest-path, and decay/similarity maintenance passes.
//!
//! No statement assembly happens here; every function in this crate calls
//! through to `memory_backend::query` for that and only adds orchestration:
//! embedding, fusing, clamping bounds, and firing off access updates.

pub mod graph;
pub mod maintenance;
pub mod retrieval;
pub mod rrf;

pub use graph::GraphEngine;
pub use maintenance::MaintenanceEngine;
pub use retrieval::{RetrievalEngine, SearchHit};
