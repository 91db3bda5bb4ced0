#![allow(clippy::missing_errors_doc)]

//! # Memory Backend
//!
//! The Backend Session (spec §4.1), Schema Installer (spec §4.8), and Query
//! Layer (spec §4.3) that together give the rest of the workspace a typed,
//! reconnecting view onto the graph database.
//!
//! Grounded in two places: the teacher's stdio-protocol crate
//! (`memory-mcp/src/jsonrpc.rs`/`server.rs`) for the "one shared session,
//! re-run auth on reconnect" shape described in spec §9, and the pack's
//! `surreal-mind`/`oxide-pilot` examples for the concrete `surrealdb` crate
//! API — `Surreal<Client>`, `.use_ns().use_db()`, `db.query(sql).bind(...)`,
//! `result.take(0)`.

pub mod dialect;
pub mod query;
pub mod schema;
pub mod session;

pub use session::{BackendSession, SessionConfig};
