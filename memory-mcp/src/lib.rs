#![allow(clippy::missing_errors_doc)]

//! # Memory MCP
//!
//! The Tool Dispatcher (spec §4.4) and stdio tool-invocation protocol (spec
//! §6): frames one JSON-RPC request at a time off stdin, validates and
//! dispatches to a handler, and writes the response back to stdout.
//!
//! ## Module Organization
//!
//! - [`jsonrpc`]: message framing (LSP-style `Content-Length` or bare
//!   newline-delimited JSON) and the request/response envelope.
//! - [`protocol`]: `initialize`, `tools/list`, `tools/call` payload shapes.
//! - [`tools`]: the 19-tool catalog, typed argument structs, and handlers.
//! - [`dispatch`]: routes a decoded `tools/call` to its handler.
//! - [`state`]: the process-wide shared `AppState`.
//! - [`server`]: the stdio main loop tying the above together.

pub mod dispatch;
pub mod jsonrpc;
pub mod protocol;
pub mod server;
pub mod state;
pub mod tools;
