//! The stdio main loop (spec §6): reads one framed request at a time,
//! dispatches by method, and writes the response back in whatever framing
//! the request arrived in.
//!
//! The protocol is serial per connection (spec §5 "Scheduling model" —
//! "one request in flight at a time over a given byte stream"), so the loop
//! is a plain blocking read on a dedicated thread; handlers themselves are
//! async and may fan out to the backend concurrently.

use std::io::{self, Write};
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use crate::dispatch::{dispatch, Dispatch};
use crate::jsonrpc::{read_next_message, write_response_with_length, JsonRpcRequest, JsonRpcResponse};
use crate::protocol::{self, CallToolParams, Tool};
use crate::state::AppState;

fn write_response(stdout: &mut impl Write, response: &JsonRpcResponse, lsp_framed: bool) -> io::Result<()> {
    let body = serde_json::to_string(response)?;
    if lsp_framed {
        write_response_with_length(stdout, &body)
    } else {
        writeln!(stdout, "{body}")?;
        stdout.flush()
    }
}

/// Handles one already-parsed request; returns `None` for notifications
/// (no `id`), which must not produce a response.
async fn handle_request(state: &AppState, request: JsonRpcRequest, tools: &[Tool]) -> Option<JsonRpcResponse> {
    let id = request.id.clone();
    id.as_ref()?;

    match request.method.as_str() {
        "initialize" => Some(protocol::handle_initialize(&request)),
        "tools/list" => Some(protocol::handle_list_tools(&request, tools.to_vec())),
        "tools/call" => {
            let params: CallToolParams = match request.params {
                Some(p) => match serde_json::from_value(p) {
                    Ok(p) => p,
                    Err(e) => {
                        return Some(JsonRpcResponse::error(
                            id,
                            -32602,
                            "Invalid params",
                            Some(serde_json::json!({ "details": e.to_string() })),
                        ))
                    }
                },
                None => {
                    return Some(JsonRpcResponse::error(id, -32602, "Missing params", None));
                }
            };

            match dispatch(state, &params.name, params.arguments).await {
                Dispatch::Result(result) => Some(JsonRpcResponse::result(
                    id,
                    serde_json::to_value(result).unwrap_or(Value::Null),
                )),
                Dispatch::ProtocolError { code, message, data } => {
                    Some(JsonRpcResponse::error(id, code, message, data))
                }
            }
        }
        "shutdown" => Some(protocol::handle_shutdown(&request)),
        other => {
            tracing::warn!(method = other, "unknown method");
            Some(JsonRpcResponse::error(id, -32601, "Method not found", None))
        }
    }
}

/// Runs the main stdio loop until EOF. Schema installation and the session
/// connection must already have completed before this is called (spec §5
/// "Schema installation happens before the dispatcher accepts any tool
/// call").
pub async fn run(state: Arc<AppState>) -> anyhow::Result<()> {
    let tools = crate::tools::catalog::catalog();

    // Blocking stdio is read on its own task so the async runtime stays
    // free for concurrent backend/embedding calls fanned out by a handler.
    let (tx, mut rx) = tokio::sync::mpsc::channel::<(String, bool)>(1);
    let reader_task = tokio::task::spawn_blocking(move || {
        let stdin = io::stdin();
        let mut handle = stdin.lock();
        loop {
            match read_next_message(&mut handle) {
                Ok(None) => break,
                Ok(Some(message)) => {
                    if tx.blocking_send(message).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    error!(error = %e, "error reading from stdin");
                    break;
                }
            }
        }
    });

    let mut stdout = io::stdout();
    while let Some((line, lsp_framed)) = rx.recv().await {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match serde_json::from_str::<JsonRpcRequest>(trimmed) {
            Ok(request) => {
                if let Some(response) = handle_request(&state, request, &tools).await {
                    if let Err(e) = write_response(&mut stdout, &response, lsp_framed) {
                        error!(error = %e, "failed to write response");
                    }
                }
            }
            Err(e) => {
                error!(error = %e, "failed to parse JSON-RPC request");
                let response = JsonRpcResponse::error(
                    None,
                    -32700,
                    "Parse error",
                    Some(serde_json::json!({ "details": e.to_string() })),
                );
                if let Err(e) = write_response(&mut stdout, &response, lsp_framed) {
                    error!(error = %e, "failed to write parse-error response");
                }
            }
        }
    }

    reader_task.await?;
    info!("stdin closed, shutting down");
    Ok(())
}
