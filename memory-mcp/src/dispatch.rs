//! Tool Dispatcher (spec §4.4): maps a tool name to a handler, decodes and
//! validates its arguments, and distinguishes *structural* violations
//! (protocol-level error) from *logical* failures (tool error with a
//! corrective hint). Every invocation is logged with the tool name, a
//! truncated view of its arguments, and the duration; calls over 100 ms
//! log at warning severity.

use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};

use crate::protocol::CallToolResult;
use crate::state::AppState;
use crate::tools::args;
use crate::tools::handlers;

/// Upper bound, in characters, of the argument preview placed in the log
/// line (spec §4.4 "a truncated view of arguments").
const ARGS_PREVIEW_CHARS: usize = 200;
/// Invocations slower than this are logged at warning severity.
const SLOW_CALL_THRESHOLD_MS: u128 = 100;

/// The two shapes a `tools/call` request can resolve to: a protocol
/// response body (tool ran, successfully or not) or a JSON-RPC protocol
/// error (unknown tool name, or arguments that do not match the tool's
/// required shape).
pub enum Dispatch {
    Result(CallToolResult),
    ProtocolError {
        code: i32,
        message: String,
        data: Option<Value>,
    },
}

fn preview(arguments: &Option<Value>) -> String {
    let rendered = arguments
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "null".to_string());
    if rendered.chars().count() > ARGS_PREVIEW_CHARS {
        let truncated: String = rendered.chars().take(ARGS_PREVIEW_CHARS).collect();
        format!("{truncated}...")
    } else {
        rendered
    }
}

/// Decodes `arguments` into `T`; a decode failure is a structural violation
/// (spec §4.4), surfaced as a protocol-level "Invalid params" error rather
/// than a tool error.
fn decode<T: for<'de> serde::Deserialize<'de>>(arguments: Option<Value>) -> Result<T, Dispatch> {
    args::parse(arguments).map_err(|e| Dispatch::ProtocolError {
        code: -32602,
        message: "Invalid params".to_string(),
        data: Some(serde_json::json!({ "details": e.to_string() })),
    })
}

macro_rules! run {
    ($state:expr, $arguments:expr, $handler:path) => {{
        let decoded = match decode($arguments) {
            Ok(v) => v,
            Err(protocol_error) => return protocol_error,
        };
        match $handler($state, decoded).await {
            Ok(value) => Dispatch::Result(CallToolResult::success(&value)),
            Err(err) => Dispatch::Result(CallToolResult::tool_error(&err.to_string(), err.hint())),
        }
    }};
}

/// Routes a `tools/call` request to its handler, timing and logging the
/// invocation around the call.
pub async fn dispatch(state: &AppState, name: &str, arguments: Option<Value>) -> Dispatch {
    let start = Instant::now();
    let args_preview = preview(&arguments);

    let outcome = match name {
        "search" => run!(state, arguments, handlers::search),
        "get_entity" => run!(state, arguments, handlers::get_entity),
        "list_labels" => run!(state, arguments, handlers::list_labels),
        "list_types" => run!(state, arguments, handlers::list_types),
        "remember" => run!(state, arguments, handlers::remember),
        "forget" => run!(state, arguments, handlers::forget),
        "traverse" => run!(state, arguments, handlers::traverse),
        "find_path" => run!(state, arguments, handlers::find_path),
        "add_episode" => run!(state, arguments, handlers::add_episode),
        "search_episodes" => run!(state, arguments, handlers::search_episodes),
        "get_episode" => run!(state, arguments, handlers::get_episode),
        "delete_episode" => run!(state, arguments, handlers::delete_episode),
        "create_procedure" => run!(state, arguments, handlers::create_procedure),
        "search_procedures" => run!(state, arguments, handlers::search_procedures),
        "get_procedure" => run!(state, arguments, handlers::get_procedure),
        "list_procedures" => run!(state, arguments, handlers::list_procedures),
        "delete_procedure" => run!(state, arguments, handlers::delete_procedure),
        "reflect" => run!(state, arguments, handlers::reflect),
        "ping" => run!(state, arguments, handlers::ping),
        other => Dispatch::ProtocolError {
            code: -32601,
            message: "Tool not found".to_string(),
            data: Some(serde_json::json!({ "tool": other })),
        },
    };

    let elapsed = start.elapsed();
    if elapsed.as_millis() > SLOW_CALL_THRESHOLD_MS {
        warn!(tool = name, args = %args_preview, duration_ms = elapsed.as_millis(), "slow tool call");
    } else {
        info!(tool = name, args = %args_preview, duration_ms = elapsed.as_millis(), "tool call");
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::preview;
    use serde_json::json;

    #[test]
    fn preview_passes_through_short_arguments() {
        let args = Some(json!({ "query": "hi" }));
        assert_eq!(preview(&args), r#"{"query":"hi"}"#);
    }

    #[test]
    fn preview_truncates_long_arguments() {
        let long_query = "x".repeat(500);
        let args = Some(json!({ "query": long_query }));
        let rendered = preview(&args);
        assert!(rendered.ends_with("..."));
        assert!(rendered.chars().count() <= super::ARGS_PREVIEW_CHARS + 3);
    }

    #[test]
    fn preview_of_absent_arguments_is_null() {
        assert_eq!(preview(&None), "null");
    }
}
