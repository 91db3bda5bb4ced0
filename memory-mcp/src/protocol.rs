//! Envelope types for the three relevant method classes (spec §6):
//! `initialize`, `tools/list`, and `tools/call`, plus `shutdown`.

use serde::Serialize;
use serde_json::{json, Value};

use crate::jsonrpc::{JsonRpcRequest, JsonRpcResponse};

/// Protocol versions this server understands, latest first.
pub const SUPPORTED_VERSIONS: &[&str] = &["2025-06-18", "2024-11-05"];

#[derive(Debug, Serialize)]
pub struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    pub protocol_version: String,
    pub capabilities: Value,
    #[serde(rename = "serverInfo")]
    pub server_info: Value,
}

#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

impl Tool {
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListToolsResult {
    pub tools: Vec<Tool>,
}

/// `tools/call` arguments: the tool name plus its opaque argument object.
#[derive(Debug, serde::Deserialize)]
pub struct CallToolParams {
    pub name: String,
    pub arguments: Option<Value>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum Content {
    #[serde(rename = "text")]
    Text { text: String },
}

/// The payload carried by a `tools/call` response, successful or not (spec
/// §4.4 "logical failures ... are returned as tool errors").
#[derive(Debug, Serialize)]
pub struct CallToolResult {
    pub content: Vec<Content>,
    #[serde(rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl CallToolResult {
    #[must_use]
    pub fn success(value: &Value) -> Self {
        Self {
            content: vec![Content::Text {
                text: value.to_string(),
            }],
            is_error: None,
        }
    }

    #[must_use]
    pub fn tool_error(message: &str, hint: &str) -> Self {
        let body = json!({ "error": message, "hint": hint });
        Self {
            content: vec![Content::Text {
                text: body.to_string(),
            }],
            is_error: Some(true),
        }
    }
}

/// Negotiates a protocol version and answers `initialize` (spec §6).
pub fn handle_initialize(request: &JsonRpcRequest) -> JsonRpcResponse {
    let requested_version = request
        .params
        .as_ref()
        .and_then(|p| p.get("protocolVersion"))
        .and_then(Value::as_str);

    let protocol_version = match requested_version {
        Some(v) if SUPPORTED_VERSIONS.contains(&v) => v.to_string(),
        _ => SUPPORTED_VERSIONS[0].to_string(),
    };

    let result = InitializeResult {
        protocol_version,
        capabilities: json!({ "tools": { "listChanged": false } }),
        server_info: json!({
            "name": "memory-mcp-server",
            "version": env!("CARGO_PKG_VERSION"),
        }),
    };

    JsonRpcResponse::result(
        request.id.clone(),
        serde_json::to_value(result).unwrap_or(Value::Null),
    )
}

pub fn handle_list_tools(request: &JsonRpcRequest, tools: Vec<Tool>) -> JsonRpcResponse {
    let result = ListToolsResult { tools };
    JsonRpcResponse::result(
        request.id.clone(),
        serde_json::to_value(result).unwrap_or(Value::Null),
    )
}

pub fn handle_shutdown(request: &JsonRpcRequest) -> JsonRpcResponse {
    JsonRpcResponse::result(request.id.clone(), Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn req(params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            id: Some(json!(1)),
            method: "initialize".to_string(),
            params,
        }
    }

    #[test]
    fn negotiates_requested_supported_version() {
        let resp = handle_initialize(&req(Some(json!({ "protocolVersion": "2024-11-05" }))));
        let version = resp.result.unwrap()["protocolVersion"].clone();
        assert_eq!(version, json!("2024-11-05"));
    }

    #[test]
    fn falls_back_to_latest_on_unknown_version() {
        let resp = handle_initialize(&req(Some(json!({ "protocolVersion": "1999-01-01" }))));
        let version = resp.result.unwrap()["protocolVersion"].clone();
        assert_eq!(version, json!(SUPPORTED_VERSIONS[0]));
    }

    #[test]
    fn defaults_to_latest_with_no_params() {
        let resp = handle_initialize(&req(None));
        let version = resp.result.unwrap()["protocolVersion"].clone();
        assert_eq!(version, json!(SUPPORTED_VERSIONS[0]));
    }
}
