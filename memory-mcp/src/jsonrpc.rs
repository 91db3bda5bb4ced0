//! Wire framing for the stdio tool-invocation protocol (spec §6).
//!
//! Supports both bare newline-delimited JSON and LSP-style `Content-Length:`
//! framing on the same byte stream, mirroring the teacher's
//! `memory-mcp/src/jsonrpc.rs`: whichever framing a request arrived in, the
//! matching response uses the same framing.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, BufRead, Read, Write};

#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub id: Option<Value>,
    pub method: String,
    pub params: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    #[must_use]
    pub fn result(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    #[must_use]
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data,
            }),
        }
    }
}

/// Reads one message from `reader`, supporting both framings. Returns
/// `(body, is_lsp_framed)` so the caller can answer in kind; `None` on EOF.
pub fn read_next_message<R: BufRead + Read>(reader: &mut R) -> io::Result<Option<(String, bool)>> {
    loop {
        let mut line = String::new();
        let n = reader.read_line(&mut line)?;
        if n == 0 {
            return Ok(None);
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        if trimmed.starts_with('{') {
            return Ok(Some((trimmed.to_string(), false)));
        }

        let low = trimmed.to_ascii_lowercase();
        if low.starts_with("content-length:") {
            let parts: Vec<&str> = trimmed.splitn(2, ':').collect();
            let len: usize = parts
                .get(1)
                .map(|s| s.trim().parse().ok().unwrap_or(0))
                .unwrap_or(0);

            loop {
                let mut hline = String::new();
                let hn = reader.read_line(&mut hline)?;
                if hn == 0 || hline.trim().is_empty() {
                    break;
                }
            }

            if len == 0 {
                continue;
            }
            let mut buf = vec![0u8; len];
            reader.read_exact(&mut buf)?;
            return Ok(Some((String::from_utf8_lossy(&buf).to_string(), true)));
        }

        // Anything else on the stream (stray log lines) is ignored.
        continue;
    }
}

pub fn write_response_with_length<W: Write>(writer: &mut W, body: &str) -> io::Result<()> {
    let bytes = body.as_bytes();
    let header = format!("Content-Length: {}\r\n\r\n", bytes.len());
    writer.write_all(header.as_bytes())?;
    writer.write_all(bytes)?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reads_bare_json_line() {
        let mut cursor = Cursor::new(b"{\"jsonrpc\":\"2.0\"}\n".to_vec());
        let (body, is_lsp) = read_next_message(&mut cursor).unwrap().unwrap();
        assert!(!is_lsp);
        assert_eq!(body, "{\"jsonrpc\":\"2.0\"}");
    }

    #[test]
    fn reads_content_length_framed_message() {
        let payload = b"{\"jsonrpc\":\"2.0\"}";
        let mut input = format!("Content-Length: {}\r\n\r\n", payload.len()).into_bytes();
        input.extend_from_slice(payload);
        let mut cursor = Cursor::new(input);
        let (body, is_lsp) = read_next_message(&mut cursor).unwrap().unwrap();
        assert!(is_lsp);
        assert_eq!(body, "{\"jsonrpc\":\"2.0\"}");
    }

    #[test]
    fn eof_yields_none() {
        let mut cursor = Cursor::new(Vec::new());
        assert!(read_next_message(&mut cursor).unwrap().is_none());
    }
}
