//! MCP client protocol types
//!
//! JSON-RPC 2.0 messages exchanged with a backend over newline-delimited
//! stdio, and the conversion of tool-call content into rows.

use super::Row;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Protocol revision announced during the handshake.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC request or notification (notifications carry no id)
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a> {
    pub jsonrpc: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub method: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl<'a> JsonRpcRequest<'a> {
    pub fn call(id: u64, method: &'a str, params: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id: Some(id),
            method,
            params: Some(params),
        }
    }

    pub fn notification(method: &'a str) -> Self {
        Self {
            jsonrpc: "2.0",
            id: None,
            method,
            params: None,
        }
    }
}

/// Any message the backend writes: a response, or a request or
/// notification of its own that the client skips.
#[derive(Debug, Deserialize)]
pub struct JsonRpcMessage {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcMessage {
    /// True if this is the response to request `id`.
    pub fn answers(&self, id: u64) -> bool {
        self.method.is_none() && self.id.as_ref().and_then(Value::as_u64) == Some(id)
    }
}

/// JSON-RPC error object
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

/// Client info sent in `initialize`
#[derive(Debug, Serialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// `initialize` parameters
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,
    pub capabilities: Value,
    pub client_info: ClientInfo,
}

impl Default for InitializeParams {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: Value::Object(Default::default()),
            client_info: ClientInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }
    }
}

/// `initialize` result (only the fields the client reads)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    #[serde(default)]
    pub server_info: Option<ServerInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// One page of `tools/list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsListResult {
    #[serde(default)]
    pub tools: Vec<ToolInfo>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// `tools/call` result
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallResult {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default)]
    pub is_error: Option<bool>,
    #[serde(default)]
    pub structured_content: Option<Value>,
}

/// Tool content block
#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(default)]
    pub text: Option<String>,
}

impl ToolCallResult {
    /// Text of all text blocks, joined by newlines.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|b| b.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Flatten the result into record rows.
    ///
    /// Structured content wins when present. Otherwise each text block
    /// is parsed as JSON: an array of objects yields one row per object,
    /// an object yields one row, anything else becomes `{"text": ...}`.
    /// Non-text blocks are kept as `{"type": ...}` markers.
    pub fn into_rows(self) -> Vec<Row> {
        if let Some(structured) = self.structured_content {
            return value_to_rows(structured);
        }

        let mut rows = Vec::new();
        for block in self.content {
            match block.text {
                Some(text) => match serde_json::from_str::<Value>(&text) {
                    Ok(value @ (Value::Array(_) | Value::Object(_))) => {
                        rows.extend(value_to_rows(value))
                    }
                    _ => rows.push(single("text", Value::String(text))),
                },
                None => rows.push(single("type", Value::String(block.content_type))),
            }
        }
        rows
    }
}

fn value_to_rows(value: Value) -> Vec<Row> {
    match value {
        Value::Array(items) => items
            .into_iter()
            .map(|item| match item {
                Value::Object(map) => map,
                other => single("value", other),
            })
            .collect(),
        Value::Object(map) => vec![map],
        other => vec![single("value", other)],
    }
}

fn single(key: &str, value: Value) -> Row {
    let mut row = Row::new();
    row.insert(key.to_string(), value);
    row
}
