use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

pub const METHOD_TOOLS_LIST: &str = "tools/list";
pub const METHOD_TOOLS_CALL: &str = "tools/call";

/// Content tag of the only tool-result part this client consumes.
pub const TEXT_CONTENT_TYPE: &str = "text";

#[derive(Debug, Clone, Serialize)]
pub struct JsonRpcRequest<T> {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: &'static str,
    pub params: T,
}

impl<T> JsonRpcRequest<T> {
    pub fn new(id: u64, method: &'static str, params: T) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method,
            params,
        }
    }
}

/// Error object carried by a failed JSON-RPC response.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RpcError {
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

/// Response envelope. Exactly one of `result` / `error` is expected; `error` wins
/// when a server sends both.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonRpcResponse {
    #[serde(default)]
    pub result: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<RpcError>,
}

impl JsonRpcResponse {
    pub fn into_result(self) -> Result<serde_json::Value> {
        if let Some(err) = self.error {
            return Err(GuardError::Protocol {
                code: err.code,
                message: err.message,
            });
        }
        Ok(self.result.unwrap_or(serde_json::Value::Null))
    }
}

// =============================================================================
// Tools
// =============================================================================

/// A tool advertised by `tools/list`. Only `name` matters here; every other
/// descriptive field is kept opaque.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteTool {
    pub name: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl RemoteTool {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Parse the `tools` array of a `tools/list` result, skipping entries without a string name.
    pub fn from_list_result(result: &serde_json::Value) -> Vec<RemoteTool> {
        result
            .get("tools")
            .and_then(|t| t.as_array())
            .map(|tools| {
                tools
                    .iter()
                    .filter_map(|t| serde_json::from_value(t.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolCallArguments<'a> {
    pub prompt: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolCallParams<'a> {
    pub name: &'a str,
    pub arguments: ToolCallArguments<'a>,
}

/// One element of a `tools/call` result's `content` sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResultPart {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl ToolResultPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: TEXT_CONTENT_TYPE.to_string(),
            text: Some(text.into()),
        }
    }

    /// Read one `content` element. Non-object elements yield `None`; a `text`
    /// member that is not a string is treated as absent.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let part = value.as_object()?;
        Some(Self {
            kind: part
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or_default()
                .to_string(),
            text: part.get("text").and_then(|t| t.as_str()).map(String::from),
        })
    }

    pub fn is_text(&self) -> bool {
        self.kind == TEXT_CONTENT_TYPE
    }
}

pub fn create_tools_list_request(id: u64) -> JsonRpcRequest<serde_json::Value> {
    JsonRpcRequest::new(
        id,
        METHOD_TOOLS_LIST,
        serde_json::Value::Object(serde_json::Map::new()),
    )
}

pub fn create_tool_call_request<'a>(
    id: u64,
    tool_name: &'a str,
    prompt: &'a str,
) -> JsonRpcRequest<ToolCallParams<'a>> {
    JsonRpcRequest::new(
        id,
        METHOD_TOOLS_CALL,
        ToolCallParams {
            name: tool_name,
            arguments: ToolCallArguments { prompt },
        },
    )
}

// =============================================================================
// HTTP helpers
// =============================================================================

/// Standard headers for every exchange, with the bearer credential when one is configured.
pub fn mcp_headers(api_key: Option<&str>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("application/json, text/event-stream"),
    );
    if let Some(key) = api_key {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", key))
            .map_err(|_| GuardError::Config("API key contains invalid characters".to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Extract the JSON-RPC message from an SSE-framed body.
/// Handles multi-line `data:` fields and both LF and CRLF event separators.
pub fn parse_sse_json(body: &str) -> Option<String> {
    if !body.contains("data:") {
        return None;
    }

    let normalized = body.replace("\r\n", "\n");

    for event in normalized.split("\n\n") {
        let data_parts: Vec<&str> = event
            .lines()
            .filter_map(|line| line.trim().strip_prefix("data:"))
            .map(str::trim)
            .collect();

        if data_parts.is_empty() {
            continue;
        }

        let json_str = data_parts.join("\n");
        if json_str.contains("\"result\"") || json_str.contains("\"error\"") {
            return Some(json_str);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tools_list_request_shape() {
        let req = create_tools_list_request(7);
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["jsonrpc"], "2.0");
        assert_eq!(json["id"], 7);
        assert_eq!(json["method"], "tools/list");
        assert!(json["params"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_tool_call_request_shape() {
        let req = create_tool_call_request(9, "Gurdrails", "hello");
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["method"], "tools/call");
        assert_eq!(json["params"]["name"], "Gurdrails");
        assert_eq!(json["params"]["arguments"]["prompt"], "hello");
    }

    #[test]
    fn test_error_branch_wins() {
        let resp: JsonRpcResponse = serde_json::from_str(
            r#"{"jsonrpc":"2.0","id":1,"result":{},"error":{"code":-32000,"message":"boom"}}"#,
        )
        .unwrap();
        match resp.into_result() {
            Err(GuardError::Protocol { code, message }) => {
                assert_eq!(code, -32000);
                assert_eq!(message, "boom");
            }
            other => panic!("expected protocol error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_result_is_null() {
        let resp: JsonRpcResponse = serde_json::from_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert!(resp.into_result().unwrap().is_null());
    }

    #[test]
    fn test_remote_tool_keeps_extra_fields() {
        let tool: RemoteTool = serde_json::from_str(
            r#"{"name":"Gurdrails","description":"guard","inputSchema":{"type":"object"}}"#,
        )
        .unwrap();
        assert_eq!(tool.name, "Gurdrails");
        assert_eq!(tool.extra["description"], "guard");
        assert!(tool.extra.contains_key("inputSchema"));
    }

    #[test]
    fn test_from_list_result_skips_nameless() {
        let result = serde_json::json!({
            "tools": [{"name": "a"}, {"description": "no name"}, {"name": 3}, {"name": "b"}]
        });
        let names: Vec<String> = RemoteTool::from_list_result(&result)
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(RemoteTool::from_list_result(&serde_json::Value::Null).is_empty());
    }

    #[test]
    fn test_bearer_header_attached() {
        let headers = mcp_headers(Some("secret")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer secret");

        let headers = mcp_headers(None).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_bearer_header_rejects_newline() {
        assert!(matches!(
            mcp_headers(Some("bad\nkey")),
            Err(GuardError::Config(_))
        ));
    }

    #[test]
    fn test_parse_sse_json() {
        let body = "event: message\r\ndata: {\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\r\n\r\n";
        assert_eq!(
            parse_sse_json(body).unwrap(),
            r#"{"jsonrpc":"2.0","id":1,"result":{}}"#
        );
        assert!(parse_sse_json(r#"{"result":{}}"#).is_none());
    }
}
