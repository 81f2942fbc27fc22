use crate::error::{GuardError, Result};
use crate::mcp::protocol::{
    self, JsonRpcRequest, JsonRpcResponse, RemoteTool, ToolResultPart, create_tool_call_request,
    create_tools_list_request,
};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Process-wide counter for JSON-RPC request IDs.
static JSONRPC_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// JSON-RPC client bound to a single MCP endpoint and bearer credential.
#[derive(Clone)]
pub struct McpClient {
    client: Client,
    endpoint: String,
    headers: HeaderMap,
}

impl McpClient {
    pub fn new(endpoint: impl Into<String>, api_key: Option<&str>) -> Result<Self> {
        Self::with_options(endpoint, api_key, false)
    }

    pub fn with_options(
        endpoint: impl Into<String>,
        api_key: Option<&str>,
        insecure: bool,
    ) -> Result<Self> {
        let endpoint = endpoint.into();
        reqwest::Url::parse(&endpoint)
            .map_err(|e| GuardError::Config(format!("invalid endpoint '{}': {}", endpoint, e)))?;

        let client = Client::builder()
            .danger_accept_invalid_certs(insecure)
            .build()
            .map_err(GuardError::Network)?;

        Ok(Self {
            client,
            endpoint,
            headers: protocol::mcp_headers(api_key)?,
        })
    }

    /// Perform one JSON-RPC exchange and return the `result` branch untouched.
    pub async fn call<T: Serialize>(
        &self,
        request: &JsonRpcRequest<T>,
    ) -> Result<serde_json::Value> {
        trace!("-> {} (id={})", request.method, request.id);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.headers.clone())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GuardError::Transport {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let body = response.text().await?;
        let json = protocol::parse_sse_json(&body).unwrap_or(body);
        let envelope: JsonRpcResponse =
            serde_json::from_str(&json).map_err(GuardError::InvalidResponse)?;

        trace!("<- {} (id={})", request.method, request.id);
        envelope.into_result()
    }

    /// Discover the tools exposed by the server.
    pub async fn list_tools(&self) -> Result<Vec<RemoteTool>> {
        let result = self
            .call(&create_tools_list_request(next_jsonrpc_id()))
            .await?;

        let tools = RemoteTool::from_list_result(&result);
        if tools.is_empty() {
            return Err(GuardError::NoToolsAvailable);
        }

        debug!(
            "Discovered {} tool(s) at {}: {}",
            tools.len(),
            self.endpoint,
            tool_names(&tools)
        );
        Ok(tools)
    }

    /// Execute `tool_name` with the prompt as its only argument.
    pub async fn invoke_tool(&self, tool_name: &str, prompt: &str) -> Result<Vec<ToolResultPart>> {
        debug!("Calling MCP tool: {}", tool_name);
        let result = self
            .call(&create_tool_call_request(
                next_jsonrpc_id(),
                tool_name,
                prompt,
            ))
            .await?;

        content_parts(&result)
    }
}

/// Pull the non-empty `content` sequence out of a `tools/call` result.
/// Elements that are not objects are skipped. Malformed members of an object
/// element are read as absent, so the element keeps its position.
pub fn content_parts(result: &serde_json::Value) -> Result<Vec<ToolResultPart>> {
    let Some(content) = result.get("content").and_then(|c| c.as_array()) else {
        return Err(GuardError::EmptyToolResult);
    };
    if content.is_empty() {
        return Err(GuardError::EmptyToolResult);
    }

    Ok(content
        .iter()
        .filter_map(ToolResultPart::from_value)
        .collect())
}

/// Select `target` from `tools`: exact name first, then case-insensitive.
/// Ties go to the first tool in list order.
pub fn resolve_tool<'a>(tools: &'a [RemoteTool], target: &str) -> Result<&'a RemoteTool> {
    if let Some(tool) = tools.iter().find(|t| t.name == target) {
        return Ok(tool);
    }

    let target_lower = target.to_lowercase();
    tools
        .iter()
        .find(|t| t.name.to_lowercase() == target_lower)
        .ok_or_else(|| GuardError::ToolNotFound {
            target: target.to_string(),
            available: tool_names(tools),
        })
}

fn tool_names(tools: &[RemoteTool]) -> String {
    tools
        .iter()
        .map(|t| t.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn next_jsonrpc_id() -> u64 {
    JSONRPC_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}
