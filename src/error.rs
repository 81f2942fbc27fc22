use thiserror::Error;

/// Fallback message surfaced when a failure carries nothing a user can act on.
pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to connect to security analysis server.";

#[derive(Debug, Error)]
pub enum GuardError {
    #[error("MCP Connection Error: {status} {status_text}")]
    Transport { status: u16, status_text: String },

    #[error("MCP JSON-RPC Error: {message} (Code: {code})")]
    Protocol { code: i64, message: String },

    #[error("No tools available on the MCP server.")]
    NoToolsAvailable,

    #[error(
        "The required workflow '{target}' was not found on the server. Available workflows: {available}"
    )]
    ToolNotFound { target: String, available: String },

    #[error("Received empty content from MCP tool execution.")]
    EmptyToolResult,

    #[error("No text output found in MCP response.")]
    NoTextContent,

    #[error("The MCP tool did not return valid JSON data.")]
    MalformedPayload(#[source] serde_json::Error),

    #[error("Invalid JSON-RPC response from MCP server: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    #[error("{0}")]
    AnalysisFailed(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GuardError {
    /// Message shown to the user once this error has crossed the analysis boundary.
    ///
    /// Connection-level failures and blank messages fall back to
    /// [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        if matches!(self, Self::Network(_)) {
            return GENERIC_FAILURE_MESSAGE.to_string();
        }
        let message = self.to_string();
        if message.trim().is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

pub type Result<T> = std::result::Result<T, GuardError>;
