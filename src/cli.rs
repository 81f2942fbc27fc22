use crate::analysis::engine::{AnalyzerConfig, DEFAULT_TOOL_NAME};
use clap::{Parser, ValueEnum};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Result cards followed by the sanitized prompt (default)
    #[default]
    Normal,
    /// The full analysis result as JSON
    Json,
    /// Only the sanitized prompt, for piping
    Masked,
}

#[derive(Parser, Debug)]
#[command(name = "promptguard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Check a prompt for injection, harmful intent and PII using a remote MCP guardrails tool"
)]
#[command(long_about = None)]
pub struct Args {
    /// Prompt to analyze; read from stdin when omitted
    pub prompt: Option<String>,

    /// MCP server endpoint URL
    #[arg(long, env = "PROMPTGUARD_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Bearer token sent to the MCP server
    #[arg(long, env = "PROMPTGUARD_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Name of the guardrails tool to invoke
    #[arg(long, env = "PROMPTGUARD_TOOL", default_value = DEFAULT_TOOL_NAME)]
    pub tool: String,

    /// Use the local keyword analyzer instead of the MCP server
    #[arg(long, env = "PROMPTGUARD_MOCK")]
    pub mock: bool,

    /// Simulated latency of the local analyzer in milliseconds
    #[arg(long, default_value = "2000", requires = "mock")]
    pub mock_latency_ms: u64,

    /// Accept invalid TLS certificates (insecure, use with caution)
    #[arg(long)]
    pub insecure: bool,

    /// Output format (normal, json, masked)
    #[arg(short = 'o', long, value_enum, default_value = "normal")]
    pub output: OutputFormat,

    /// Shortcut for --output json
    #[arg(long, conflicts_with_all = ["output", "masked_only"])]
    pub json: bool,

    /// Shortcut for --output masked: print only the sanitized prompt
    #[arg(long, conflicts_with = "output")]
    pub masked_only: bool,

    /// Verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode - only show results
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Get the effective output format
    pub fn get_output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.masked_only {
            OutputFormat::Masked
        } else {
            self.output
        }
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            endpoint: self.endpoint.clone(),
            api_key: self.api_key.clone().filter(|k| !k.is_empty()),
            use_mock: self.mock,
            tool_name: self.tool.clone(),
            mock_latency: Duration::from_millis(self.mock_latency_ms),
            insecure: self.insecure,
        }
    }
}

/// Returns the prompt to submit, or `None` when it is empty or whitespace-only.
pub fn validate_prompt(prompt: &str) -> Option<&str> {
    if prompt.trim().is_empty() {
        None
    } else {
        Some(prompt)
    }
}
