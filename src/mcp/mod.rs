pub mod client;
pub mod protocol;

pub use client::{McpClient, resolve_tool};
pub use protocol::{RemoteTool, ToolResultPart};
