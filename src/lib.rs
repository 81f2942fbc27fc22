pub mod analysis;
pub mod cli;
pub mod error;
pub mod mcp;
pub mod output;

pub use analysis::{AnalysisResponse, Analyzer, AnalyzerConfig};
pub use cli::Args;
pub use error::{GuardError, Result};
