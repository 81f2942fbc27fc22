pub mod engine;
pub mod extract;
pub mod mock;
pub mod normalize;
pub mod types;

pub use engine::{Analyzer, AnalyzerConfig};
pub use types::{
    AnalysisResponse, HarmfulIntentResult, PiiDetectionResult, PromptInjectionResult, Severity,
};
