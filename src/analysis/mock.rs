use crate::analysis::types::{
    AnalysisResponse, HarmfulIntentResult, PiiDetectionResult, PromptInjectionResult, Severity,
    now_timestamp,
};
use regex::Regex;
use std::sync::LazyLock;

pub const REDACTION_MARKER: &str = "[REDACTED]";

static SUSPICIOUS_KEYWORDS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)password|ignore").expect("invalid keyword regex"));

/// Whether the mock analyzer treats `prompt` as an attack.
pub fn is_suspicious(prompt: &str) -> bool {
    SUSPICIOUS_KEYWORDS.is_match(prompt)
}

/// Offline stand-in for the remote tool, driven by two keywords.
///
/// The PII types are fixed to `email` and `ssn` whenever the prompt is
/// suspicious, independent of what was redacted.
pub fn mock_analyze(prompt: &str) -> AnalysisResponse {
    if !is_suspicious(prompt) {
        return AnalysisResponse {
            prompt_injection: PromptInjectionResult {
                detected: false,
                confidence: 0.12,
                description: "No injection patterns detected.".to_string(),
            },
            harmful_intent: HarmfulIntentResult {
                detected: false,
                severity: Severity::Safe,
                description: "Intent appears benign.".to_string(),
            },
            pii_detection: PiiDetectionResult {
                found: false,
                types: Vec::new(),
                masked_prompt: prompt.to_string(),
            },
            timestamp: now_timestamp(),
        };
    }

    AnalysisResponse {
        prompt_injection: PromptInjectionResult {
            detected: true,
            confidence: 0.89,
            description: "Potential jailbreak pattern detected in prompt structure.".to_string(),
        },
        harmful_intent: HarmfulIntentResult {
            detected: true,
            severity: Severity::High,
            description: "Request attempts to bypass security controls.".to_string(),
        },
        pii_detection: PiiDetectionResult {
            found: true,
            types: vec!["email".to_string(), "ssn".to_string()],
            masked_prompt: SUSPICIOUS_KEYWORDS
                .replace_all(prompt, REDACTION_MARKER)
                .into_owned(),
        },
        timestamp: now_timestamp(),
    }
}
