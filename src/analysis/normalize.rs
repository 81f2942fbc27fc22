use crate::analysis::types::{
    AnalysisResponse, HarmfulIntentResult, PiiDetectionResult, PromptInjectionResult, Severity,
    now_timestamp,
};
use serde_json::Value;
use tracing::debug;

const UNKNOWN: &str = "Unknown";

/// Map a tool payload onto [`AnalysisResponse`].
///
/// Total over any JSON value. Defaults are applied per sub-field, so a
/// reported detection survives even when its siblings are missing or
/// malformed. A missing masked prompt is the original prompt.
pub fn normalize(parsed: &Value, original_prompt: &str) -> AnalysisResponse {
    let injection = section(parsed, "promptInjection");
    let prompt_injection = PromptInjectionResult {
        detected: bool_at(injection, "detected"),
        confidence: injection
            .and_then(|v| v.get("confidence"))
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        description: string_at(injection, "description").unwrap_or_else(|| UNKNOWN.to_string()),
    };

    let harmful = section(parsed, "harmfulIntent");
    let harmful_intent = HarmfulIntentResult {
        detected: bool_at(harmful, "detected"),
        severity: harmful
            .and_then(|v| v.get("severity"))
            .and_then(|s| match serde_json::from_value::<Severity>(s.clone()) {
                Ok(severity) => Some(severity),
                Err(e) => {
                    debug!("Ignoring unknown severity {} in tool payload: {}", s, e);
                    None
                }
            })
            .unwrap_or_default(),
        description: string_at(harmful, "description").unwrap_or_else(|| UNKNOWN.to_string()),
    };

    let pii = section(parsed, "piiDetection");
    let pii_detection = PiiDetectionResult {
        found: bool_at(pii, "found"),
        types: pii
            .and_then(|v| v.get("types"))
            .and_then(Value::as_array)
            .map(|types| {
                types
                    .iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        masked_prompt: string_at(pii, "maskedPrompt")
            .unwrap_or_else(|| original_prompt.to_string()),
    };

    let timestamp = parsed
        .get("timestamp")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .unwrap_or_else(now_timestamp);

    AnalysisResponse {
        prompt_injection,
        harmful_intent,
        pii_detection,
        timestamp,
    }
}

fn section<'a>(parsed: &'a Value, key: &str) -> Option<&'a Value> {
    parsed.get(key).filter(|v| v.is_object())
}

fn bool_at(section: Option<&Value>, key: &str) -> bool {
    section
        .and_then(|v| v.get(key))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn string_at(section: Option<&Value>, key: &str) -> Option<String> {
    section
        .and_then(|v| v.get(key))
        .and_then(Value::as_str)
        .map(String::from)
}
