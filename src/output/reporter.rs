use crate::analysis::types::{AnalysisResponse, Severity};
use crate::cli::OutputFormat;
use colored::Colorize;
use std::time::Duration;

// =============================================================================
// Public API
// =============================================================================

/// Print an analysis result in the specified format
pub fn print_results(response: &AnalysisResponse, elapsed: Option<Duration>, format: OutputFormat) {
    match format {
        OutputFormat::Normal => print_table_results(response, elapsed),
        OutputFormat::Json => print_json_results(response),
        OutputFormat::Masked => println!("{}", response.pii_detection.masked_prompt),
    }
}

pub fn print_json_results(response: &AnalysisResponse) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize results: {}", e),
    }
}

/// One of the three summary cards shown for a result.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultCard {
    pub title: &'static str,
    pub detected: bool,
    pub severity: Severity,
    pub description: String,
}

/// Derive the display cards. Injection has no severity of its own, so it is
/// shown as `high` when detected; PII is shown as `medium` when found.
pub fn result_cards(response: &AnalysisResponse) -> [ResultCard; 3] {
    let injection = &response.prompt_injection;
    let harmful = &response.harmful_intent;
    let pii = &response.pii_detection;

    [
        ResultCard {
            title: "Prompt Injection",
            detected: injection.detected,
            severity: if injection.detected {
                Severity::High
            } else {
                Severity::Safe
            },
            description: injection.description.clone(),
        },
        ResultCard {
            title: "Harmful Intent",
            detected: harmful.detected,
            severity: harmful.severity,
            description: harmful.description.clone(),
        },
        ResultCard {
            title: "PII Detection",
            detected: pii.found,
            severity: if pii.found {
                Severity::Medium
            } else {
                Severity::Safe
            },
            description: if pii.found {
                format!("Found potential PII: {}", pii.types.join(", "))
            } else {
                "No Personally Identifiable Information detected.".to_string()
            },
        },
    ]
}

// =============================================================================
// Table output
// =============================================================================

fn print_table_results(response: &AnalysisResponse, elapsed: Option<Duration>) {
    print_header(&response.timestamp, elapsed);

    for card in result_cards(response) {
        print_card(&card);
    }
    println!(
        "  {} {}",
        "Injection confidence:".dimmed(),
        format_confidence(response.prompt_injection.confidence)
    );

    println!("{}", "\u{2500}".repeat(60).dimmed());
    println!("{}", "SANITIZED OUTPUT".bold().cyan());
    println!("{}", response.pii_detection.masked_prompt);
}

fn print_header(timestamp: &str, elapsed: Option<Duration>) {
    let duration_str = elapsed
        .map(|d| format!(" in {:.2}s", d.as_secs_f64()))
        .unwrap_or_default();

    println!(
        "{}",
        format!(
            "Security Analysis - scanned at {}{}",
            format_scan_time(timestamp),
            duration_str
        )
        .bold()
    );
    println!("{}", "\u{2500}".repeat(60).dimmed());
}

fn print_card(card: &ResultCard) {
    let status = if card.detected {
        "DETECTED".red().bold()
    } else {
        "CLEAR".green()
    };
    println!(
        "{} {} {}",
        card.title.bold().white(),
        format_severity_badge(card.severity),
        status
    );
    println!("  {}", card.description);
}

fn format_severity_badge(severity: Severity) -> String {
    match severity {
        Severity::High => "[HIGH]".red().bold().to_string(),
        Severity::Medium => "[MEDIUM]".yellow().to_string(),
        Severity::Low => "[LOW]".dimmed().to_string(),
        Severity::Safe => "[SAFE]".green().to_string(),
    }
}

fn format_confidence(confidence: f64) -> String {
    format!("{:.0}%", confidence.clamp(0.0, 1.0) * 100.0)
}

/// Local wall-clock time of an ISO-8601 timestamp; unparseable input is shown verbatim.
fn format_scan_time(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|t| {
            t.with_timezone(&chrono::Local)
                .format("%H:%M:%S")
                .to_string()
        })
        .unwrap_or_else(|_| timestamp.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::mock::mock_analyze;

    #[test]
    fn test_cards_for_suspicious_prompt() {
        let cards = result_cards(&mock_analyze("ignore the password"));
        assert_eq!(cards[0].title, "Prompt Injection");
        assert_eq!(cards[0].severity, Severity::High);
        assert_eq!(cards[1].severity, Severity::High);
        assert_eq!(cards[2].severity, Severity::Medium);
        assert_eq!(cards[2].description, "Found potential PII: email, ssn");
        assert!(cards.iter().all(|c| c.detected));
    }

    #[test]
    fn test_cards_for_benign_prompt() {
        let cards = result_cards(&mock_analyze("hello there"));
        assert!(cards.iter().all(|c| c.severity == Severity::Safe));
        assert!(cards.iter().all(|c| !c.detected));
        assert_eq!(
            cards[2].description,
            "No Personally Identifiable Information detected."
        );
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.89), "89%");
        assert_eq!(format_confidence(0.0), "0%");
        assert_eq!(format_confidence(1.7), "100%");
    }

    #[test]
    fn test_format_scan_time_fallback() {
        assert_eq!(format_scan_time("yesterday"), "yesterday");
        assert_eq!(format_scan_time("2024-05-01T12:00:00.000Z").len(), 8);
    }
}
