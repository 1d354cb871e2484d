//! The `explain` use case: show what a loaded custom check is about.

use blockguard_domain::{Check, CheckRegistry};

/// Output from the explain use case.
#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(Box<Check>),
    /// Unknown code; includes the codes that are loaded.
    NotFound {
        code: String,
        available_codes: Vec<String>,
    },
}

/// Look up a check by code.
pub fn run_explain(registry: &CheckRegistry, code: &str) -> ExplainOutput {
    match registry.get(code) {
        Some(check) => ExplainOutput::Found(Box::new(check.clone())),
        None => ExplainOutput::NotFound {
            code: code.to_string(),
            available_codes: registry.codes().into_iter().map(str::to_string).collect(),
        },
    }
}

/// Format a check for terminal display.
pub fn format_explanation(check: &Check) -> String {
    let title = format!("{} ({})", check.code, check.severity);
    let mut out = String::new();

    out.push_str(&title);
    out.push('\n');
    out.push_str(&"=".repeat(title.len()));
    out.push_str("\n\n");
    out.push_str(&check.description);
    out.push_str("\n\n");

    out.push_str(&format!("Applies to: {}", check.required_types.join(", ")));
    if !check.required_labels.is_empty() {
        out.push_str(&format!(" ({})", check.required_labels.join(", ")));
    }
    out.push_str("\n\n");

    if let Some(impact) = &check.impact {
        out.push_str("Impact\n------\n");
        out.push_str(impact);
        out.push_str("\n\n");
    }
    if let Some(resolution) = &check.resolution {
        out.push_str("Resolution\n----------\n");
        out.push_str(resolution);
        out.push_str("\n\n");
    }
    if !check.related_links.is_empty() {
        out.push_str("Links\n-----\n");
        for link in &check.related_links {
            out.push_str(&format!("  - {link}\n"));
        }
    }

    out
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(code: &str, available_codes: &[String]) -> String {
    let mut out = String::new();

    out.push_str(&format!("Unknown check code: {code}\n\n"));
    if available_codes.is_empty() {
        out.push_str("No custom checks are loaded.\n");
        return out;
    }
    out.push_str("Available codes:\n");
    for c in available_codes {
        out.push_str(&format!("  - {c}\n"));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockguard_domain::{Action, MatchSpec};
    use blockguard_types::Severity;

    fn registry() -> CheckRegistry {
        let mut registry = CheckRegistry::new();
        registry.insert(Check {
            code: "DP006".to_string(),
            description: "VPC flow logs must be enabled".to_string(),
            impact: Some("Traffic is not audited".to_string()),
            resolution: None,
            required_types: vec!["resource".to_string()],
            required_labels: vec!["aws_vpc".to_string()],
            severity: Severity::High,
            match_spec: MatchSpec::requires_presence(
                "aws_flow_log",
                MatchSpec::leaf(Action::IsPresent, "log_destination"),
            ),
            error_message: "VPCs should have an aws_flow_log associated with them".to_string(),
            related_links: vec!["https://example.com/flow-logs".to_string()],
        });
        registry
    }

    #[test]
    fn found_check_is_formatted() {
        let ExplainOutput::Found(check) = run_explain(&registry(), "DP006") else {
            panic!("expected DP006 to be found");
        };
        let text = format_explanation(&check);
        assert!(text.starts_with("DP006 (HIGH)\n============"));
        assert!(text.contains("Applies to: resource (aws_vpc)"));
        assert!(text.contains("Impact\n------\nTraffic is not audited"));
        assert!(!text.contains("Resolution"));
        assert!(text.contains("  - https://example.com/flow-logs"));
    }

    #[test]
    fn unknown_code_lists_available() {
        let ExplainOutput::NotFound {
            code,
            available_codes,
        } = run_explain(&registry(), "CUS999")
        else {
            panic!("expected CUS999 to be unknown");
        };
        let text = format_not_found(&code, &available_codes);
        assert!(text.contains("Unknown check code: CUS999"));
        assert!(text.contains("  - DP006"));

        assert!(format_not_found("X", &[]).contains("No custom checks are loaded."));
    }
}
