use blockguard_types::Severity;
use std::collections::BTreeMap;

/// Per-check override keyed by check code.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckPolicy {
    pub enabled: bool,
    /// Replaces the severity declared in the checks file.
    pub severity: Option<Severity>,
}

impl CheckPolicy {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            severity: None,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            severity: None,
        }
    }

    pub fn with_severity(severity: Severity) -> Self {
        Self {
            enabled: true,
            severity: Some(severity),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub profile: String,
    /// Any emitted finding at or above this severity fails the run.
    pub fail_on: Severity,
    /// Findings below this severity are dropped before counting.
    pub minimum_severity: Severity,
    pub max_findings: usize,
    pub checks: BTreeMap<String, CheckPolicy>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            profile: "strict".to_string(),
            fail_on: Severity::Low,
            minimum_severity: Severity::Low,
            max_findings: 200,
            checks: BTreeMap::new(),
        }
    }
}

impl EffectiveConfig {
    /// Checks without an override are enabled.
    pub fn is_enabled(&self, code: &str) -> bool {
        self.checks.get(code).is_none_or(|p| p.enabled)
    }

    pub fn severity_for(&self, code: &str, declared: Severity) -> Severity {
        self.checks
            .get(code)
            .and_then(|p| p.severity)
            .unwrap_or(declared)
    }
}
