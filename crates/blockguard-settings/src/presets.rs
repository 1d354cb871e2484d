use blockguard_domain::policy::EffectiveConfig;
use blockguard_types::Severity;
use std::collections::BTreeMap;

pub const PROFILES: &[&str] = &["strict", "warn"];

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into repo config.
pub fn preset(profile: &str) -> Option<EffectiveConfig> {
    match profile {
        "strict" => Some(strict_profile()),
        "warn" => Some(warn_profile()),
        _ => None,
    }
}

fn strict_profile() -> EffectiveConfig {
    EffectiveConfig {
        profile: "strict".to_string(),
        fail_on: Severity::Low,
        minimum_severity: Severity::Low,
        max_findings: 200,
        checks: BTreeMap::new(),
    }
}

fn warn_profile() -> EffectiveConfig {
    // Report everything, fail only on critical findings.
    EffectiveConfig {
        profile: "warn".to_string(),
        fail_on: Severity::Critical,
        minimum_severity: Severity::Low,
        max_findings: 200,
        checks: BTreeMap::new(),
    }
}
