use crate::{model::BlockguardConfigV1, presets};
use anyhow::Context;
use blockguard_domain::policy::{CheckPolicy, EffectiveConfig};
use blockguard_types::Severity;
use globset::Glob;

pub const DEFAULT_CHECKS_DIR: &str = ".tfsec";

/// CLI-provided values; each one wins over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub profile: Option<String>,
    pub fail_on: Option<String>,
    pub max_findings: Option<u32>,
    pub checks_dir: Option<String>,
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
    pub checks_dir: String,
    pub exclude: Vec<String>,
}

pub fn resolve_config(
    cfg: BlockguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let profile = overrides
        .profile
        .clone()
        .or(cfg.profile.clone())
        .unwrap_or_else(|| "strict".to_string());

    let mut effective = presets::preset(&profile).with_context(|| {
        format!(
            "unknown profile: {profile} (expected one of {})",
            presets::PROFILES.join("|")
        )
    })?;

    if let Some(mf) = overrides.max_findings.or(cfg.max_findings) {
        effective.max_findings = mf as usize;
    }

    if let Some(fail_on) = overrides.fail_on.as_deref().or(cfg.fail_on.as_deref()) {
        effective.fail_on = parse_severity(fail_on).context("invalid fail_on")?;
    }
    if let Some(min) = cfg.minimum_severity.as_deref() {
        effective.minimum_severity = parse_severity(min).context("invalid minimum_severity")?;
    }

    // per-check overrides
    for (code, cc) in cfg.checks.iter() {
        let entry = effective
            .checks
            .entry(code.clone())
            .or_insert_with(CheckPolicy::enabled);

        if let Some(enabled) = cc.enabled {
            entry.enabled = enabled;
        }
        if let Some(sev) = cc.severity.as_deref() {
            entry.severity =
                Some(parse_severity(sev).with_context(|| format!("invalid severity for {code}"))?);
        }
    }

    validate_excludes(&cfg.exclude)?;

    let checks_dir = overrides
        .checks_dir
        .or(cfg.checks_dir)
        .unwrap_or_else(|| DEFAULT_CHECKS_DIR.to_string());

    Ok(ResolvedConfig {
        effective,
        checks_dir,
        exclude: cfg.exclude,
    })
}

fn validate_excludes(patterns: &[String]) -> anyhow::Result<()> {
    for pattern in patterns {
        Glob::new(pattern).with_context(|| format!("invalid exclude glob: {pattern}"))?;
    }
    Ok(())
}

fn parse_severity(v: &str) -> anyhow::Result<Severity> {
    v.parse::<Severity>().map_err(anyhow::Error::msg)
}
