//! The `check` use case: load custom checks, scan the configuration, produce a report.

use anyhow::Context;
use blockguard_domain::CheckRegistry;
use blockguard_settings::{Overrides, ResolvedConfig};
use blockguard_types::{BlockguardReport, ReportEnvelope, SCHEMA_REPORT_V1, ToolMeta, Verdict, ids};
use camino::Utf8Path;
use time::OffsetDateTime;

/// Input for the check use case.
#[derive(Clone, Debug)]
pub struct CheckInput<'a> {
    /// Repository root path.
    pub repo_root: &'a Utf8Path,
    /// Config file contents (empty string if not found).
    pub config_text: &'a str,
    /// CLI overrides.
    pub overrides: Overrides,
}

/// Output from the check use case.
#[derive(Clone, Debug)]
pub struct CheckOutput {
    pub report: BlockguardReport,
    /// The resolved configuration used.
    pub resolved_config: ResolvedConfig,
}

/// Run the check use case: parse config, load checks, discover modules, evaluate, report.
pub fn run_check(input: CheckInput<'_>) -> anyhow::Result<CheckOutput> {
    let started_at = OffsetDateTime::now_utc();

    // Parse config (empty is allowed, defaults apply).
    let cfg = if input.config_text.trim().is_empty() {
        blockguard_settings::BlockguardConfigV1::default()
    } else {
        blockguard_settings::parse_config_toml(input.config_text).context("parse config")?
    };

    let resolved = blockguard_settings::resolve_config(cfg, input.overrides.clone())
        .context("resolve config")?;

    let registry = load_registry(input.repo_root, &resolved.checks_dir)?;
    if registry.is_empty() {
        tracing::warn!(checks_dir = %resolved.checks_dir, "no custom checks found");
    }

    let modules = blockguard_repo::build_modules(input.repo_root, &resolved.exclude)
        .context("build module model")?;

    let blockguard_domain::report::DomainReport {
        verdict,
        findings,
        data,
    } = blockguard_domain::evaluate(&modules, &registry, &resolved.effective);

    tracing::info!(
        checks = data.checks_loaded,
        blocks = data.blocks_scanned,
        findings = data.findings_emitted,
        verdict = ?verdict,
        "scan complete"
    );

    let report = ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: ids::TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        verdict,
        findings,
        data,
    };

    Ok(CheckOutput {
        report,
        resolved_config: resolved,
    })
}

/// Read and merge every checks file in `checks_dir` into one registry.
pub fn load_registry(repo_root: &Utf8Path, checks_dir: &str) -> anyhow::Result<CheckRegistry> {
    let sources = blockguard_repo::read_checks_dir(repo_root, checks_dir)
        .with_context(|| format!("read checks dir {checks_dir}"))?;
    let registry = blockguard_rules::load_registry(
        sources
            .iter()
            .map(|s| (s.name.as_str(), s.text.as_str())),
    )
    .context("load custom checks")?;
    Ok(registry)
}

/// Map verdict to exit code: 0 = pass/warn, 2 = fail.
pub fn verdict_exit_code(verdict: &Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Warn => 0,
        Verdict::Fail => 2,
    }
}
