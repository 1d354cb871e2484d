use crate::check::{Check, CheckRegistry};
use crate::context::EvalContext;
use crate::eval::Evaluator;
use crate::fingerprint::fingerprint_for_block;
use crate::model::{Block, Modules};
use crate::policy::EffectiveConfig;
use crate::report::DomainReport;
use blockguard_types::{BlockguardData, Finding, Severity, SeverityCounts, Verdict};
use rayon::prelude::*;

/// Run every registered check against every block it applies to.
///
/// Findings carry the severities declared in the checks file and are sorted deterministically.
pub fn scan(modules: &Modules, registry: &CheckRegistry) -> Vec<Finding> {
    let checks: Vec<&Check> = registry.iter().collect();
    let mut findings = run_checks(modules, &checks, |c| c.severity);
    findings.sort_by(compare_findings);
    findings
}

pub fn evaluate(
    modules: &Modules,
    registry: &CheckRegistry,
    cfg: &EffectiveConfig,
) -> DomainReport {
    let checks: Vec<&Check> = registry
        .iter()
        .filter(|c| cfg.is_enabled(&c.code))
        .collect();

    let mut findings = run_checks(modules, &checks, |c| cfg.severity_for(&c.code, c.severity));
    findings.retain(|f| f.severity >= cfg.minimum_severity);

    // Deterministic ordering before truncation.
    findings.sort_by(compare_findings);

    // Verdict and counts cover every finding, not just the emitted ones.
    let total = findings.len() as u32;
    let verdict = compute_verdict(&findings, cfg.fail_on);
    let counts = SeverityCounts::from_findings(&findings);

    let mut emitted = findings;
    let mut truncated_reason: Option<String> = None;
    if emitted.len() > cfg.max_findings {
        emitted.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let data = BlockguardData {
        profile: cfg.profile.clone(),
        checks_loaded: registry.len() as u32,
        modules_scanned: modules.modules().len() as u32,
        blocks_scanned: modules.block_count() as u32,
        findings_total: total,
        findings_emitted: emitted.len() as u32,
        counts,
        truncated_reason,
    };

    DomainReport {
        verdict,
        findings: emitted,
        data,
    }
}

/// (check, block) pairs are independent: checks run in parallel, each block gets a fresh context.
fn run_checks<F>(modules: &Modules, checks: &[&Check], severity: F) -> Vec<Finding>
where
    F: Fn(&Check) -> Severity + Sync,
{
    let evaluator = Evaluator::new(modules);

    checks
        .par_iter()
        .flat_map_iter(|check| {
            let severity = severity(check);
            modules
                .blocks()
                .filter(|block| check.applies_to(block))
                .filter_map(move |block| {
                    let mut ctx = EvalContext::new();
                    if evaluator.evaluate(&check.match_spec, block, &mut ctx) {
                        return None;
                    }
                    tracing::debug!(code = %check.code, block = %block.full_name(), "check failed");
                    Some(finding_for(check, block, severity))
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn finding_for(check: &Check, block: &Block, severity: Severity) -> Finding {
    let resource = block.full_name();
    let location = block.location().cloned();
    let fingerprint = fingerprint_for_block(
        &check.code,
        location.as_ref().map(|l| l.path.as_str()),
        &resource,
    );

    Finding {
        severity,
        code: check.code.clone(),
        description: check.description.clone(),
        message: check.render_message(block),
        resource,
        location,
        impact: check.impact.clone(),
        resolution: check.resolution.clone(),
        links: check.related_links.clone(),
        fingerprint: Some(fingerprint),
    }
}

fn compute_verdict(findings: &[Finding], fail_on: Severity) -> Verdict {
    if findings.iter().any(|f| f.severity >= fail_on) {
        return Verdict::Fail;
    }
    if !findings.is_empty() {
        return Verdict::Warn;
    }
    Verdict::Pass
}

fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) severity (critical -> low)
    // 2) location.path (missing last)
    // 3) location.line (missing last)
    // 4) code
    // 5) resource
    // 6) message
    let (ap, al) = match &a.location {
        Some(l) => (l.path.as_str(), l.line.unwrap_or(u32::MAX)),
        None => ("~", u32::MAX),
    };
    let (bp, bl) = match &b.location {
        Some(l) => (l.path.as_str(), l.line.unwrap_or(u32::MAX)),
        None => ("~", u32::MAX),
    };

    b.severity
        .cmp(&a.severity)
        .then(ap.cmp(bp))
        .then(al.cmp(&bl))
        .then(a.code.cmp(&b.code))
        .then(a.resource.cmp(&b.resource))
        .then(a.message.cmp(&b.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matchspec::{Action, MatchSpec};
    use crate::model::{Block, Module};
    use crate::policy::CheckPolicy;
    use crate::test_support::{check, config, config_with_override, registry, resource, root_modules};
    use blockguard_types::RepoPath;

    fn flow_log_check() -> Check {
        let mut c = check(
            "DP006",
            "aws_vpc",
            MatchSpec::requires_presence(
                "aws_flow_log",
                MatchSpec::leaf(Action::IsPresent, "log_destination"),
            ),
        );
        c.description = "VPC flow logs must be enabled".to_string();
        c.error_message = "VPCs should have an aws_flow_log associated with them".to_string();
        c
    }

    fn vpc() -> Block {
        resource("aws_vpc", "main")
            .with_attribute("cidr_block", "10.0.0.0/16")
            .with_attribute("instance_tenancy", "default")
    }

    fn flow_log(with_destination: bool) -> Block {
        let block = resource("aws_flow_log", "example")
            .with_attribute("traffic_type", "ALL")
            .with_attribute("vpc_id", "aws_vpc.example.id");
        if with_destination {
            block.with_attribute("log_destination", "aws_cloudwatch_log_group.example.arn")
        } else {
            block
        }
    }

    #[test]
    fn requires_presence_passes_with_companion_block() {
        let modules = root_modules(vec![vpc(), flow_log(true)]);
        let findings = scan(&modules, &registry(vec![flow_log_check()]));
        assert!(findings.is_empty());
    }

    #[test]
    fn requires_presence_fails_without_companion_block() {
        let modules = root_modules(vec![vpc()]);
        let findings = scan(&modules, &registry(vec![flow_log_check()]));
        assert_eq!(findings.len(), 1);
        let f = &findings[0];
        assert_eq!(f.code, "DP006");
        assert_eq!(f.severity, Severity::High);
        assert_eq!(f.resource, "aws_vpc.main");
        assert_eq!(
            f.message,
            "Custom check failed for resource aws_vpc.main. VPCs should have an aws_flow_log associated with them"
        );
        assert_eq!(
            f.location.as_ref().map(|l| l.path.as_str()),
            Some("main.tf.json")
        );
        assert!(f.fingerprint.is_some());
    }

    #[test]
    fn requires_presence_fails_when_submatch_fails() {
        let modules = root_modules(vec![vpc(), flow_log(false)]);
        let findings = scan(&modules, &registry(vec![flow_log_check()]));
        assert_eq!(findings.len(), 1);
    }

    #[test]
    fn requires_presence_searches_all_modules() {
        let modules = Modules::new(vec![
            Module::new(RepoPath::default(), vec![vpc()]),
            Module::new(RepoPath::new("modules/logging"), vec![flow_log(true)]),
        ]);
        assert!(scan(&modules, &registry(vec![flow_log_check()])).is_empty());
    }

    #[test]
    fn each_failing_block_yields_one_finding() {
        let modules = root_modules(vec![
            resource("aws_vpc", "a"),
            resource("aws_vpc", "b"),
            resource("aws_subnet", "c"),
        ]);
        let report = evaluate(&modules, &registry(vec![flow_log_check()]), &config());
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.data.blocks_scanned, 3);
        assert_eq!(report.data.checks_loaded, 1);
        assert_eq!(report.data.counts.high, 2);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn disabled_check_produces_no_findings() {
        let modules = root_modules(vec![vpc()]);
        let cfg = config_with_override("DP006", CheckPolicy::disabled());
        let report = evaluate(&modules, &registry(vec![flow_log_check()]), &cfg);
        assert!(report.findings.is_empty());
        assert_eq!(report.verdict, Verdict::Pass);
    }

    #[test]
    fn severity_override_and_fail_threshold_drive_verdict() {
        let modules = root_modules(vec![vpc()]);
        let mut cfg = config_with_override("DP006", CheckPolicy::with_severity(Severity::Low));
        cfg.fail_on = Severity::High;
        let report = evaluate(&modules, &registry(vec![flow_log_check()]), &cfg);
        assert_eq!(report.findings[0].severity, Severity::Low);
        assert_eq!(report.verdict, Verdict::Warn);
    }

    #[test]
    fn minimum_severity_drops_low_findings() {
        let modules = root_modules(vec![vpc()]);
        let mut cfg = config_with_override("DP006", CheckPolicy::with_severity(Severity::Low));
        cfg.minimum_severity = Severity::Medium;
        let report = evaluate(&modules, &registry(vec![flow_log_check()]), &cfg);
        assert!(report.findings.is_empty());
        assert_eq!(report.data.findings_total, 0);
    }

    #[test]
    fn findings_are_truncated_after_sorting() {
        let blocks = (0..5)
            .map(|i| resource("aws_vpc", &format!("vpc{i}")))
            .collect();
        let modules = root_modules(blocks);
        let mut cfg = config();
        cfg.max_findings = 2;
        let report = evaluate(&modules, &registry(vec![flow_log_check()]), &cfg);
        assert_eq!(report.findings.len(), 2);
        assert_eq!(report.data.findings_total, 5);
        assert_eq!(report.findings[0].resource, "aws_vpc.vpc0");
        assert!(report.data.truncated_reason.is_some());
    }

    #[test]
    fn zero_max_findings_still_fails_the_run() {
        let modules = root_modules(vec![vpc()]);
        let mut cfg = config();
        cfg.max_findings = 0;
        let report = evaluate(&modules, &registry(vec![flow_log_check()]), &cfg);
        assert!(report.findings.is_empty());
        assert_eq!(report.data.findings_total, 1);
        assert_eq!(report.data.counts.high, 1);
        assert_eq!(report.verdict, Verdict::Fail);
    }

    #[test]
    fn findings_sort_by_severity_descending() {
        let mut low = check(
            "CUS001",
            "aws_vpc",
            MatchSpec::leaf(Action::IsPresent, "tags"),
        );
        low.severity = Severity::Low;
        let mut critical = check(
            "CUS002",
            "aws_vpc",
            MatchSpec::leaf(Action::IsPresent, "ipv6_cidr_block"),
        );
        critical.severity = Severity::Critical;

        let modules = root_modules(vec![vpc()]);
        let findings = scan(&modules, &registry(vec![low, critical]));
        let codes: Vec<&str> = findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["CUS002", "CUS001"]);
    }

    #[test]
    fn variable_bindings_do_not_leak_between_blocks() {
        // The second block would pass only if it saw the first block's binding.
        let spec = MatchSpec::or(vec![
            MatchSpec::leaf(Action::IsPresent, "bucket").assign_to("NAME"),
            MatchSpec::compare(Action::Equals, "target", "NAME"),
        ]);
        let c = check("CUS003", "aws_s3_bucket", spec);
        let modules = root_modules(vec![
            resource("aws_s3_bucket", "first").with_attribute("bucket", "logs"),
            resource("aws_s3_bucket", "second").with_attribute("target", "logs"),
        ]);
        let findings = scan(&modules, &registry(vec![c]));
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].resource, "aws_s3_bucket.second");
    }
}
