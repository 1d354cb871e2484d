//! Report serialization and the runtime-error envelope.

use anyhow::Context;
use blockguard_types::{
    BlockguardData, BlockguardReport, Finding, ReportEnvelope, SCHEMA_REPORT_V1, Severity,
    SeverityCounts, ToolMeta, Verdict, ids,
};
use camino::Utf8Path;
use time::OffsetDateTime;

pub fn serialize_report(report: &BlockguardReport) -> anyhow::Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(report).context("serialize report")?;
    bytes.push(b'\n');
    Ok(bytes)
}

pub fn parse_report_json(text: &str) -> anyhow::Result<BlockguardReport> {
    let report: BlockguardReport = serde_json::from_str(text).context("parse report JSON")?;
    if report.schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unsupported report schema: {}", report.schema);
    }
    Ok(report)
}

/// Write a report, creating parent directories as needed.
pub fn write_report(path: &Utf8Path, report: &BlockguardReport) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
    }
    let bytes = serialize_report(report)?;
    std::fs::write(path, bytes).with_context(|| format!("write {path}"))?;
    Ok(())
}

/// A failing report carrying one `tool.runtime` finding, for runs that could not complete.
pub fn runtime_error_report(message: &str) -> BlockguardReport {
    let now = OffsetDateTime::now_utc();
    let findings = vec![Finding {
        severity: Severity::Critical,
        code: ids::CHECK_TOOL_RUNTIME.to_string(),
        description: "blockguard could not complete the scan".to_string(),
        message: message.to_string(),
        resource: String::new(),
        location: None,
        impact: None,
        resolution: Some("Fix the tool error and re-run blockguard.".to_string()),
        links: Vec::new(),
        fingerprint: None,
    }];
    let data = BlockguardData {
        profile: "unknown".to_string(),
        findings_total: 1,
        findings_emitted: 1,
        counts: SeverityCounts::from_findings(&findings),
        ..BlockguardData::default()
    };

    ReportEnvelope {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: ToolMeta {
            name: ids::TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        started_at: now,
        finished_at: now,
        verdict: Verdict::Fail,
        findings,
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;

    #[test]
    fn runtime_error_report_fails_with_one_finding() {
        let report = runtime_error_report("boom");
        assert_eq!(report.verdict, Verdict::Fail);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].code, ids::CHECK_TOOL_RUNTIME);
        assert_eq!(report.data.counts.critical, 1);
    }

    #[test]
    fn serialized_report_parses_back() {
        let report = runtime_error_report("boom");
        let bytes = serialize_report(&report).expect("serialize");
        let text = String::from_utf8(bytes).expect("utf8");
        assert!(text.contains("\"schema\": \"blockguard.report.v1\""));
        assert!(text.contains("\"severity\": \"CRITICAL\""));

        let parsed = parse_report_json(&text).expect("parse");
        assert_eq!(parsed.findings, report.findings);
        assert_eq!(parsed.verdict, Verdict::Fail);
    }

    #[test]
    fn parse_rejects_other_schemas() {
        let report = runtime_error_report("boom");
        let text = serde_json::to_string(&report)
            .expect("serialize")
            .replace("blockguard.report.v1", "other.report.v9");
        assert!(parse_report_json(&text).is_err());
    }

    #[test]
    fn write_report_creates_parent_dirs() {
        let tmp = tempfile::tempdir().expect("temp dir");
        let root = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8 path");
        let out = root.join("artifacts/blockguard/report.json");

        write_report(&out, &runtime_error_report("boom")).expect("write");
        assert!(out.is_file());
    }
}
