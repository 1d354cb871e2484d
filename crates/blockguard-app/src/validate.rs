//! The `validate` use case: load one checks file and report what it defines.

use anyhow::Context;
use blockguard_domain::Check;
use blockguard_rules::{ChecksFile, RegistryBuilder};
use camino::Utf8Path;

#[derive(Clone, Debug)]
pub struct ValidateOutput {
    pub file: String,
    pub checks: Vec<Check>,
}

/// Read and validate a checks file. Malformed definitions are returned as errors.
pub fn validate_checks(path: &Utf8Path) -> anyhow::Result<ValidateOutput> {
    let text = std::fs::read_to_string(path).with_context(|| format!("read {path}"))?;
    let mut builder = RegistryBuilder::new();
    builder.add_file(path.as_str(), &text)?;

    Ok(ValidateOutput {
        file: path.to_string(),
        checks: builder.build().iter().cloned().collect(),
    })
}

pub fn format_validation(output: &ValidateOutput) -> String {
    let mut out = format!("{}: {} check(s) OK\n", output.file, output.checks.len());
    for check in &output.checks {
        out.push_str(&format!(
            "  - {} [{}] {}\n",
            check.code, check.severity, check.description
        ));
    }
    out
}

/// JSON Schema of the checks-file format.
pub fn checks_file_schema_json() -> anyhow::Result<String> {
    let schema = schemars::schema_for!(ChecksFile);
    let mut text = serde_json::to_string_pretty(&schema).context("serialize schema")?;
    text.push('\n');
    Ok(text)
}
