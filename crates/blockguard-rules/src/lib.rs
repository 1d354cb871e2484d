//! Checks-file loading: decode, validate, and build a [`CheckRegistry`].
//!
//! This crate is IO-free: callers hand in file names and contents.

#![forbid(unsafe_code)]

mod convert;
mod error;
mod model;

pub use error::RuleError;
pub use model::{CheckDef, ChecksFile, MatchSpecDef};

use blockguard_domain::{Check, CheckRegistry};
use std::collections::BTreeSet;

/// Encoding of a checks file, chosen by extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChecksFormat {
    Json,
    Yaml,
}

impl ChecksFormat {
    pub fn from_file_name(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.')?.1;
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(ChecksFormat::Json),
            "yaml" | "yml" => Some(ChecksFormat::Yaml),
            _ => None,
        }
    }
}

/// Decode a checks file without validating its checks.
pub fn parse_checks_file(file: &str, text: &str) -> Result<ChecksFile, RuleError> {
    let format = ChecksFormat::from_file_name(file).ok_or_else(|| {
        RuleError::malformed(file, "unsupported extension (expected .json, .yaml or .yml)")
    })?;
    let decoded = match format {
        ChecksFormat::Json => serde_json::from_str(text).map_err(|e| e.to_string()),
        ChecksFormat::Yaml => serde_yaml::from_str(text).map_err(|e| e.to_string()),
    };
    decoded.map_err(|reason| RuleError::malformed(file, reason))
}

/// Decode and validate every check in one file.
pub fn load_checks(file: &str, text: &str) -> Result<Vec<Check>, RuleError> {
    let parsed = parse_checks_file(file, text)?;
    let checks = parsed
        .checks
        .into_iter()
        .enumerate()
        .map(|(i, def)| convert::to_check(file, i, def))
        .collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(file, checks = checks.len(), "loaded checks file");
    Ok(checks)
}

/// Build one registry from several files; any error discards the whole registry.
pub fn load_registry<'a, I>(files: I) -> Result<CheckRegistry, RuleError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut builder = RegistryBuilder::new();
    for (file, text) in files {
        builder.add_file(file, text)?;
    }
    Ok(builder.build())
}

/// Accumulates checks from several files. A file is added entirely or not at all.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    registry: CheckRegistry,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of checks added.
    pub fn add_file(&mut self, file: &str, text: &str) -> Result<usize, RuleError> {
        let checks = load_checks(file, text)?;
        self.add_checks(file, checks)
    }

    pub fn add_checks(&mut self, file: &str, checks: Vec<Check>) -> Result<usize, RuleError> {
        let mut seen = BTreeSet::new();
        for check in &checks {
            if self.registry.get(&check.code).is_some() || !seen.insert(check.code.as_str()) {
                return Err(RuleError::malformed(
                    file,
                    format!("duplicate check code {}", check.code),
                ));
            }
        }

        let added = checks.len();
        for check in checks {
            self.registry.insert(check);
        }
        Ok(added)
    }

    pub fn build(self) -> CheckRegistry {
        self.registry
    }
}
