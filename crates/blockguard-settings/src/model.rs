use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `blockguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BlockguardConfigV1 {
    /// Optional schema string for tooling (`blockguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `strict` (default) or `warn`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Lowest severity that fails the run: `LOW`, `MEDIUM`, `HIGH`, `CRITICAL`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    /// Findings below this severity are dropped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_severity: Option<String>,

    /// How many findings to emit before truncating the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_findings: Option<u32>,

    /// Directory holding `*_tfchecks.{json,yaml,yml}` files, relative to the repo root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checks_dir: Option<String>,

    /// Glob patterns excluded from configuration discovery.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,

    /// Map of check code -> config.
    #[serde(default)]
    pub checks: BTreeMap<String, CheckConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CheckConfig {
    /// Checks are enabled unless set to `false` here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// Replaces the severity declared in the checks file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}
