use blockguard_domain::{Action, MatchValue};
use blockguard_types::Severity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// On-disk checks file (`*_tfchecks.json` / `*_tfchecks.yaml`).
///
/// This is the *user-facing* shape. It is converted into domain [`blockguard_domain::Check`]s
/// only after validation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ChecksFile {
    #[serde(default)]
    pub checks: Vec<CheckDef>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckDef {
    pub code: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<String>,

    /// Block kinds: `resource`, `data`, `module`, ...
    #[serde(default)]
    pub required_types: Vec<String>,

    /// Type labels such as `aws_vpc`; `*` or an empty list matches any.
    #[serde(default)]
    pub required_labels: Vec<String>,

    pub severity: Severity,

    pub match_spec: MatchSpecDef,

    #[serde(default)]
    pub error_message: String,

    #[serde(default)]
    pub related_links: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatchSpecDef {
    /// Kept as text so unknown actions are reported with the check that uses them.
    #[schemars(with = "Action")]
    pub action: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    #[serde(default, alias = "matchValue", skip_serializing_if = "Option::is_none")]
    pub value: Option<MatchValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predicate_match_spec: Vec<MatchSpecDef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_match: Option<Box<MatchSpecDef>>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pre_conditions: Vec<MatchSpecDef>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assign_variable: Option<String>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub ignore_undefined: bool,
}
