//! Stable identifiers that are not user-authored check codes.
//!
//! Custom check codes come from checks files; the IDs here cover the tool itself.

pub const TOOL_NAME: &str = "blockguard";

/// Code used for the single finding emitted when the run itself fails.
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";

/// Suffixes that mark a file as a custom checks file.
pub const CHECKS_FILE_SUFFIXES: &[&str] = &["_tfchecks.json", "_tfchecks.yaml", "_tfchecks.yml"];

/// `true` for names like `custom_tfchecks.json` picked up from a checks directory.
pub fn is_checks_file_name(name: &str) -> bool {
    CHECKS_FILE_SUFFIXES.iter().any(|s| name.ends_with(s))
}

/// Suffix of the Terraform JSON-syntax configuration files that get scanned.
pub const CONFIG_FILE_SUFFIX: &str = ".tf.json";
