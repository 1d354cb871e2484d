//! Use case orchestration for blockguard.
//!
//! This crate provides the application layer: use cases that coordinate the settings, rules,
//! repo, and domain layers. It is intentionally thin and delegates heavy lifting to them.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod report;
mod validate;

pub use check::{CheckInput, CheckOutput, load_registry, run_check, verdict_exit_code};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use report::{parse_report_json, runtime_error_report, serialize_report, write_report};
pub use validate::{ValidateOutput, checks_file_schema_json, format_validation, validate_checks};
