//! Stable DTOs and IDs used across the blockguard workspace.
//!
//! This crate is intentionally boring:
//! - severities, findings, and the emitted report envelope
//! - stable string IDs
//! - canonical repo-relative path handling

#![forbid(unsafe_code)]

pub mod ids;
pub mod path;
pub mod receipt;

pub use path::RepoPath;
pub use receipt::{
    BlockguardData, BlockguardReport, Finding, Location, ReportEnvelope, Severity,
    SeverityCounts, ToolMeta, Verdict, SCHEMA_REPORT_V1,
};
