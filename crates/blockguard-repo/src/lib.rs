//! Repository adapters: discover Terraform JSON files and checks files, read and parse them.
//!
//! This crate is allowed to do filesystem IO. It should not spawn external processes.

#![forbid(unsafe_code)]

mod discover;
mod parse;

use anyhow::Context;
use blockguard_domain::model::{Module, Modules};
use blockguard_types::RepoPath;
use camino::Utf8Path;
use std::collections::BTreeMap;

pub use discover::{discover_checks_files, discover_config_files};

/// Fuzz-friendly API for testing parsing robustness without filesystem access.
/// These functions are designed to never panic on any input.
pub mod fuzz {
    use super::*;

    /// Parse arbitrary text as a Terraform JSON file.
    ///
    /// Returns the number of top-level blocks. **Never panics** on any input.
    pub fn parse_config_file(text: &str) -> anyhow::Result<usize> {
        let path = RepoPath::new("fuzz.tf.json");
        Ok(parse::parse_config_file(&path, text)?.len())
    }
}

/// A checks file as read from disk; `name` is the repo-relative path used in errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChecksSource {
    pub name: String,
    pub text: String,
}

/// Build the in-memory module model used by the engine.
///
/// Every directory holding `*.tf.json` files is one module; the repo root is the root module.
pub fn build_modules(repo_root: &Utf8Path, exclude: &[String]) -> anyhow::Result<Modules> {
    let files = discover::discover_config_files(repo_root, exclude)
        .context("discover configuration files")?;

    let mut by_dir: BTreeMap<RepoPath, Vec<_>> = BTreeMap::new();
    for path in files {
        let abs = repo_root.join(path.as_str());
        let text = std::fs::read_to_string(&abs).with_context(|| format!("read {abs}"))?;
        let blocks = parse::parse_config_file(&path, &text)
            .with_context(|| format!("parse {}", path.as_str()))?;
        by_dir.entry(path.parent()).or_default().extend(blocks);
    }

    let modules: Vec<Module> = by_dir
        .into_iter()
        .map(|(dir, blocks)| Module::new(dir, blocks))
        .collect();
    tracing::debug!(modules = modules.len(), "built module model");

    Ok(Modules::new(modules))
}

/// Read every checks file in `checks_dir` (relative paths resolve against `repo_root`).
pub fn read_checks_dir(repo_root: &Utf8Path, checks_dir: &str) -> anyhow::Result<Vec<ChecksSource>> {
    let dir = repo_root.join(checks_dir);
    discover::discover_checks_files(&dir)?
        .into_iter()
        .map(|abs| {
            let text = std::fs::read_to_string(&abs).with_context(|| format!("read {abs}"))?;
            let name = abs
                .strip_prefix(repo_root)
                .map(|p| RepoPath::from(p).as_str().to_string())
                .unwrap_or_else(|_| abs.to_string());
            Ok(ChecksSource { name, text })
        })
        .collect()
}
