use anyhow::Context;
use blockguard_types::RepoPath;
use blockguard_types::ids::{CONFIG_FILE_SUFFIX, is_checks_file_name};
use camino::{Utf8Path, Utf8PathBuf};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::PathBuf;
use walkdir::WalkDir;

/// Discover Terraform JSON files (`*.tf.json`) below `repo_root`.
///
/// Behavior:
/// - hidden directories (`.git`, `.terraform`, ...) are never entered
/// - a file is skipped when its repo-relative path or any parent directory matches `exclude`
/// - results are repo-relative and sorted
pub fn discover_config_files(
    repo_root: &Utf8Path,
    exclude: &[String],
) -> anyhow::Result<Vec<RepoPath>> {
    let exclude_set = build_globset(exclude).context("compile exclude globset")?;

    let mut out: Vec<RepoPath> = Vec::new();
    for abs in WalkDir::new(repo_root)
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden_dir(e))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| pathbuf_to_utf8(e.path().to_path_buf()))
        .filter(|p| p.as_str().ends_with(CONFIG_FILE_SUFFIX))
    {
        let rel = abs
            .strip_prefix(repo_root)
            .unwrap_or(&abs)
            .as_str()
            .replace('\\', "/");

        if is_excluded(&exclude_set, &rel) {
            tracing::debug!(path = %rel, "excluded");
            continue;
        }
        out.push(RepoPath::new(&rel));
    }

    // Stable order.
    out.sort();
    out.dedup();

    Ok(out)
}

/// Checks files directly inside `checks_dir` (not recursive), sorted by name.
///
/// A missing directory yields an empty list.
pub fn discover_checks_files(checks_dir: &Utf8Path) -> anyhow::Result<Vec<Utf8PathBuf>> {
    if !checks_dir.is_dir() {
        tracing::debug!(dir = %checks_dir, "checks directory not found");
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for entry in checks_dir
        .read_dir_utf8()
        .with_context(|| format!("read dir {checks_dir}"))?
    {
        let entry = entry.with_context(|| format!("read dir {checks_dir}"))?;
        let name = entry.file_name();
        if entry.path().is_file() && is_checks_file_name(name) {
            out.push(entry.path().to_path_buf());
        }
    }
    out.sort();
    Ok(out)
}

fn is_hidden_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with('.'))
}

fn is_excluded(set: &GlobSet, rel: &str) -> bool {
    if set.is_match(rel) {
        return true;
    }
    let mut dir = Utf8Path::new(rel).parent();
    while let Some(d) = dir {
        if !d.as_str().is_empty() && set.is_match(d.as_str()) {
            return true;
        }
        dir = d.parent();
    }
    false
}

fn build_globset(patterns: &[String]) -> anyhow::Result<GlobSet> {
    let mut b = GlobSetBuilder::new();
    for p in patterns {
        b.add(Glob::new(p)?);
    }
    Ok(b.build()?)
}

fn pathbuf_to_utf8(path: PathBuf) -> Option<Utf8PathBuf> {
    Utf8PathBuf::from_path_buf(path).ok()
}
