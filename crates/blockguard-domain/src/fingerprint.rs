use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a custom-check finding.
///
/// Identity fields:
/// - check code
/// - file path (repo-relative), or `~` when the block has no location
/// - block full name
pub fn fingerprint_for_block(code: &str, path: Option<&str>, resource: &str) -> String {
    let canonical = [code, path.unwrap_or("~"), resource].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}
