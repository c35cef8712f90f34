use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a finding.
///
/// Identity fields:
/// - check_id
/// - code
/// - document path (repo-relative)
/// - subject (the rule, key, pattern, or action the finding is about)
pub fn fingerprint_for(check_id: &str, code: &str, document: &str, subject: &str) -> String {
    let canonical = [check_id, code, document, subject].join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
