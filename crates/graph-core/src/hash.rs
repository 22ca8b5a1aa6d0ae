//! Content hashing for file-level dirty detection (spec.md §4.5, §6).
//!
//! Files are hashed with SHA-256 and stored as lowercase hex. This is a
//! different concern from node-identity hashing: symbol-key uniqueness
//! already answers "is this the same declaration" (SPEC_FULL.md §9b), so
//! there is no xxhash/base62 identity hash here — `compute_content_hash`
//! exists purely to answer "have this file's bytes changed since we last
//! indexed it".

use sha2::{Digest, Sha256};

/// Computes the lowercase hex SHA-256 digest of `content`.
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

/// Computes the cache key for an `ai_cache` row: SHA-256 of the canonical
/// JSON request payload (spec.md §4.4).
pub fn compute_cache_key(canonical_payload: &str) -> String {
    compute_content_hash(canonical_payload.as_bytes())
}
