//! Cache key generation.
//!
//! Two key families that are never unified:
//!
//! - The **session key** covers (query, style mode, model id, recency flag,
//!   freshness flag), so answers cannot leak across style, model, or
//!   recency boundaries within a process.
//! - The **semantic key** covers (normalized query, intent, version salt)
//!   and addresses the persistent answer-record log across processes.

use sha2::{Digest, Sha256};

/// Collapse whitespace and lowercase, for semantic keying.
pub fn normalize_query(q: &str) -> String {
    q.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Compute the in-memory session cache key.
pub fn session_key(query: &str, style_mode: &str, model: &str, recency: bool, fresh: bool) -> String {
    let blob = serde_json::json!({
        "q": query.trim(),
        "m": model,
        "s": style_mode,
        "r": recency,
        "f": fresh,
    });

    let mut hasher = Sha256::new();
    hasher.update(blob.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Compute the persistent semantic cache key.
///
/// The salt lets a version bump invalidate every prior record without
/// touching the log.
pub fn semantic_key(query: &str, intent: Option<&str>, version_salt: &str) -> String {
    let salt = serde_json::json!({
        "intent": intent.unwrap_or(""),
        "vers": version_salt,
    });

    let mut hasher = Sha256::new();
    hasher.update(normalize_query(query).as_bytes());
    hasher.update(b"|");
    hasher.update(salt.to_string().as_bytes());
    hex::encode(hasher.finalize())[..16].to_string()
}
