//! In-memory session cache.
//!
//! Process-lifetime, no TTL. Entries are keyed by the session key from
//! `cache::key` and carry the answer text plus its metadata as JSON.
//! Writing empty text is a no-op.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;

/// A process-lifetime answer cache.
#[derive(Debug, Default)]
pub struct SessionCache {
    entries: Mutex<HashMap<String, (String, serde_json::Value)>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached answer by session key.
    pub fn get(&self, key: &str) -> Option<(String, serde_json::Value)> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.get(key).cloned()
    }

    /// Store an answer. Empty text is silently dropped; `cached_at` is
    /// stamped into the metadata.
    pub fn put(&self, key: &str, text: &str, meta: serde_json::Value) {
        if text.is_empty() {
            return;
        }
        let mut meta = if meta.is_object() { meta } else { serde_json::json!({}) };
        meta["cached_at"] = serde_json::json!(Utc::now().timestamp());

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.to_string(), (text.to_string(), meta));
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get() {
        let cache = SessionCache::new();
        cache.put("k1", "answer", serde_json::json!({"route": "model"}));

        let (text, meta) = cache.get("k1").unwrap();
        assert_eq!(text, "answer");
        assert_eq!(meta["route"], "model");
        assert!(meta["cached_at"].is_i64());
    }

    #[test]
    fn test_empty_text_is_noop() {
        let cache = SessionCache::new();
        cache.put("k1", "", serde_json::json!({}));
        assert!(cache.get("k1").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_missing_key() {
        let cache = SessionCache::new();
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn test_non_object_meta_coerced() {
        let cache = SessionCache::new();
        cache.put("k1", "text", serde_json::json!("not an object"));
        let (_, meta) = cache.get("k1").unwrap();
        assert!(meta.is_object());
    }
}
