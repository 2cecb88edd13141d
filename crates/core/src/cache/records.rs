//! Append-only answer record log.
//!
//! Records are inserted and never updated or deleted; a lookup returns the
//! most recently appended record for a key, and freshness is decided at
//! read time against the caller's TTL. The store is consulted through the
//! generic `AnswerStore` interface so an indexed implementation can be
//! swapped in without touching pipeline logic.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// One immutable answer record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub key: String,
    pub text: String,
    pub meta_json: String,
    /// Unix seconds at append time.
    pub recorded_at: i64,
}

/// Generic get/put/scan interface over the persistent answer log.
#[allow(async_fn_in_trait)]
pub trait AnswerStore {
    /// Newest record for `key` if it is within `ttl_secs` of now.
    async fn get(&self, key: &str, ttl_secs: i64) -> Result<Option<AnswerRecord>, Error>;

    /// Append a record. Never overwrites.
    async fn put(&self, key: &str, text: &str, meta_json: &str) -> Result<(), Error>;

    /// All distinct keys in the log.
    async fn scan_keys(&self) -> Result<Vec<String>, Error>;
}

impl CacheDb {
    /// Append a record with an explicit timestamp. Exposed for tests that
    /// exercise TTL boundaries without sleeping.
    pub async fn put_answer_at(&self, key: &str, text: &str, meta_json: &str, recorded_at: i64) -> Result<(), Error> {
        let key = key.to_string();
        let text = text.to_string();
        let meta_json = meta_json.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO answer_records (key_hash, recorded_at, text, meta_json)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![key, recorded_at, text, meta_json],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Newest record for `key`, freshness judged against `now`.
    pub async fn get_answer_as_of(&self, key: &str, ttl_secs: i64, now: i64) -> Result<Option<AnswerRecord>, Error> {
        let key = key.to_string();
        let record = self
            .conn
            .call(move |conn| -> Result<Option<AnswerRecord>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT key_hash, text, meta_json, recorded_at
                     FROM answer_records WHERE key_hash = ?1
                     ORDER BY id DESC LIMIT 1",
                )?;

                let result = stmt.query_row(params![key], |row| {
                    Ok(AnswerRecord {
                        key: row.get(0)?,
                        text: row.get(1)?,
                        meta_json: row.get(2)?,
                        recorded_at: row.get(3)?,
                    })
                });

                match result {
                    Ok(r) => Ok(Some(r)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)?;

        Ok(record.filter(|r| now - r.recorded_at <= ttl_secs))
    }
}

impl AnswerStore for CacheDb {
    async fn get(&self, key: &str, ttl_secs: i64) -> Result<Option<AnswerRecord>, Error> {
        self.get_answer_as_of(key, ttl_secs, chrono::Utc::now().timestamp()).await
    }

    async fn put(&self, key: &str, text: &str, meta_json: &str) -> Result<(), Error> {
        self.put_answer_at(key, text, meta_json, chrono::Utc::now().timestamp()).await
    }

    async fn scan_keys(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT DISTINCT key_hash FROM answer_records ORDER BY key_hash")?;
                let keys = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put("k1", "answer", "{}").await.unwrap();

        let record = db.get("k1", 3600).await.unwrap().unwrap();
        assert_eq!(record.text, "answer");
        assert_eq!(record.key, "k1");
    }

    #[tokio::test]
    async fn test_get_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get("nope", 3600).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ttl_boundaries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let t0 = 1_700_000_000;
        db.put_answer_at("k1", "answer", "{}", t0).await.unwrap();

        // Live at t0+59 with ttl=60, absent at t0+61.
        assert!(db.get_answer_as_of("k1", 60, t0 + 59).await.unwrap().is_some());
        assert!(db.get_answer_as_of("k1", 60, t0 + 61).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_newest_record_wins() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let t0 = 1_700_000_000;
        db.put_answer_at("k1", "old", "{}", t0).await.unwrap();
        db.put_answer_at("k1", "new", "{}", t0 + 10).await.unwrap();

        let record = db.get_answer_as_of("k1", 3600, t0 + 20).await.unwrap().unwrap();
        assert_eq!(record.text, "new");
        // recorded_at round-trips as the integer it was written as.
        assert_eq!(record.recorded_at, t0 + 10);
    }

    #[tokio::test]
    async fn test_append_only_preserves_history() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.put("k1", "first", "{}").await.unwrap();
        db.put("k1", "second", "{}").await.unwrap();
        db.put("k2", "other", "{}").await.unwrap();

        let count: i64 = db
            .conn
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM answer_records", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(count, 3);

        let keys = db.scan_keys().await.unwrap();
        assert_eq!(keys, vec!["k1".to_string(), "k2".to_string()]);
    }
}
