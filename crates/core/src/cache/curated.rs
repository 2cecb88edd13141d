//! Curated answer overrides.
//!
//! Two layers over the same normalized-query keyspace: an ephemeral
//! process-lifetime map that always shadows a persistent SQLite table.
//! Removal never deletes a key; it clears the ephemeral entry and writes an
//! empty-string tombstone persistently, so "absent" survives restarts.

use std::collections::HashMap;
use std::sync::Mutex;

use super::connection::CacheDb;
use super::key::normalize_query;
use crate::Error;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Curated override store: ephemeral layer over a persistent table.
#[derive(Debug)]
pub struct CuratedStore {
    db: CacheDb,
    ephemeral: Mutex<HashMap<String, String>>,
}

impl CuratedStore {
    pub fn new(db: CacheDb) -> Self {
        Self { db, ephemeral: Mutex::new(HashMap::new()) }
    }

    /// Look up a curated answer: ephemeral first, then persistent.
    /// Empty values are tombstones and read as absent.
    pub async fn maybe(&self, query: &str) -> Result<Option<String>, Error> {
        let norm = normalize_query(query);

        {
            let ephemeral = self.ephemeral.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(text) = ephemeral.get(&norm)
                && !text.is_empty()
            {
                return Ok(Some(text.clone()));
            }
        }

        Ok(self.persistent_get(&norm).await?.filter(|t| !t.is_empty()))
    }

    /// Pin an answer for this process only. Overwrites unconditionally.
    pub fn add_ephemeral(&self, query: &str, text: &str) {
        let mut ephemeral = self.ephemeral.lock().unwrap_or_else(|e| e.into_inner());
        ephemeral.insert(normalize_query(query), text.to_string());
    }

    /// Pin an answer on disk. Overwrites unconditionally.
    pub async fn add_persistent(&self, query: &str, text: &str) -> Result<(), Error> {
        self.persistent_put(&normalize_query(query), text).await
    }

    /// Remove a curated entry: clear the ephemeral layer and write a
    /// persistent tombstone. Idempotent.
    pub async fn remove(&self, query: &str) -> Result<(), Error> {
        let norm = normalize_query(query);
        {
            let mut ephemeral = self.ephemeral.lock().unwrap_or_else(|e| e.into_inner());
            ephemeral.remove(&norm);
        }
        self.persistent_put(&norm, "").await
    }

    /// Drop every ephemeral pin, leaving the persistent layer untouched.
    pub fn clear_ephemeral(&self) {
        self.ephemeral.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    async fn persistent_get(&self, norm: &str) -> Result<Option<String>, Error> {
        let norm = norm.to_string();
        self.db
            .conn
            .call(move |conn| -> Result<Option<String>, Error> {
                let result = conn.query_row(
                    "SELECT text FROM curated_answers WHERE query_norm = ?1",
                    params![norm],
                    |row| row.get(0),
                );
                match result {
                    Ok(text) => Ok(Some(text)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn persistent_put(&self, norm: &str, text: &str) -> Result<(), Error> {
        let norm = norm.to_string();
        let text = text.to_string();
        let updated_at = chrono::Utc::now().to_rfc3339();
        self.db
            .conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT INTO curated_answers (query_norm, text, updated_at)
                     VALUES (?1, ?2, ?3)
                     ON CONFLICT(query_norm) DO UPDATE SET
                        text = excluded.text,
                        updated_at = excluded.updated_at",
                    params![norm, text, updated_at],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }
}
