//! Append/scan memory facility.
//!
//! A JSONL file of remembered notes, used only by the front end's
//! remember/recall/forget commands; the resolution pipeline never reads
//! it. Unparseable lines are skipped on scan rather than failing the
//! whole file.

use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use kestrel_core::Error;

/// One remembered note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub id: String,
    /// Unix milliseconds at append time.
    pub ts: i64,
    pub text: String,
    #[serde(default)]
    pub tag: Option<String>,
}

/// JSONL-backed memory store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    path: PathBuf,
}

impl MemoryStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Append one record and return it.
    pub fn remember(&self, text: &str, tag: Option<&str>) -> Result<MemoryRecord, Error> {
        // A per-process sequence keeps ids unique within one millisecond.
        static SEQ: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let seq = SEQ.fetch_add(1, std::sync::atomic::Ordering::Relaxed);

        let ts = Utc::now().timestamp_millis();
        let record = MemoryRecord {
            id: format!("{}-{}", ts, seq),
            ts,
            text: text.to_string(),
            tag: tag.map(String::from),
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::MalformedState(e.to_string()))?;
        }

        let line = serde_json::to_string(&record).map_err(|e| Error::MalformedState(e.to_string()))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| Error::MalformedState(e.to_string()))?;
        writeln!(file, "{}", line).map_err(|e| Error::MalformedState(e.to_string()))?;

        Ok(record)
    }

    /// All records, oldest first. Unparseable lines are skipped.
    pub fn load_all(&self) -> Vec<MemoryRecord> {
        let Ok(raw) = std::fs::read_to_string(&self.path) else {
            return Vec::new();
        };
        raw.lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| serde_json::from_str(line).ok())
            .collect()
    }

    /// Recall records, newest first, filtered by substring, tag, and an
    /// optional cap on the number returned.
    pub fn recall(&self, needle: Option<&str>, tag: Option<&str>, last: Option<usize>) -> Vec<MemoryRecord> {
        let mut items = self.load_all();

        if let Some(tag) = tag {
            items.retain(|r| r.tag.as_deref() == Some(tag));
        }
        if let Some(needle) = needle {
            let needle = needle.to_lowercase();
            items.retain(|r| r.text.to_lowercase().contains(&needle));
        }

        items.sort_by(|a, b| b.ts.cmp(&a.ts));
        if let Some(last) = last {
            items.truncate(last.max(1));
        }
        items
    }

    /// Forget one record by id, or everything with `"all"`. Returns the
    /// number of records removed.
    pub fn forget(&self, id_or_all: &str) -> Result<usize, Error> {
        if id_or_all.eq_ignore_ascii_case("all") {
            let count = self.load_all().len();
            if self.path.exists() {
                std::fs::remove_file(&self.path).map_err(|e| Error::MalformedState(e.to_string()))?;
            }
            return Ok(count);
        }

        let items = self.load_all();
        let kept: Vec<&MemoryRecord> = items.iter().filter(|r| r.id != id_or_all).collect();
        let removed = items.len() - kept.len();

        let body = kept
            .iter()
            .filter_map(|r| serde_json::to_string(r).ok())
            .map(|line| line + "\n")
            .collect::<String>();
        std::fs::write(&self.path, body).map_err(|e| Error::MalformedState(e.to_string()))?;

        Ok(removed)
    }
}
