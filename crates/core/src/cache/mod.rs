//! Cache layer: session cache, answer records, and curated overrides.
//!
//! Three independent stores that are never unified:
//!
//! - A process-lifetime in-memory session cache (no TTL)
//! - A persistent, append-only answer-record log in SQLite, consulted
//!   through a generic get/put/scan interface with TTL checked at read time
//! - Curated overrides: an ephemeral map shadowing a persistent table,
//!   with empty-string tombstones
//!
//! SQLite access goes through tokio-rusqlite with WAL mode and versioned
//! migrations.

pub mod connection;
pub mod curated;
pub mod key;
pub mod migrations;
pub mod records;
pub mod session;

pub use crate::Error;

pub use connection::CacheDb;
pub use curated::CuratedStore;
pub use records::{AnswerRecord, AnswerStore};
pub use session::SessionCache;
