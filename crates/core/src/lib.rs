//! Core types and shared functionality for kestrel.
//!
//! This crate provides:
//! - Layered application configuration
//! - Unified error types
//! - The cache layer: session cache, append-only answer records, and
//!   curated overrides, all keyed by content hashes

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{AnswerRecord, AnswerStore, CacheDb, CuratedStore, SessionCache};
pub use config::AppConfig;
pub use error::Error;
