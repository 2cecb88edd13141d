//! The kestrel resolution pipeline.
//!
//! A query flows through strictly ordered, short-circuiting stages:
//! literal intercepts, deterministic skills, the guarded web resolver, the
//! curated/cached answer store, and finally the generative model, followed
//! by a deterministic format-shaping pass and a final scrub. Each stage
//! absorbs its own faults; the pipeline never aborts on one stage's
//! failure.
//!
//! The hard parts live in `web` (search, fetch, anti-hallucination guards,
//! one adaptive retry) and `shape` (format inference and text reshaping).

pub mod heuristics;
pub mod memory;
pub mod model;
pub mod orchestrator;
pub mod persona;
pub mod prefs;
pub mod scrub;
pub mod shape;
pub mod skills;
pub mod traits;
pub mod web;

pub use orchestrator::{Answer, AnswerMeta, Orchestrator, QueryFlags, RouteTag};
pub use shape::{OutFormat, ResponseMode, Verbosity};
pub use traits::{DocumentFetcher, Generator, SearchProvider};
pub use web::{SynthesisResult, WebMeta, WebResolver};
