//! Network collaborators for kestrel.
//!
//! This crate provides the external I/O surface the pipeline consumes:
//! web search, document fetch, HTML cleaning, the generative backend, and
//! the bounded live lookups used by individual skills (fx rates, weather).
//! Everything here reports failures as values; the pipeline decides how to
//! degrade.

pub mod clean;
pub mod fetch;
pub mod generate;
pub mod rates;
pub mod search;
pub mod weather;

pub use clean::{clean_html, first_line_title};
pub use fetch::{FetchClient, FetchConfig, FetchResponse};
pub use generate::{ChatMessage, GenClient, GenConfig, GenError, GenUsage, Role};
pub use rates::RateClient;
pub use search::{SearchClient, SearchConfig, SearchHit};
pub use weather::WeatherClient;
