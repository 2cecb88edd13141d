//! Unified error types for kestrel.
//!
//! Every pipeline stage absorbs its own faults; these types exist so the
//! stages and collaborators can report *why* something degraded, not so
//! errors can reach the front end. Display strings carry a stable prefix
//! for log grepping.

use tokio_rusqlite::rusqlite;

/// Unified error type for the kestrel workspace.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty query).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Database operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Search engine request failed.
    #[error("SEARCH_FAILED: {0}")]
    SearchFailed(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// HTTP error response.
    #[error("HTTP_ERROR: {0}")]
    HttpError(String),

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Generative backend call failed.
    #[error("BACKEND_ERROR: {0}")]
    Backend(String),

    /// Persisted state had the wrong shape and was coerced to a default.
    #[error("MALFORMED_STATE: {0}")]
    MalformedState(String),
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_prefixes() {
        let err = Error::InvalidInput("empty query".to_string());
        assert!(err.to_string().starts_with("INVALID_INPUT"));

        let err = Error::Backend("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_malformed_state_display() {
        let err = Error::MalformedState("persona layers was a string".to_string());
        assert!(err.to_string().starts_with("MALFORMED_STATE"));
    }
}
