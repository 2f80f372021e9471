//! Unified SDK error types.

use crate::domain::query::FilterError;
use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

/// Why a request did not produce a result, as recorded in the request lifecycle.
///
/// Unlike [`SdkError`] this is `Clone + PartialEq` so it can live in view state
/// and be compared in tests.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport failure, non-2xx response or undecodable body.
    #[error("Network failure: {0}")]
    NetworkFailure(String),

    #[error("Request timed out")]
    Timeout,

    /// The bulk coin listing could not be fetched; search degrades to no matches.
    #[error("Catalog unavailable: {0}")]
    CatalogUnavailable(String),

    /// A completed fetch that a newer dispatch superseded. Never shown to users.
    #[error("Stale response for dispatch #{seq} (latest is #{latest})")]
    Stale { seq: u64, latest: u64 },
}

impl ErrorKind {
    pub fn is_stale(&self) -> bool {
        matches!(self, ErrorKind::Stale { .. })
    }
}

impl From<&HttpError> for ErrorKind {
    fn from(err: &HttpError) -> Self {
        match err {
            HttpError::Timeout => ErrorKind::Timeout,
            #[cfg(feature = "http")]
            HttpError::Reqwest(e) if e.is_timeout() => ErrorKind::Timeout,
            other => ErrorKind::NetworkFailure(other.to_string()),
        }
    }
}

impl From<&SdkError> for ErrorKind {
    fn from(err: &SdkError) -> Self {
        match err {
            SdkError::Http(e) => e.into(),
            other => ErrorKind::NetworkFailure(other.to_string()),
        }
    }
}
