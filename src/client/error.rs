//! Fetch error types
//!
//! These never reach callers of [`EntitySource`](super::EntitySource); they
//! classify a failure so it can be logged before degrading to an empty result.

use thiserror::Error;

/// Errors that can occur while talking to the entity API
#[derive(Error, Debug)]
pub enum FetchError {
    /// No base URL configured
    #[error("API base URL is not configured")]
    NotConfigured,

    /// Caller passed an empty collection, page 0, limit 0, etc.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Server could not be reached
    #[error("API unavailable")]
    Unavailable,

    /// Request exceeded the configured timeout
    #[error("Request timeout")]
    Timeout,

    /// Any other transport failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("API error {status}: {message}")]
    Status { status: u16, message: String },

    /// Body was not valid JSON
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl FetchError {
    /// Classify a reqwest transport error the same way for every call
    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Unavailable
        } else {
            FetchError::Request(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Status { status: 404, .. })
    }
}

/// Result type alias for fetch operations
pub type FetchResult<T> = Result<T, FetchError>;
