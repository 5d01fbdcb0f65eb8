//! Errors that can occur while fetching the status of a single node.

use thiserror::Error;

/// A per-node, per-cycle fetch failure.
///
/// These are never fatal: the affected row keeps its last known values and
/// the next scheduled cycle is the retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The node could not be reached.
    #[error("connection failed: {0}")]
    Connection(String),

    /// The node did not answer within the fetch deadline.
    #[error("request timed out")]
    Timeout,

    /// The node answered with a non-success HTTP status.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The response body did not have the expected shape.
    #[error("failed to decode {endpoint}: {reason}")]
    Decode { endpoint: String, reason: String },

    /// Any other transport-level failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The fetch task panicked or was cancelled before producing a result.
    #[error("fetch task failed: {0}")]
    Task(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_connect() {
            FetchError::Connection(err.to_string())
        } else {
            FetchError::Http(err.to_string())
        }
    }
}

impl From<tokio::task::JoinError> for FetchError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_panic() {
            FetchError::Task("panicked".to_string())
        } else {
            FetchError::Task("cancelled".to_string())
        }
    }
}
