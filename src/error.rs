use thiserror::Error;

/// Error types for the relay pipeline and its collaborators
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// A backend answered with an error payload or a failing HTTP status
    #[error("{service} service error: {raw}")]
    Service { service: String, raw: String },

    /// A backend reported success but the payload has no recognized result field
    #[error("{service} returned an unrecognized response: {raw}")]
    ValidationGap { service: String, raw: String },

    /// The publishing service refused a post (rate limit, duplicate, auth)
    #[error("publish rejected ({status}): {raw}")]
    PublishRejected { status: u16, raw: String },

    /// Transport-level failure talking to a remote service
    #[error("network error: {0}")]
    Network(String),

    /// Document store failure
    #[error("store error: {0}")]
    Store(String),

    /// Missing or invalid configuration
    #[error("config error: {0}")]
    Config(String),

    /// A change would leave a record in an illegal state
    #[error("record {id} invariant violated: {reason}")]
    Invariant { id: i64, reason: String },

    /// Thread limits leave no room for text
    #[error("chunking error: {0}")]
    Chunking(String),
}

impl From<reqwest::Error> for RelayError {
    fn from(e: reqwest::Error) -> Self {
        RelayError::Network(e.to_string())
    }
}

impl From<mongodb::error::Error> for RelayError {
    fn from(e: mongodb::error::Error) -> Self {
        RelayError::Store(e.to_string())
    }
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
