//! Graph client errors.

use tale_core::PlatformError;
use thiserror::Error;

/// Errors raised by [`GraphClient`](crate::GraphClient).
#[derive(Debug, Error)]
pub enum GraphError {
    /// The configured base URL or an object id produced an invalid URL.
    #[error("invalid Graph URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The HTTP client could not be built or the request failed in transit.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The Graph API returned an error object.
    #[error("Graph API error {code} ({status}): {message}")]
    Api {
        /// HTTP status.
        status: u16,
        /// Graph error code.
        code: i64,
        /// Error message.
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected Graph response: {0}")]
    Decode(String),
}

/// Result type for Graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

impl From<GraphError> for PlatformError {
    fn from(e: GraphError) -> Self {
        match e {
            GraphError::Api {
                status, message, ..
            } => Self::Status {
                status,
                body: message,
            },
            GraphError::Decode(msg) => Self::Decode(msg),
            other => Self::Request(other.to_string()),
        }
    }
}
